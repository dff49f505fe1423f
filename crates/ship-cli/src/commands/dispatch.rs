use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => commands::serve::handle(&args, ctx).await,
        Commands::Import(args) => commands::import::handle(&args, &ctx, flags).await,
        Commands::Shipments(args) => commands::shipments::handle(&args, &ctx, flags).await,
        Commands::History(args) => commands::history::handle(&args, &ctx, flags).await,
        Commands::Companies => commands::companies::handle(&ctx, flags).await,
        Commands::Preview(_) | Commands::Schema(_) => {
            unreachable!("preview/schema are pre-dispatched in main")
        }
    }
}
