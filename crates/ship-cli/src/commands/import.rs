use ship_core::responses::ConfirmResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::FileArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `shipdesk import`.
pub async fn handle(args: &FileArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let batch = super::read_batch(&args.file)?;
    let stats = ctx.service.commit(&batch).await?;
    output(&ConfirmResponse::committed(stats), flags.format)
}
