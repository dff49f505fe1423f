use crate::cli::GlobalFlags;
use crate::cli::root_commands::HistoryArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `shipdesk history`.
pub async fn handle(args: &HistoryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let invoices = ctx.service.get_history(&args.shipment_id).await?;
    output(&invoices, flags.format)
}
