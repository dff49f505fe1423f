use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShipmentsArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `shipdesk shipments`.
pub async fn handle(
    args: &ShipmentsArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let shipments = ctx.service.list_shipments(args.company.as_deref()).await?;
    output(&shipments, flags.format)
}
