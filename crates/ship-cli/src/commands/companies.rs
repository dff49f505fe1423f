use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `shipdesk companies`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let companies = ctx.service.list_companies().await?;
    output(&companies, flags.format)
}
