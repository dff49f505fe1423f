use crate::cli::GlobalFlags;
use crate::cli::root_commands::FileArgs;
use crate::output::output;

/// Handle `shipdesk preview`.
pub fn handle(args: &FileArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let batch = super::read_batch(&args.file)?;
    output(&batch, flags.format)
}
