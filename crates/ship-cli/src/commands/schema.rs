use anyhow::Context;
use ship_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `shipdesk schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match &args.name {
        Some(name) => {
            let schema = registry.get(name).with_context(|| {
                format!(
                    "unknown schema '{name}' (available: {})",
                    registry.list().join(", ")
                )
            })?;
            output(schema, flags.format)
        }
        None => output(&registry.list(), flags.format),
    }
}
