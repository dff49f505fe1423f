use anyhow::Context;
use ship_config::ShipConfig;
use ship_db::reconcile::CommitOptions;
use ship_db::service::ShipService;

use crate::cli::GlobalFlags;

/// Loaded configuration plus an open database.
pub struct AppContext {
    pub config: ShipConfig,
    pub service: ShipService,
}

impl AppContext {
    pub async fn init(flags: &GlobalFlags) -> anyhow::Result<Self> {
        let config = load_config(flags)?;
        let service = ShipService::new_local(
            &config.database.path,
            CommitOptions::from(&config.ingest),
        )
        .await
        .with_context(|| format!("failed to open database '{}'", config.database.path))?;

        Ok(Self { config, service })
    }
}

/// Config from files, `.env`, and environment, with `--db` applied on top.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ShipConfig> {
    let mut config = ShipConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(db) = &flags.db {
        config.database.path.clone_from(db);
    }
    Ok(config)
}
