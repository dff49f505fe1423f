use std::sync::Arc;

use anyhow::Context;
use ship_server::{AppState, HttpServer};

use crate::cli::root_commands::ServeArgs;
use crate::context::AppContext;

/// Handle `shipdesk serve`. Runs until Ctrl-C.
pub async fn handle(args: &ServeArgs, ctx: AppContext) -> anyhow::Result<()> {
    let AppContext { config, service } = ctx;
    let bind = args.bind.as_deref().unwrap_or(&config.server.bind);
    if config.database.is_in_memory() {
        tracing::warn!("serving a :memory: database; commits are serialized on one connection");
    }

    let state = Arc::new(AppState::new(service, config.server.max_upload_bytes)?);
    let server = HttpServer::bind(bind)?;
    if let Some(addr) = server.local_addr() {
        eprintln!("shipdesk listening on http://{addr}");
    }

    server
        .run(state, async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::warn!(%error, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("http server failed")
}
