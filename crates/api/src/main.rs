use std::sync::Arc;

use anyhow::Context;

use stockledger_api::config::ApiConfig;
use stockledger_api::service::InventoryLedgerService;
use stockledger_api::source::RestMoveSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockledger_observability::init();

    let config = ApiConfig::from_env()?;
    let source = RestMoveSource::new(config.source_url.clone())?;
    let service = Arc::new(InventoryLedgerService::new(Arc::new(source), config.ledger));

    let app = stockledger_api::app::build_app(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let addr = listener.local_addr()?;
    tracing::info!(source = %config.source_url, "listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
