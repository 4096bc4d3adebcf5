//! # threadbridge
//!
//! Process bootstrap: loads configuration, wires the adapters into the
//! workflow layer, and drives the update loop until terminated.

use std::sync::Arc;
use std::time::Duration;

use chat_adapters::TelegramTransport;
use configs::AppConfig;
use services::{DispatchConfig, Dispatcher};
use storage_adapters::SqliteRecordStore;
use tracker_adapters::GithubGateway;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let store = Arc::new(SqliteRecordStore::new(&config.storage.database_path).await?);
    let gateway = Arc::new(GithubGateway::with_api_base(
        config.github.token,
        &config.github.api_base,
    )?);
    let transport = Arc::new(TelegramTransport::new(
        config.telegram.token,
        Duration::from_secs(config.poll_timeout_secs),
    )?);

    let dispatcher = Dispatcher::new(
        store,
        gateway,
        transport.clone(),
        DispatchConfig {
            cleanup_delay: Duration::from_millis(config.cleanup_delay_ms),
            session_ttl: Duration::from_secs(config.session_ttl_secs),
        },
    );

    info!(database = %config.storage.database_path, "threadbridge started");

    let mut offset = 0;
    loop {
        match transport.fetch_updates(offset).await {
            Ok(batch) => {
                for update in batch {
                    offset = update.update_id + 1;
                    if let Some(message) = update.message {
                        dispatcher.dispatch(message).await;
                    }
                }
            }
            Err(err) => {
                warn!(%err, "update poll failed, backing off");
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
        }
    }
}
