use std::sync::Arc;

use tracing::info;

use crate::channels::{DiscordRelay, DiscordTransport};
use crate::config::AppConfig;
use crate::daemon;
use crate::relay::{ForwardStore, RelayEngine};
use crate::traits::RelayTransport;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 1. Forward store
    let store = Arc::new(ForwardStore::new(config.relay.max_tracked_messages));
    info!(
        capacity = config.relay.max_tracked_messages,
        "Forward store initialized"
    );

    // 2. Transport + relay engine
    let transport = Arc::new(DiscordTransport::new());
    let engine = Arc::new(RelayEngine::new(
        Arc::clone(&transport) as Arc<dyn RelayTransport>,
        store,
        config.discord.source_channel_id,
        config.discord.target_channel_id,
    ));
    info!(
        source = config.discord.source_channel_id,
        target = config.discord.target_channel_id,
        "Relay engine configured"
    );

    // 3. Liveness server
    let health_bind = config.daemon.health_bind.clone();
    let health_port = config.daemon.health_port;
    tokio::spawn(async move {
        if let Err(e) = daemon::start_liveness_server(&health_bind, health_port).await {
            tracing::error!("Liveness server error: {}", e);
        }
    });

    // 4. Keep-alive pinger
    if let Some(url) = config.daemon.keepalive_url.clone() {
        daemon::spawn_keepalive(url, config.daemon.keepalive_interval_secs);
    }

    // 5. Discord client with auto-retry (blocks)
    info!("Starting mirrorbot v{}", env!("CARGO_PKG_VERSION"));
    let relay = Arc::new(DiscordRelay::new(
        &config.discord.bot_token,
        engine,
        transport,
    ));
    relay.start_with_retry().await;

    Ok(())
}
