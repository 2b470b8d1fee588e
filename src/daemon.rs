use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use tracing::{info, warn};

/// Start the liveness HTTP server. Hosting platforms poll this (and the
/// keep-alive pinger requests it) to keep the process from idling out.
pub async fn start_liveness_server(bind: &str, port: u16) -> anyhow::Result<()> {
    let app = Router::new().route("/", get(liveness_handler));

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Liveness server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn liveness_handler() -> &'static str {
    "Relay bot is alive"
}

/// Periodically request `url` to discourage idle shutdown by the host.
/// Failures are logged and ignored; the pinger never gives up.
pub fn spawn_keepalive(url: String, interval_secs: u64) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.tick().await; // first tick completes immediately
        loop {
            ticker.tick().await;
            match client.get(&url).send().await {
                Ok(resp) => {
                    info!(status = resp.status().as_u16(), "Keep-alive ping sent");
                }
                Err(e) => {
                    warn!("Keep-alive ping failed: {}", e);
                }
            }
        }
    });
}
