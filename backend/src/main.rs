use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use backend::{config::AppConfig, hub::BroadcastHub};
use common::{logger::init_logger, time::now_ms};
use market::{
    finnhub::{FeedStatus, TradeFeedApi, ws::FinnhubWsClient},
    manager::MarketManager,
    registry,
};

/// Capacity of the feed → manager tick channel.
const TICK_QUEUE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("pairfeed-backend");

    let cfg = AppConfig::from_env();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let manager = MarketManager::new(now_ms());
    let feed_status = FeedStatus::new();

    // Feed → manager tick pipeline; a single consumer keeps per-pair
    // updates sequential.
    let (tick_tx, tick_rx) = mpsc::channel(TICK_QUEUE_CAPACITY);
    tokio::spawn(Arc::clone(&manager).run_ingest(tick_rx));

    if cfg.has_feed_credential() {
        let client = FinnhubWsClient::new(
            cfg.finnhub_ws_url.clone(),
            cfg.finnhub_api_key.clone(),
            feed_status.clone(),
        );
        let feed_shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = client
                .run_trade_stream(registry::tracked_pairs(), tick_tx, feed_shutdown)
                .await
            {
                error!(error = ?e, "upstream feed worker exited");
            }
        });
    } else {
        // Fail-soft: subscribers still get default summaries.
        error!("FINNHUB_API_KEY is not set; upstream feed disabled");
    }

    let hub = BroadcastHub::new(Arc::clone(&manager), feed_status);
    tokio::spawn(hub.clone().run_broadcast(shutdown_rx.clone()));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "subscriber websocket server listening");

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut serve_shutdown = shutdown_rx;
    axum::serve(listener, hub.router())
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.changed().await;
        })
        .await?;

    info!("server stopped");
    Ok(())
}
