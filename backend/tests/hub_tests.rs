use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use backend::hub::{BROADCAST_INTERVAL, BroadcastHub, SnapshotKind};
use market::finnhub::FeedStatus;
use market::manager::MarketManager;

const NOW: i64 = 1_700_000_000_000;

fn make_hub() -> (Arc<MarketManager>, FeedStatus, BroadcastHub) {
    let manager = MarketManager::new(NOW);
    let status = FeedStatus::new();
    let hub = BroadcastHub::new(Arc::clone(&manager), status.clone());
    (manager, status, hub)
}

#[tokio::test]
async fn initial_snapshot_lists_all_pairs() {
    let (_manager, _status, hub) = make_hub();

    let payload = hub.snapshot_payload(SnapshotKind::Initial).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    assert_eq!(value["type"], "initial");
    assert_eq!(value["connected"], false);

    let pairs = value["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0]["id"], "eth-usdc");
    assert_eq!(pairs[0]["currentPrice"], 0.0);
    assert_eq!(pairs[0]["hourlyAverage"], 0.0);
    assert_eq!(pairs[0]["change24hPercent"], 0.0);
    assert!(pairs[0]["chartHistory"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn snapshot_surfaces_feed_connectivity() {
    let (_manager, status, hub) = make_hub();

    status.set_connected(true);
    let payload = hub.snapshot_payload(SnapshotKind::Update).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    assert_eq!(value["type"], "update");
    assert_eq!(value["connected"], true);
}

#[tokio::test]
async fn consecutive_broadcasts_without_ticks_are_byte_identical() {
    let (manager, _status, hub) = make_hub();
    manager
        .ingest_tick("BINANCE:ETHUSDC", 2450.5, NOW, NOW)
        .await;

    let mut rx = hub.subscribe();
    hub.broadcast_once().await;
    hub.broadcast_once().await;

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn broadcast_coalesces_to_latest_state() {
    let (manager, _status, hub) = make_hub();
    let mut rx = hub.subscribe();

    // A burst of ticks between timer firings yields one payload holding
    // only the latest price.
    for price in [100.0, 101.0, 102.0] {
        manager.ingest_tick("BINANCE:ETHUSDT", price, NOW, NOW).await;
    }
    hub.broadcast_once().await;

    let value: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(value["pairs"][1]["id"], "eth-usdt");
    assert_eq!(value["pairs"][1]["currentPrice"], 102.0);
}

#[tokio::test(start_paused = true)]
async fn broadcast_loop_waits_one_cadence_then_pushes_until_shutdown() {
    let (_manager, _status, hub) = make_hub();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut rx = hub.subscribe();
    let handle = tokio::spawn(hub.clone().run_broadcast(shutdown_rx));

    // Nothing is pushed at loop start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));

    // The first push lands after one full cadence, the next one after.
    tokio::time::sleep(BROADCAST_INTERVAL).await;
    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first, second);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("broadcast loop should stop on shutdown")
        .unwrap();
}

#[tokio::test]
async fn subscriber_count_tracks_receivers() {
    let (_manager, _status, hub) = make_hub();
    assert_eq!(hub.subscriber_count(), 0);

    let rx = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 1);

    drop(rx);
    assert_eq!(hub.subscriber_count(), 0);
}
