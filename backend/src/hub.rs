//! Broadcast hub
//!
//! Fans the current summary set out to every connected WebSocket
//! subscriber. Responsibilities:
//!   • Serve the `/ws` subscriber endpoint
//!   • Push an immediate `initial` snapshot to each subscriber on join
//!   • On a fixed 2-second timer, push one `update` payload to all
//!     subscribers, serialized exactly once per tick
//!   • Surface upstream connectivity as the `connected` flag
//!
//! Subscriber bookkeeping is the broadcast channel's own: each socket
//! task holds a receiver, and dropping it on disconnect removes the
//! subscriber.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};
use uuid::Uuid;

use market::finnhub::FeedStatus;
use market::manager::MarketManager;
use market::types::PairSummary;

/// Cadence of the timer-driven push to all subscribers.
pub const BROADCAST_INTERVAL: Duration = Duration::from_millis(2000);

/// Pending payloads a slow subscriber may fall behind by before it skips
/// ahead to fresh data.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 16;

/// Payload pushed to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    pub pairs: Vec<PairSummary>,
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// Sent once to a subscriber at the moment it joins.
    Initial,
    /// Timer-driven push to every subscriber.
    Update,
}

#[derive(Clone)]
pub struct BroadcastHub {
    manager: Arc<MarketManager>,
    feed_status: FeedStatus,
    tx: broadcast::Sender<String>,
}

impl BroadcastHub {
    pub fn new(manager: Arc<MarketManager>, feed_status: FeedStatus) -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        Self {
            manager,
            feed_status,
            tx,
        }
    }

    /// Router serving the subscriber WebSocket endpoint.
    pub fn router(self) -> Router {
        Router::new().route("/ws", get(ws_handler)).with_state(self)
    }

    /// Build the full snapshot payload exactly as sent on the wire.
    pub async fn snapshot_payload(&self, kind: SnapshotKind) -> anyhow::Result<String> {
        let snapshot = Snapshot {
            kind,
            pairs: self.manager.summaries().await,
            connected: self.feed_status.is_connected(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Serialize one `update` payload and push it to every subscriber.
    pub async fn broadcast_once(&self) {
        match self.snapshot_payload(SnapshotKind::Update).await {
            // A send error only means no subscriber is connected.
            Ok(payload) => {
                let _ = self.tx.send(payload);
            }
            Err(e) => warn!(error = ?e, "failed to build broadcast payload"),
        }
    }

    /// Timer loop: one push per interval until shutdown. Spawned exactly
    /// once per process.
    pub async fn run_broadcast(self, mut shutdown: watch::Receiver<bool>) {
        // First push lands one full cadence after loop start, not immediately.
        let mut ticker = interval_at(Instant::now() + BROADCAST_INTERVAL, BROADCAST_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            every_ms = BROADCAST_INTERVAL.as_millis() as u64,
            "broadcast loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.broadcast_once().await,
                _ = shutdown.changed() => {
                    info!("shutdown requested; broadcast loop ending");
                    return;
                }
            }
        }
    }

    /// Subscribe to the raw payload stream (used by socket tasks and tests).
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<BroadcastHub>) -> Response {
    ws.on_upgrade(move |socket| handle_subscriber(socket, hub))
}

/// One task per subscriber: immediate snapshot, then relayed broadcasts
/// until the socket closes.
async fn handle_subscriber(mut socket: WebSocket, hub: BroadcastHub) {
    let client_id = Uuid::new_v4();
    info!(client = %client_id, "subscriber connected");

    // Register for updates before sending the snapshot so nothing
    // published in between is missed.
    let mut updates = hub.subscribe();

    let initial = match hub.snapshot_payload(SnapshotKind::Initial).await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(client = %client_id, error = ?e, "failed to build initial snapshot");
            return;
        }
    };
    if socket.send(Message::Text(initial.into())).await.is_err() {
        info!(client = %client_id, "subscriber left before initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => {
                let payload = match update {
                    Ok(p) => p,
                    // Hub gone: the process is shutting down.
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(client = %client_id, skipped, "subscriber lagging; skipping to fresh payloads");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    // Inbound subscriber payloads are not part of the contract.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(client = %client_id, error = ?e, "subscriber socket error");
                        break;
                    }
                }
            }
        }
    }

    info!(client = %client_id, "subscriber disconnected");
}
