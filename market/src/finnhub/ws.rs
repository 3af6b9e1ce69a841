//! WebSocket implementation of the upstream trade feed.
//!
//! Connection lifecycle: connect with the credential in the URL, send one
//! subscribe message per tracked pair, then forward parsed trade ticks
//! into the mpsc channel until the socket dies. Every disconnect leads
//! back through a single fixed-delay wait before the next attempt; the
//! shutdown signal cancels both the read phase and that wait.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc::Sender, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use super::parser::{FeedEvent, parse_feed_message};
use super::{FeedStatus, TradeFeedApi};
use crate::error::FeedError;
use crate::types::{TrackedPair, TradeTick};

/// Delay between a transport failure and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

pub struct FinnhubWsClient {
    ws_url: String,
    token: String,
    status: FeedStatus,
}

impl FinnhubWsClient {
    pub fn new(ws_url: String, token: String, status: FeedStatus) -> Self {
        Self {
            ws_url,
            token,
            status,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}?token={}", self.ws_url, self.token)
    }

    /// Send one subscribe message per tracked pair.
    async fn subscribe_all<E>(
        write: &mut (impl futures::Sink<Message, Error = E> + Unpin),
        pairs: &[TrackedPair],
    ) -> anyhow::Result<()>
    where
        E: std::fmt::Debug + Send + Sync + 'static,
    {
        for pair in pairs {
            let msg = json!({ "type": "subscribe", "symbol": pair.upstream_symbol });
            let text = serde_json::to_string(&msg)?;

            write
                .send(Message::Text(text.into()))
                .await
                .map_err(|e| anyhow::anyhow!("subscribe send failed: {:?}", e))?;

            info!(symbol = %pair.upstream_symbol, "subscribed to upstream symbol");
        }
        Ok(())
    }
}

#[async_trait]
impl TradeFeedApi for FinnhubWsClient {
    #[instrument(skip(self, sender, shutdown), fields(url = %self.ws_url))]
    async fn run_trade_stream(
        &self,
        pairs: &'static [TrackedPair],
        sender: Sender<TradeTick>,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        info!("starting upstream feed worker");

        loop {
            debug!("attempting upstream connection");
            match connect_async(self.endpoint()).await {
                Ok((ws, _)) => {
                    info!("upstream connection established");
                    // Transport-open only; subscribe success is tracked separately.
                    self.status.set_connected(true);
                    let (mut write, mut read) = ws.split();

                    if let Err(e) = Self::subscribe_all(&mut write, pairs).await {
                        error!(error = ?e, "initial subscribe failed; reconnecting");
                    } else {
                        loop {
                            let msg = tokio::select! {
                                m = read.next() => m,
                                _ = shutdown.changed() => {
                                    info!("shutdown requested; closing upstream feed");
                                    self.status.set_connected(false);
                                    return Ok(());
                                }
                            };

                            let Some(msg) = msg else {
                                warn!("upstream stream ended");
                                break;
                            };
                            let msg = match msg {
                                Ok(m) => m,
                                Err(e) => {
                                    warn!(error = ?e, "upstream stream error");
                                    break;
                                }
                            };

                            if msg.is_ping() || msg.is_pong() {
                                continue;
                            }
                            if !msg.is_text() {
                                debug!("ignoring non-text upstream message");
                                continue;
                            }
                            let raw = match msg.to_text() {
                                Ok(t) => t,
                                Err(e) => {
                                    error!(error = ?e, "failed to read text frame");
                                    continue;
                                }
                            };

                            match parse_feed_message(raw) {
                                Ok(Some(FeedEvent::Trades(ticks))) => {
                                    for tick in ticks {
                                        if sender.send(tick).await.is_err() {
                                            error!("tick receiver dropped; feed worker ending");
                                            self.status.set_connected(false);
                                            return Err(FeedError::ChannelClosed(
                                                "tick receiver dropped".into(),
                                            )
                                            .into());
                                        }
                                    }
                                }
                                Ok(Some(FeedEvent::Ping)) => debug!("upstream heartbeat"),
                                Ok(None) => debug!("ignoring unconsumed message kind"),
                                Err(e) => {
                                    warn!(error = %e, raw = %raw, "dropping malformed upstream message");
                                }
                            }
                        }
                    }

                    self.status.set_connected(false);
                }
                Err(e) => {
                    error!(error = ?e, "upstream connection failed");
                }
            }

            warn!(delay = ?RECONNECT_DELAY, "upstream disconnected; reconnect scheduled");
            tokio::select! {
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                _ = shutdown.changed() => {
                    info!("shutdown requested during reconnect wait");
                    return Ok(());
                }
            }
        }
    }
}
