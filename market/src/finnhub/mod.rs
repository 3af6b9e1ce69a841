pub mod parser;
pub mod ws;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc::Sender, watch};

use crate::types::{TrackedPair, TradeTick};

/// Shared "upstream transport open" flag.
///
/// Reflects only whether the socket is open, independent of whether the
/// per-pair subscriptions succeeded. Written by the feed worker, read by
/// the broadcast side.
#[derive(Clone, Debug, Default)]
pub struct FeedStatus(Arc<AtomicBool>);

impl FeedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// High-level abstraction over the upstream trade-tick stream.
#[async_trait]
pub trait TradeFeedApi: Send + Sync + 'static {
    /// Stream trade ticks for `pairs` into `sender` until `shutdown`
    /// fires or the receiving side goes away.
    async fn run_trade_stream(
        &self,
        pairs: &'static [TrackedPair],
        sender: Sender<TradeTick>,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_status_defaults_to_disconnected() {
        let status = FeedStatus::new();
        assert!(!status.is_connected());

        status.set_connected(true);
        assert!(status.is_connected());

        // Clones observe the same underlying flag.
        let clone = status.clone();
        status.set_connected(false);
        assert!(!clone.is_connected());
    }
}
