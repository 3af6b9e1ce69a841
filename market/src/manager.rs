//! MarketManager
//!
//! Owns all live per-pair state. Responsibilities:
//!   • Maintain one `PriceHistory`, `ChartRing`, and `PairSummary` per
//!     tracked pair for the process lifetime
//!   • Ingest raw trade ticks, pruning and recomputing derived metrics
//!   • Replace each pair's summary wholesale so readers never observe a
//!     partially updated value
//!   • Serve the full summary set to the broadcast side on demand
//!
//! The manager is an Arc-managed async service; ticks are drained from a
//! single mpsc consumer, which keeps updates for any one pair sequential.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc::Receiver};
use tracing::{debug, trace};

use crate::history::{ChartRing, DAY_MS, PriceHistory, percent_change};
use crate::registry;
use crate::types::{PairSummary, TradeTick};

struct PairState {
    history: PriceHistory,
    chart: ChartRing,
    summary: PairSummary,
}

pub struct MarketManager {
    /// Live state keyed by pair id; seeded at construction, entries are
    /// never added or removed afterwards.
    states: RwLock<HashMap<&'static str, PairState>>,
}

impl MarketManager {
    /// Build the manager with one default summary per registry pair.
    pub fn new(now_ms: i64) -> Arc<Self> {
        let mut map = HashMap::new();
        for pair in registry::tracked_pairs() {
            map.insert(
                pair.id,
                PairState {
                    history: PriceHistory::new(),
                    chart: ChartRing::new(),
                    summary: PairSummary::initial(pair, now_ms),
                },
            );
        }
        Arc::new(Self {
            states: RwLock::new(map),
        })
    }

    /// Drain the tick channel until the feed side closes it.
    pub async fn run_ingest(self: Arc<Self>, mut ticks: Receiver<TradeTick>) {
        while let Some(tick) = ticks.recv().await {
            let now = common::time::now_ms();
            self.ingest_tick(&tick.symbol, tick.price, tick.ts_ms, now)
                .await;
        }
        debug!("tick channel closed; ingest loop ending");
    }

    /// Apply one tick: update history and chart, recompute the pair's
    /// derived metrics, and replace its summary.
    ///
    /// Ticks for symbols outside the registry are silently discarded.
    pub async fn ingest_tick(&self, symbol: &str, price: f64, ts_ms: i64, now_ms: i64) {
        let Some(pair) = registry::resolve_symbol(symbol) else {
            trace!(symbol = %symbol, "unrecognized upstream symbol; dropping tick");
            return;
        };

        let mut states = self.states.write().await;
        // Registry and state map are seeded from the same list.
        let Some(state) = states.get_mut(pair.id) else {
            return;
        };

        state.history.push(price, ts_ms, now_ms);

        let hourly_average = state.history.mean().unwrap_or(price);
        let change_24h_percent = state
            .history
            .latest_at_or_before(now_ms - DAY_MS)
            .map(|s| percent_change(price, s.price))
            .unwrap_or(0.0);

        state.chart.push(ts_ms, price);

        state.summary = PairSummary {
            id: pair.id.to_string(),
            base_asset: pair.base_asset.to_string(),
            quote_asset: pair.quote_asset.to_string(),
            current_price: price,
            hourly_average,
            change_24h_percent,
            last_update_millis: now_ms,
            chart_history: state.chart.to_vec(),
            display_color: pair.display_color.to_string(),
        };

        debug!(pair = pair.id, price, "pair summary updated");
    }

    /// Current summaries in registry order; each element is a complete
    /// consistent snapshot.
    pub async fn summaries(&self) -> Vec<PairSummary> {
        let states = self.states.read().await;
        registry::tracked_pairs()
            .iter()
            .filter_map(|pair| states.get(pair.id).map(|s| s.summary.clone()))
            .collect()
    }

    /// Latest summary for a single pair.
    pub async fn summary(&self, pair_id: &str) -> Option<PairSummary> {
        let states = self.states.read().await;
        states.get(pair_id).map(|s| s.summary.clone())
    }
}
