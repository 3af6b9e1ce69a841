use serde::{Deserialize, Serialize};

/// Static configuration for one tracked currency pair.
///
/// Pairs are fixed at process start and never mutated; `upstream_symbol`
/// is the vendor-specific identifier used on the trade-tick feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPair {
    pub id: &'static str,
    pub base_asset: &'static str,
    pub quote_asset: &'static str,
    pub upstream_symbol: &'static str,
    pub display_color: &'static str,
}

/// One upstream trade event.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTick {
    pub symbol: String,
    pub price: f64,
    pub ts_ms: i64,
}

/// Single point of a pair's display chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time_millis: i64,
    pub price: f64,
}

/// The externally visible derived-metrics snapshot for one pair.
///
/// Exactly one exists per tracked pair at all times; it is replaced
/// wholesale on every accepted tick, so readers always see a complete
/// consistent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSummary {
    pub id: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub current_price: f64,
    pub hourly_average: f64,
    pub change_24h_percent: f64,
    pub last_update_millis: i64,
    pub chart_history: Vec<ChartPoint>,
    pub display_color: String,
}

impl PairSummary {
    /// Zero-valued summary for a pair that has not seen a tick yet.
    pub fn initial(pair: &TrackedPair, now_ms: i64) -> Self {
        Self {
            id: pair.id.to_string(),
            base_asset: pair.base_asset.to_string(),
            quote_asset: pair.quote_asset.to_string(),
            current_price: 0.0,
            hourly_average: 0.0,
            change_24h_percent: 0.0,
            last_update_millis: now_ms,
            chart_history: Vec::new(),
            display_color: pair.display_color.to_string(),
        }
    }
}
