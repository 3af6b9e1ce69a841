//! Per-pair rolling price state.
//!
//! Two independent sequences are kept for every pair:
//!   • `PriceHistory` — samples inside the one-hour retention horizon,
//!     feeding the hourly average and the 24h-change lookup
//!   • `ChartRing` — fixed-capacity FIFO of recent points for display,
//!     decoupled from the analytic window

use std::collections::VecDeque;

use crate::types::ChartPoint;

/// Retention horizon for analytic samples.
pub const RETENTION_MS: i64 = 3_600_000;

/// Boundary used by the 24h-change lookup.
pub const DAY_MS: i64 = 86_400_000;

/// Capacity of the display chart ring.
pub const CHART_CAPACITY: usize = 30;

/// One accepted trade sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    pub ts_ms: i64,
}

/// Rolling window of samples within the retention horizon.
#[derive(Debug, Default)]
pub struct PriceHistory {
    samples: VecDeque<PriceSample>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample, then drop everything at or past the horizon.
    pub fn push(&mut self, price: f64, ts_ms: i64, now_ms: i64) {
        self.samples.push_back(PriceSample { price, ts_ms });
        self.prune(now_ms);
    }

    /// Retain only samples newer than `now - RETENTION_MS`.
    ///
    /// Scans the whole window rather than popping from the front:
    /// upstream tick timestamps are not guaranteed monotone.
    fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - RETENTION_MS;
        self.samples.retain(|s| s.ts_ms > cutoff);
    }

    /// Arithmetic mean of the retained prices, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.price).sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Retained sample with the greatest timestamp still at or before
    /// `cutoff_ms`, if one survived pruning.
    pub fn latest_at_or_before(&self, cutoff_ms: i64) -> Option<PriceSample> {
        self.samples
            .iter()
            .filter(|s| s.ts_ms <= cutoff_ms)
            .max_by_key(|s| s.ts_ms)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Percent change of `price` against a reference price.
///
/// A zero reference would make the division undefined; defined as 0.
pub fn percent_change(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        (price - reference) / reference * 100.0
    }
}

/// Fixed-capacity FIFO of recent chart points, oldest first.
#[derive(Debug, Default)]
pub struct ChartRing {
    points: VecDeque<ChartPoint>,
}

impl ChartRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point, evicting the oldest once at capacity.
    pub fn push(&mut self, time_millis: i64, price: f64) {
        if self.points.len() >= CHART_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(ChartPoint { time_millis, price });
    }

    pub fn to_vec(&self) -> Vec<ChartPoint> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
