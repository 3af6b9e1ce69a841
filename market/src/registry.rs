//! Static registry of the pairs this process tracks.

use crate::types::TrackedPair;

/// Tracked pairs in display order, fixed for the process lifetime.
pub const TRACKED_PAIRS: &[TrackedPair] = &[
    TrackedPair {
        id: "eth-usdc",
        base_asset: "ETH",
        quote_asset: "USDC",
        upstream_symbol: "BINANCE:ETHUSDC",
        display_color: "var(--chart-1)",
    },
    TrackedPair {
        id: "eth-usdt",
        base_asset: "ETH",
        quote_asset: "USDT",
        upstream_symbol: "BINANCE:ETHUSDT",
        display_color: "var(--chart-2)",
    },
    TrackedPair {
        id: "eth-btc",
        base_asset: "ETH",
        quote_asset: "BTC",
        upstream_symbol: "BINANCE:ETHBTC",
        display_color: "var(--chart-3)",
    },
];

pub fn tracked_pairs() -> &'static [TrackedPair] {
    TRACKED_PAIRS
}

/// Look a pair up by its upstream feed symbol.
pub fn resolve_symbol(symbol: &str) -> Option<&'static TrackedPair> {
    TRACKED_PAIRS.iter().find(|p| p.upstream_symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_ids_are_unique() {
        for (i, a) in TRACKED_PAIRS.iter().enumerate() {
            for b in &TRACKED_PAIRS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.upstream_symbol, b.upstream_symbol);
            }
        }
    }

    #[test]
    fn resolves_known_symbol() {
        let pair = resolve_symbol("BINANCE:ETHUSDT").unwrap();
        assert_eq!(pair.id, "eth-usdt");
    }

    #[test]
    fn unknown_symbol_resolves_to_none() {
        assert!(resolve_symbol("BINANCE:DOGEUSDT").is_none());
    }
}
