//! Upstream feed message parser.
//!
//! The vendor sends every message through one text channel; the only
//! shapes this service consumes are:
//!
//! ```jsonc
//! { "type": "trade", "data": [{ "s": "<symbol>", "p": <price>, "t": <ms> }, ...] }
//! { "type": "ping" }
//! ```
//!
//! Everything else is ignored (`Ok(None)`); JSON that does not parse at
//! all is a `FeedError::Parse`. The parser is stateless and pure; the
//! WebSocket worker decides what to do with each outcome.

use serde::Deserialize;

use crate::error::FeedError;
use crate::types::TradeTick;

/// Parsed upstream feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Batch of trade ticks.
    Trades(Vec<TradeTick>),
    /// Server heartbeat.
    Ping,
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    // Absent on some vendor control messages; those are ignored, not malformed.
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Option<Vec<RawTrade>>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    s: String,
    p: f64,
    t: i64,
}

/// Parse one raw upstream message into a typed event.
pub fn parse_feed_message(raw: &str) -> Result<Option<FeedEvent>, FeedError> {
    let envelope: FeedEnvelope = serde_json::from_str(raw)?;

    match envelope.kind.as_deref() {
        Some("trade") => {
            let ticks = envelope
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|t| TradeTick {
                    symbol: t.s,
                    price: t.p,
                    ts_ms: t.t,
                })
                .collect();
            Ok(Some(FeedEvent::Trades(ticks)))
        }
        Some("ping") => Ok(Some(FeedEvent::Ping)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trade_batch() {
        let raw = r#"{
            "type": "trade",
            "data": [
                { "s": "BINANCE:ETHUSDC", "p": 2450.5, "t": 1700000000000 },
                { "s": "BINANCE:ETHBTC", "p": 0.052, "t": 1700000000001 }
            ]
        }"#;

        let event = parse_feed_message(raw).unwrap().unwrap();
        let FeedEvent::Trades(ticks) = event else {
            panic!("expected a trade batch");
        };
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].symbol, "BINANCE:ETHUSDC");
        assert_eq!(ticks[0].price, 2450.5);
        assert_eq!(ticks[1].ts_ms, 1_700_000_000_001);
    }

    #[test]
    fn trade_without_data_is_an_empty_batch() {
        let event = parse_feed_message(r#"{"type":"trade"}"#).unwrap().unwrap();
        assert_eq!(event, FeedEvent::Trades(vec![]));
    }

    #[test]
    fn parses_ping() {
        let event = parse_feed_message(r#"{"type":"ping"}"#).unwrap().unwrap();
        assert_eq!(event, FeedEvent::Ping);
    }

    #[test]
    fn unconsumed_kinds_are_ignored() {
        assert_eq!(parse_feed_message(r#"{"type":"news","id":1}"#).unwrap(), None);
    }

    #[test]
    fn messages_without_a_type_are_ignored_not_errors() {
        assert_eq!(parse_feed_message(r#"{"data":[]}"#).unwrap(), None);
        assert_eq!(parse_feed_message("{}").unwrap(), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_feed_message("{not json").is_err());
        assert!(parse_feed_message(r#"["not","an","object"]"#).is_err());
    }
}
