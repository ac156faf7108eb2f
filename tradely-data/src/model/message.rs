use serde::{Deserialize, Serialize};

use super::{AlertEvent, PortfolioSnapshot, Tick};
use crate::error::DataError;

/// Envelope for every frame pushed on the market and alert sockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Batch of ticks plus an optional portfolio payload
    MarketData {
        #[serde(default)]
        ticks: Vec<Tick>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        portfolio: Option<PortfolioSnapshot>,
    },
    Alert(AlertEvent),
    /// Welcome, status and any other frame the client does not act on
    #[serde(other)]
    Other,
}

impl InboundMessage {
    /// Parse a text or binary frame.
    pub fn parse(frame: &[u8]) -> Result<Self, DataError> {
        Ok(serde_json::from_slice(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_market_data_frame() {
        let text = r#"{
            "type": "market_data",
            "ticks": [
                {"ticker": "AAPL", "timestamp": "2025-07-01T09:30:00", "price": 210.5, "change": 1.0, "change_percent": 0.5},
                {"ticker": "MSFT", "timestamp": "2025-07-01T09:30:00", "price": 450.0, "change": -2.0, "change_percent": -0.4}
            ],
            "portfolio": {"cash": 100.0, "holdings": {}, "portfolio_value": 0.0, "total_value": 100.0}
        }"#;

        match InboundMessage::parse(text.as_bytes()).unwrap() {
            InboundMessage::MarketData { ticks, portfolio } => {
                assert_eq!(ticks.len(), 2);
                assert_eq!(ticks[1].symbol, "MSFT");
                assert_eq!(portfolio.unwrap().total_value, 100.0);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_alert_and_unknown_frames() {
        let alert = InboundMessage::parse(br#"{"type": "alert", "message": "News: AAPL beats estimates"}"#)
            .unwrap();
        assert!(matches!(alert, InboundMessage::Alert(AlertEvent { ref message, .. }) if message.starts_with("News")));

        let welcome = InboundMessage::parse(br#"{"type": "welcome", "message": "hi"}"#).unwrap();
        assert_eq!(welcome, InboundMessage::Other);
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        assert!(matches!(InboundMessage::parse(b"not json"), Err(DataError::Decode(_))));
        assert!(InboundMessage::parse(br#"{"type": "market_data", "ticks": [{"ticker": "AAPL"}]}"#).is_err());
        assert!(InboundMessage::parse(br#"{"ticks": []}"#).is_err());
    }
}
