//! Read-only reporting payloads: headline sentiment, portfolio value history, the trade
//! ledger and the performance summary.

use chrono::{DateTime, Utc};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use super::{Holding, Symbol, timestamp};

/// Classification the backend assigns to a headline. Anything unrecognised (including the
/// backend's `Error` marker) reads as neutral.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(from = "String")]
pub enum Sentiment {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl From<String> for Sentiment {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "bullish" => Sentiment::Bullish,
            "bearish" => Sentiment::Bearish,
            _ => Sentiment::Neutral,
        }
    }
}

/// One recent headline for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    #[serde(default)]
    pub sentiment: Sentiment,
}

/// Total portfolio value at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    #[display("BUY")]
    Buy,
    #[display("SELL")]
    Sell,
}

/// An executed trade, as listed by the backend ledger (newest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "ticker", alias = "symbol")]
    pub symbol: Symbol,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_invested_capital: f64,
    pub current_market_value: f64,
    pub total_pnl: f64,
    pub pnl_today: f64,
    #[serde(default)]
    pub holdings: FnvHashMap<Symbol, Holding>,
    #[serde(default)]
    pub portfolio_history: Vec<ValuePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_news_sentiment_falls_back_to_neutral() {
        let news: Vec<NewsItem> = serde_json::from_str(
            r#"[
                {"headline": "Record iPhone sales", "sentiment": "Bullish"},
                {"headline": "Supply chain worries", "sentiment": "Bearish"},
                {"headline": "Model offline", "sentiment": "Error"}
            ]"#,
        )
        .unwrap();

        let sentiments = news.iter().map(|item| item.sentiment).collect::<Vec<_>>();
        assert_eq!(
            sentiments,
            vec![Sentiment::Bullish, Sentiment::Bearish, Sentiment::Neutral]
        );
    }

    #[test]
    fn test_performance_summary_deserializes_backend_shape() {
        let summary: PerformanceSummary = serde_json::from_str(
            r#"{
                "total_invested_capital": 2000.0,
                "current_market_value": 2100.0,
                "total_pnl": 100.0,
                "pnl_today": -12.5,
                "holdings": {"AAPL": {"shares": 10, "avg_price": 200.0, "market_price": 210.0}},
                "portfolio_history": [
                    {"timestamp": "2025-07-01T09:30:00+00:00", "value": 1000000.0},
                    {"timestamp": "2025-07-01T09:31:00", "value": 1000100.0}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(summary.pnl_today, -12.5);
        assert_eq!(summary.holdings.len(), 1);
        assert_eq!(summary.portfolio_history.len(), 2);
        assert_eq!(
            summary.portfolio_history[1].timestamp,
            Utc.with_ymd_and_hms(2025, 7, 1, 9, 31, 0).unwrap()
        );
    }

    #[test]
    fn test_transaction_deserializes_ledger_row() {
        let transaction: Transaction = serde_json::from_str(
            r#"{"timestamp": "2025-07-01T10:00:00", "ticker": "MSFT", "action": "SELL",
                "quantity": 3, "price": 400.0, "total_value": 1200.0}"#,
        )
        .unwrap();

        assert_eq!(transaction.symbol, "MSFT");
        assert_eq!(transaction.action, TradeAction::Sell);
        assert_eq!(transaction.total_value, 1200.0);
    }
}
