//! Core data types for the Tradely push feeds and REST payloads.
//!
//! These types match the JSON messages the backend sends on `/ws/market-data`,
//! `/ws/alerts` and `/api/historical/{ticker}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub mod message;
pub mod portfolio;
pub mod report;
pub mod timestamp;

pub use message::InboundMessage;
pub use portfolio::{Holding, PortfolioSnapshot};
pub use report::{NewsItem, PerformanceSummary, Sentiment, TradeAction, Transaction, ValuePoint};

/// Ticker symbol (e.g., "AAPL").
pub type Symbol = SmolStr;

/// One symbol's latest market state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Ticker symbol
    #[serde(rename = "ticker", alias = "symbol")]
    pub symbol: Symbol,
    /// Last traded price
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    /// Day high
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    /// Day low
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    /// Absolute change versus the previous close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Percentage change versus the previous close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Event time reported by the backend
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Price this symbol had in the previous snapshot. Derived by the hub, never read from the wire.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub prev_price: Option<f64>,
}

impl Tick {
    /// Minimal tick carrying only a symbol, price and timestamp.
    pub fn new(symbol: impl Into<Symbol>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            bid: None,
            ask: None,
            open: None,
            high: None,
            low: None,
            change: None,
            change_percent: None,
            volume: None,
            timestamp,
            prev_price: None,
        }
    }

    /// Set traded volume.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set the open/high/low fields used when shaping a candlestick bar.
    pub fn with_ohlc(mut self, open: f64, high: f64, low: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    /// Volume if present and strictly positive.
    pub fn positive_volume(&self) -> Option<f64> {
        self.volume.filter(|volume| *volume > 0.0)
    }
}

/// One OHLCV interval in a historical or live price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Candlestick bar shaped from a live tick. Missing OHLC fields fall back to the last price.
    pub fn candle_from_tick(tick: &Tick, volume: f64) -> Self {
        Self {
            timestamp: tick.timestamp,
            open: tick.open.unwrap_or(tick.price),
            high: tick.high.unwrap_or(tick.price),
            low: tick.low.unwrap_or(tick.price),
            close: tick.price,
            volume,
        }
    }

    /// Line point shaped from a live tick: only timestamp, price and volume are meaningful.
    pub fn point_from_tick(tick: &Tick, volume: f64) -> Self {
        Self {
            timestamp: tick.timestamp,
            open: tick.price,
            high: tick.price,
            low: tick.price,
            close: tick.price,
            volume,
        }
    }
}

/// Alert severity. The backend omits it for most notices.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    #[display("info")]
    Info,
    #[display("warning")]
    Warning,
    #[display("critical")]
    Critical,
}

/// Transient notification from the alert subscription. Consumed once and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}
