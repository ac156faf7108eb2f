#![warn(missing_debug_implementations, rust_2018_idioms)]

//! # Tradely Data
//! Client-side live data layer for the Tradely trading dashboard.
//!
//! - [`hub`]: the Live Data Hub. One market subscription and one alert subscription feed a
//!   single-writer reducer that publishes merged snapshots to any number of readers.
//! - [`chart`]: the Incremental Chart Feed. A per-symbol historical window extended in place
//!   with strictly newer live ticks.
//! - [`view`]: watchlist ordering, price transition highlighting, today's movers and the
//!   persisted pin set.
//! - [`rest`]: REST client for history, generated analysis, trades, price alerts, news
//!   sentiment and portfolio reports.
//!
//! ## Example
//! ```rust,no_run
//! use tradely_data::{LiveDataHub, config::TradelyConfig, view::sorted_ticks};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TradelyConfig::from_env();
//!     let hub = LiveDataHub::spawn(config.hub);
//!     let mut reader = hub.reader();
//!
//!     while let Some(state) = reader.changed().await {
//!         for tick in sorted_ticks(&state.live) {
//!             println!("{} {:.2}", tick.symbol, tick.price);
//!         }
//!     }
//! }
//! ```

/// Live chart state: base history, live appends and on-demand analysis.
pub mod chart;

/// Endpoint, reconnect and local storage configuration.
pub mod config;

/// All errors generated in `tradely-data`.
pub mod error;

/// Live Data Hub: push subscriptions and the snapshot reducer.
pub mod hub;

/// Ticks, bars, portfolio and alert payloads.
pub mod model;

/// REST API client.
pub mod rest;

/// Stream utilities used by the push subscriptions.
pub mod streams;

/// Pure view derivations and pins.
pub mod view;

pub use chart::{ChartFeed, FeedState, SeriesType, TickOutcome};
pub use error::DataError;
pub use hub::{ConnectionStatus, HubReader, HubState, LiveDataHub, LiveSnapshot};
pub use model::{AlertEvent, Bar, PortfolioSnapshot, Severity, Symbol, Tick};
pub use rest::ApiClient;

