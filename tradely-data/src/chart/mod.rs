//! Incremental Chart Feed: a historical window loaded once per symbol and series type, then
//! extended with strictly newer live ticks.
//!
//! Loads and analysis requests are split into `begin_*` / `complete_*` halves joined by a
//! ticket. Whoever owns the [`ChartFeed`] can run the network call anywhere (a spawned task,
//! another thread) and hand the result back later; results for superseded tickets are dropped.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::DataError,
    hub::LiveSnapshot,
    model::{Bar, Symbol, Tick},
};

pub mod analysis;
pub mod series;

pub use analysis::{AnalysisState, AnalysisTicket};
pub use series::{ChartSeries, PriceTrace, SeriesType, VolumeTrace};

/// Source of historical bars.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn historical(&self, symbol: &str) -> Result<Vec<Bar>, DataError>;
}

/// Source of narrative chart analysis.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn chart_analysis(&self, symbol: &str, bars: &[Bar]) -> Result<String, DataError>;
}

/// Lifecycle of one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FeedState {
    #[default]
    Empty,
    Loading {
        symbol: Symbol,
        series_type: SeriesType,
    },
    Loaded(ChartSeries),
    Failed {
        symbol: Symbol,
        series_type: SeriesType,
        error: DataError,
    },
}

/// Identifies one load. Only the most recently issued ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub symbol: Symbol,
    pub series_type: SeriesType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { bars: usize },
    Failed(DataError),
    /// A newer load started after this ticket was issued; the result was discarded
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Appended,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IgnoreReason {
    #[display("no series loaded")]
    NotLoaded,
    #[display("tick for another symbol")]
    OtherSymbol,
    #[display("snapshot has no tick for the symbol")]
    NoTick,
    #[display("no history to extend")]
    EmptyHistory,
    #[display("volume absent or zero")]
    MissingVolume,
    #[display("not newer than the last bar")]
    Stale,
}

/// One chart instance: owns its series exclusively.
#[derive(Debug, Clone, Default)]
pub struct ChartFeed {
    state: FeedState,
    generation: u64,
    analysis: AnalysisState,
    analysis_request: u64,
}

impl ChartFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn series(&self) -> Option<&ChartSeries> {
        match &self.state {
            FeedState::Loaded(series) => Some(series),
            _ => None,
        }
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    /// Symbol the feed is bound to, in any state but `Empty`.
    pub fn symbol(&self) -> Option<&Symbol> {
        match &self.state {
            FeedState::Empty => None,
            FeedState::Loading { symbol, .. } | FeedState::Failed { symbol, .. } => Some(symbol),
            FeedState::Loaded(series) => Some(series.symbol()),
        }
    }

    pub fn series_type(&self) -> Option<SeriesType> {
        match &self.state {
            FeedState::Empty => None,
            FeedState::Loading { series_type, .. } | FeedState::Failed { series_type, .. } => {
                Some(*series_type)
            }
            FeedState::Loaded(series) => Some(series.series_type()),
        }
    }

    /// Start a full reload. Supersedes every outstanding load and analysis ticket.
    pub fn begin_load(&mut self, symbol: impl Into<Symbol>, series_type: SeriesType) -> LoadTicket {
        let symbol = symbol.into();
        self.generation += 1;
        self.analysis = AnalysisState::Idle;
        self.state = FeedState::Loading {
            symbol: symbol.clone(),
            series_type,
        };
        debug!(%symbol, %series_type, generation = self.generation, "chart load started");

        LoadTicket {
            generation: self.generation,
            symbol,
            series_type,
        }
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Bar>, DataError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                symbol = %ticket.symbol,
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale chart load"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(history) => {
                let series = ChartSeries::from_history(ticket.symbol, ticket.series_type, history);
                let bars = series.len();
                self.state = FeedState::Loaded(series);
                LoadOutcome::Loaded { bars }
            }
            Err(error) => {
                warn!(symbol = %ticket.symbol, %error, "chart load failed");
                self.state = FeedState::Failed {
                    symbol: ticket.symbol,
                    series_type: ticket.series_type,
                    error: error.clone(),
                };
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Load history for `symbol` and install it, for callers that hold the feed across the await.
    pub async fn load<P>(
        &mut self,
        provider: &P,
        symbol: impl Into<Symbol>,
        series_type: SeriesType,
    ) -> LoadOutcome
    where
        P: HistoryProvider + ?Sized,
    {
        let ticket = self.begin_load(symbol, series_type);
        let result = provider.historical(&ticket.symbol).await;
        self.complete_load(ticket, result)
    }

    /// Extend the loaded series with `tick` if it is strictly newer than the last bar.
    pub fn apply_tick(&mut self, tick: &Tick) -> TickOutcome {
        let FeedState::Loaded(series) = &mut self.state else {
            return TickOutcome::Ignored(IgnoreReason::NotLoaded);
        };
        if tick.symbol != *series.symbol() {
            return TickOutcome::Ignored(IgnoreReason::OtherSymbol);
        }
        // Live ticks only extend an existing window, never start one
        if series.is_empty() {
            return TickOutcome::Ignored(IgnoreReason::EmptyHistory);
        }
        // Partial ticks carry no volume and lack the fields a candle needs
        let Some(volume) = tick.positive_volume() else {
            return TickOutcome::Ignored(IgnoreReason::MissingVolume);
        };

        let bar = match series.series_type() {
            SeriesType::Candlestick => Bar::candle_from_tick(tick, volume),
            SeriesType::Line => Bar::point_from_tick(tick, volume),
        };
        if series.push(bar) {
            TickOutcome::Appended
        } else {
            TickOutcome::Ignored(IgnoreReason::Stale)
        }
    }

    /// Apply the snapshot's tick for the bound symbol.
    pub fn apply_snapshot(&mut self, snapshot: &LiveSnapshot) -> TickOutcome {
        let Some(symbol) = self.series().map(|series| series.symbol().clone()) else {
            return TickOutcome::Ignored(IgnoreReason::NotLoaded);
        };
        match snapshot.get(&symbol) {
            Some(tick) => self.apply_tick(tick),
            None => TickOutcome::Ignored(IgnoreReason::NoTick),
        }
    }

    /// Start an analysis of the loaded bars. `None` when nothing is loaded.
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        let series = self.series()?;
        if series.is_empty() {
            return None;
        }
        let ticket = AnalysisTicket::new(
            self.generation,
            self.analysis_request + 1,
            series.symbol().clone(),
            series.bars().to_vec(),
        );
        self.analysis_request += 1;
        self.analysis = AnalysisState::Pending;
        Some(ticket)
    }

    /// Apply an analysis result. Returns `false` if the ticket was superseded and the result dropped.
    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        result: Result<String, DataError>,
    ) -> bool {
        if ticket.generation != self.generation || ticket.request != self.analysis_request {
            debug!(symbol = %ticket.symbol(), "discarding stale analysis");
            return false;
        }

        self.analysis = match result {
            Ok(text) => AnalysisState::Ready(text),
            Err(error) => {
                warn!(symbol = %ticket.symbol(), %error, "chart analysis failed");
                AnalysisState::Failed(error.to_string())
            }
        };
        true
    }

    /// Request and install an analysis, for callers that hold the feed across the await.
    pub async fn analyze<P>(&mut self, provider: &P) -> Option<&AnalysisState>
    where
        P: AnalysisProvider + ?Sized,
    {
        let ticket = self.begin_analysis()?;
        let result = provider.chart_analysis(ticket.symbol(), ticket.bars()).await;
        self.complete_analysis(ticket, result);
        Some(&self.analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap() + Duration::minutes(minute)
    }

    fn bar(minute: i64, close: f64) -> Bar {
        Bar {
            timestamp: ts(minute),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1_000.0,
        }
    }

    fn history() -> Vec<Bar> {
        vec![bar(0, 100.0), bar(1, 101.0), bar(2, 102.0)]
    }

    fn loaded(symbol: &str, series_type: SeriesType) -> ChartFeed {
        let mut feed = ChartFeed::new();
        let ticket = feed.begin_load(symbol, series_type);
        assert_eq!(
            feed.complete_load(ticket, Ok(history())),
            LoadOutcome::Loaded { bars: 3 }
        );
        feed
    }

    struct StaticHistory(Vec<Bar>);

    #[async_trait]
    impl HistoryProvider for StaticHistory {
        async fn historical(&self, _: &str) -> Result<Vec<Bar>, DataError> {
            Ok(self.0.clone())
        }
    }

    struct EchoAnalysis;

    #[async_trait]
    impl AnalysisProvider for EchoAnalysis {
        async fn chart_analysis(&self, symbol: &str, bars: &[Bar]) -> Result<String, DataError> {
            Ok(format!("{symbol}: {} bars", bars.len()))
        }
    }

    #[test]
    fn test_apply_tick() {
        struct TestCase {
            history: Vec<Bar>,
            tick: Tick,
            expected: TickOutcome,
            expected_len: usize,
        }

        let tests = vec![
            TestCase {
                // TC0: equal timestamp is a duplicate
                history: history(),
                tick: Tick::new("AAPL", 103.0, ts(2)).with_volume(10.0),
                expected: TickOutcome::Ignored(IgnoreReason::Stale),
                expected_len: 3,
            },
            TestCase {
                // TC1: older timestamp is out of order
                history: history(),
                tick: Tick::new("AAPL", 103.0, ts(1)).with_volume(10.0),
                expected: TickOutcome::Ignored(IgnoreReason::Stale),
                expected_len: 3,
            },
            TestCase {
                // TC2: newer but zero volume
                history: history(),
                tick: Tick::new("AAPL", 103.0, ts(3)).with_volume(0.0),
                expected: TickOutcome::Ignored(IgnoreReason::MissingVolume),
                expected_len: 3,
            },
            TestCase {
                // TC3: newer but no volume at all
                history: history(),
                tick: Tick::new("AAPL", 103.0, ts(3)),
                expected: TickOutcome::Ignored(IgnoreReason::MissingVolume),
                expected_len: 3,
            },
            TestCase {
                // TC4: another symbol
                history: history(),
                tick: Tick::new("MSFT", 400.0, ts(3)).with_volume(10.0),
                expected: TickOutcome::Ignored(IgnoreReason::OtherSymbol),
                expected_len: 3,
            },
            TestCase {
                // TC5: strictly newer with volume
                history: history(),
                tick: Tick::new("AAPL", 103.0, ts(3)).with_volume(10.0),
                expected: TickOutcome::Appended,
                expected_len: 4,
            },
            TestCase {
                // TC6: empty history is never extended by live ticks
                history: vec![],
                tick: Tick::new("AAPL", 103.0, ts(3)).with_volume(5.0),
                expected: TickOutcome::Ignored(IgnoreReason::EmptyHistory),
                expected_len: 0,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut feed = ChartFeed::new();
            let ticket = feed.begin_load("AAPL", SeriesType::Candlestick);
            feed.complete_load(ticket, Ok(test.history));
            let actual = feed.apply_tick(&test.tick);
            assert_eq!(actual, test.expected, "TC{} failed", index);
            assert_eq!(feed.series().unwrap().len(), test.expected_len, "TC{} failed", index);
        }
    }

    #[test]
    fn test_ignored_tick_leaves_series_identical() {
        let mut feed = loaded("AAPL", SeriesType::Candlestick);
        let before = feed.series().unwrap().clone();

        let duplicate = Tick::new("AAPL", 999.0, ts(2)).with_volume(5.0);
        for _ in 0..3 {
            assert_eq!(
                feed.apply_tick(&duplicate),
                TickOutcome::Ignored(IgnoreReason::Stale)
            );
        }
        assert_eq!(feed.series().unwrap(), &before);
    }

    #[test]
    fn test_appends_are_monotonic_and_preserve_history() {
        let mut feed = loaded("AAPL", SeriesType::Line);
        let before = feed.series().unwrap().bars().to_vec();

        for minute in 3..10 {
            let len = feed.series().unwrap().len();
            let tick = Tick::new("AAPL", 100.0 + minute as f64, ts(minute)).with_volume(1.0);
            assert_eq!(feed.apply_tick(&tick), TickOutcome::Appended);

            let series = feed.series().unwrap();
            assert_eq!(series.len(), len + 1);
            assert!(series.bars().windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
            assert_eq!(&series.bars()[..before.len()], before.as_slice());
        }

        let series = feed.series().unwrap();
        assert_eq!(series.price().len(), series.len());
        assert_eq!(series.volume().y.len(), series.len());
    }

    #[test]
    fn test_candle_and_line_shaping() {
        let tick = Tick::new("AAPL", 103.0, ts(3))
            .with_volume(10.0)
            .with_ohlc(102.0, 104.0, 101.0);

        let mut candles = loaded("AAPL", SeriesType::Candlestick);
        candles.apply_tick(&tick);
        let last = *candles.series().unwrap().bars().last().unwrap();
        assert_eq!(
            (last.open, last.high, last.low, last.close, last.volume),
            (102.0, 104.0, 101.0, 103.0, 10.0)
        );

        let mut line = loaded("AAPL", SeriesType::Line);
        line.apply_tick(&tick);
        match line.series().unwrap().price() {
            PriceTrace::Line { y, .. } => assert_eq!(y.last(), Some(&103.0)),
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn test_independent_feeds_from_one_snapshot() {
        let mut aapl = loaded("AAPL", SeriesType::Candlestick);
        let mut msft = loaded("MSFT", SeriesType::Line);

        let snapshot = LiveSnapshot::from_iter(vec![
            Tick::new("AAPL", 103.0, ts(3)).with_volume(10.0),
            Tick::new("MSFT", 401.0, ts(4)).with_volume(20.0),
        ]);

        assert_eq!(aapl.apply_snapshot(&snapshot), TickOutcome::Appended);
        assert_eq!(msft.apply_snapshot(&snapshot), TickOutcome::Appended);

        let aapl_last = aapl.series().unwrap().bars().last().unwrap();
        let msft_last = msft.series().unwrap().bars().last().unwrap();
        assert_eq!((aapl_last.close, aapl_last.timestamp), (103.0, ts(3)));
        assert_eq!((msft_last.close, msft_last.timestamp), (401.0, ts(4)));

        // Same snapshot again changes nothing
        assert_eq!(
            aapl.apply_snapshot(&snapshot),
            TickOutcome::Ignored(IgnoreReason::Stale)
        );
        assert_eq!(aapl.series().unwrap().len(), 4);
        assert_eq!(msft.series().unwrap().len(), 4);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut feed = ChartFeed::new();
        let aapl = feed.begin_load("AAPL", SeriesType::Candlestick);
        let msft = feed.begin_load("MSFT", SeriesType::Candlestick);

        assert_eq!(feed.complete_load(msft, Ok(history())), LoadOutcome::Loaded { bars: 3 });
        assert_eq!(feed.complete_load(aapl, Ok(vec![bar(9, 1.0)])), LoadOutcome::Stale);

        assert_eq!(feed.symbol().map(|s| s.as_str()), Some("MSFT"));
        assert_eq!(feed.series().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_load_and_reload() {
        let mut feed = loaded("AAPL", SeriesType::Candlestick);

        let ticket = feed.begin_load("AAPL", SeriesType::Line);
        assert!(feed.series().is_none());
        assert_eq!(
            feed.complete_load(ticket, Err(DataError::Status(503))),
            LoadOutcome::Failed(DataError::Status(503))
        );
        assert!(matches!(feed.state(), FeedState::Failed { .. }));
        assert_eq!(feed.series_type(), Some(SeriesType::Line));

        let tick = Tick::new("AAPL", 103.0, ts(3)).with_volume(10.0);
        assert_eq!(feed.apply_tick(&tick), TickOutcome::Ignored(IgnoreReason::NotLoaded));

        let ticket = feed.begin_load("AAPL", SeriesType::Line);
        feed.complete_load(ticket, Ok(history()));
        assert_eq!(feed.apply_tick(&tick), TickOutcome::Appended);
    }

    #[test]
    fn test_analysis_lifecycle() {
        let mut feed = ChartFeed::new();
        assert!(feed.begin_analysis().is_none());

        let mut feed = loaded("AAPL", SeriesType::Candlestick);
        let before = feed.series().unwrap().clone();

        let ticket = feed.begin_analysis().unwrap();
        assert_eq!(ticket.bars().len(), 3);
        assert!(feed.analysis().is_pending());

        assert!(feed.complete_analysis(ticket, Ok("uptrend".to_string())));
        assert_eq!(feed.analysis(), &AnalysisState::Ready("uptrend".to_string()));
        assert_eq!(feed.series().unwrap(), &before);

        let ticket = feed.begin_analysis().unwrap();
        assert!(feed.complete_analysis(ticket, Err(DataError::Http("timeout".to_string()))));
        assert!(matches!(feed.analysis(), AnalysisState::Failed(_)));
    }

    #[test]
    fn test_analysis_superseded_by_reload_or_newer_request() {
        let mut feed = loaded("AAPL", SeriesType::Candlestick);

        let old = feed.begin_analysis().unwrap();
        let ticket = feed.begin_load("MSFT", SeriesType::Candlestick);
        feed.complete_load(ticket, Ok(history()));

        assert!(!feed.complete_analysis(old, Ok("AAPL analysis".to_string())));
        assert_eq!(feed.analysis(), &AnalysisState::Idle);

        let first = feed.begin_analysis().unwrap();
        let second = feed.begin_analysis().unwrap();
        assert!(!feed.complete_analysis(first, Ok("first".to_string())));
        assert!(feed.analysis().is_pending());
        assert!(feed.complete_analysis(second, Ok("second".to_string())));
        assert_eq!(feed.analysis(), &AnalysisState::Ready("second".to_string()));
    }

    #[tokio::test]
    async fn test_async_load_and_analyze() {
        let mut feed = ChartFeed::new();
        let outcome = feed
            .load(&StaticHistory(history()), "AAPL", SeriesType::Line)
            .await;
        assert_eq!(outcome, LoadOutcome::Loaded { bars: 3 });

        let state = feed.analyze(&EchoAnalysis).await.cloned();
        assert_eq!(state, Some(AnalysisState::Ready("AAPL: 3 bars".to_string())));
    }
}
