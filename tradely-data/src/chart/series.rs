use chrono::{DateTime, Utc};

use crate::model::{Bar, Symbol};

/// How the price pane is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SeriesType {
    #[default]
    #[display("candlestick")]
    Candlestick,
    #[display("line")]
    Line,
}

impl SeriesType {
    pub fn toggled(self) -> Self {
        match self {
            SeriesType::Candlestick => SeriesType::Line,
            SeriesType::Line => SeriesType::Candlestick,
        }
    }
}

/// Columnar price trace, shaped by [`SeriesType`].
#[derive(Debug, Clone, PartialEq)]
pub enum PriceTrace {
    Candlestick {
        x: Vec<DateTime<Utc>>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Line {
        x: Vec<DateTime<Utc>>,
        y: Vec<f64>,
    },
}

impl PriceTrace {
    fn empty(series_type: SeriesType) -> Self {
        match series_type {
            SeriesType::Candlestick => PriceTrace::Candlestick {
                x: Vec::new(),
                open: Vec::new(),
                high: Vec::new(),
                low: Vec::new(),
                close: Vec::new(),
            },
            SeriesType::Line => PriceTrace::Line {
                x: Vec::new(),
                y: Vec::new(),
            },
        }
    }

    fn push(&mut self, bar: &Bar) {
        match self {
            PriceTrace::Candlestick {
                x,
                open,
                high,
                low,
                close,
            } => {
                x.push(bar.timestamp);
                open.push(bar.open);
                high.push(bar.high);
                low.push(bar.low);
                close.push(bar.close);
            }
            PriceTrace::Line { x, y } => {
                x.push(bar.timestamp);
                y.push(bar.close);
            }
        }
    }

    pub fn x(&self) -> &[DateTime<Utc>] {
        match self {
            PriceTrace::Candlestick { x, .. } | PriceTrace::Line { x, .. } => x,
        }
    }

    pub fn len(&self) -> usize {
        self.x().len()
    }

    pub fn is_empty(&self) -> bool {
        self.x().is_empty()
    }

    /// Lowest and highest value plotted, if any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let (lows, highs) = match self {
            PriceTrace::Candlestick { low, high, .. } => (low, high),
            PriceTrace::Line { y, .. } => (y, y),
        };
        let min = lows.iter().copied().reduce(f64::min)?;
        let max = highs.iter().copied().reduce(f64::max)?;
        Some((min, max))
    }
}

/// Columnar volume trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeTrace {
    pub x: Vec<DateTime<Utc>>,
    pub y: Vec<f64>,
}

impl VolumeTrace {
    fn push(&mut self, bar: &Bar) {
        self.x.push(bar.timestamp);
        self.y.push(bar.volume);
    }
}

/// Append-only bar buffer for one symbol plus the traces projected from it.
///
/// Bars are kept in strictly increasing timestamp order; nothing ever edits or removes one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    symbol: Symbol,
    series_type: SeriesType,
    bars: Vec<Bar>,
    price: PriceTrace,
    volume: VolumeTrace,
}

impl ChartSeries {
    /// Base series from a historical window. Bars are ordered by time and later bars sharing a
    /// timestamp with an earlier one are dropped.
    pub fn from_history(
        symbol: impl Into<Symbol>,
        series_type: SeriesType,
        mut history: Vec<Bar>,
    ) -> Self {
        history.sort_by_key(|bar| bar.timestamp);
        history.dedup_by_key(|bar| bar.timestamp);

        let mut price = PriceTrace::empty(series_type);
        let mut volume = VolumeTrace::default();
        for bar in &history {
            price.push(bar);
            volume.push(bar);
        }

        Self {
            symbol: symbol.into(),
            series_type,
            bars: history,
            price,
            volume,
        }
    }

    /// Append `bar` if it is strictly newer than the last one. Returns whether it was appended.
    pub fn push(&mut self, bar: Bar) -> bool {
        if self
            .last_timestamp()
            .is_some_and(|last| bar.timestamp <= last)
        {
            return false;
        }
        self.price.push(&bar);
        self.volume.push(&bar);
        self.bars.push(bar);
        true
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn series_type(&self) -> SeriesType {
        self.series_type
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn price(&self) -> &PriceTrace {
        &self.price
    }

    pub fn volume(&self) -> &VolumeTrace {
        &self.volume
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|bar| bar.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(minute: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap() + Duration::minutes(minute),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn test_from_history_sorts_and_drops_duplicate_timestamps() {
        let series = ChartSeries::from_history(
            "AAPL",
            SeriesType::Line,
            vec![bar(2, 12.0), bar(0, 10.0), bar(1, 11.0), bar(1, 99.0)],
        );

        let closes = series.bars().iter().map(|bar| bar.close).collect::<Vec<_>>();
        assert_eq!(closes, vec![10.0, 11.0, 12.0]);
        assert_eq!(
            series.price(),
            &PriceTrace::Line {
                x: series.bars().iter().map(|bar| bar.timestamp).collect(),
                y: vec![10.0, 11.0, 12.0],
            }
        );
        assert_eq!(series.volume().y, vec![100.0; 3]);
    }

    #[test]
    fn test_candlestick_trace_columns() {
        let series = ChartSeries::from_history("AAPL", SeriesType::Candlestick, vec![bar(0, 10.0)]);
        match series.price() {
            PriceTrace::Candlestick {
                open, high, low, close, ..
            } => {
                assert_eq!((open[0], high[0], low[0], close[0]), (9.0, 11.0, 8.0, 10.0));
            }
            other => panic!("unexpected trace {other:?}"),
        }
        assert_eq!(series.price().bounds(), Some((8.0, 11.0)));
    }

    #[test]
    fn test_push_rejects_equal_and_older_bars() {
        let mut series =
            ChartSeries::from_history("AAPL", SeriesType::Candlestick, vec![bar(0, 10.0), bar(1, 11.0)]);
        let before = series.clone();

        assert!(!series.push(bar(1, 50.0)));
        assert!(!series.push(bar(0, 50.0)));
        assert_eq!(series, before);

        assert!(series.push(bar(2, 12.0)));
        assert_eq!(series.len(), 3);
        assert_eq!(series.price().len(), 3);
        assert_eq!(series.volume().x.len(), 3);
        assert_eq!(&series.bars()[..2], before.bars());
    }

    #[test]
    fn test_series_type_toggle() {
        assert_eq!(SeriesType::default().toggled(), SeriesType::Line);
        assert_eq!(SeriesType::Line.toggled(), SeriesType::Candlestick);
        assert_eq!(SeriesType::Line.to_string(), "line");
    }
}
