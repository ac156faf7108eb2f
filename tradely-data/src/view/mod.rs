//! Pure derivations over the hub's snapshots: watchlist order, transition highlighting, the
//! pinned page and the day's biggest movers among holdings.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use fnv::FnvHashMap;
use itertools::Itertools;

use crate::{
    config::DEFAULT_FLASH_DURATION,
    hub::LiveSnapshot,
    model::{PortfolioSnapshot, Symbol, Tick},
};

pub mod pins;

pub use pins::{JsonFilePinStore, PinSet, PinStore, Pins};

/// All ticks ordered by symbol, ascending.
pub fn sorted_ticks(snapshot: &LiveSnapshot) -> Vec<&Tick> {
    snapshot
        .ticks()
        .sorted_unstable_by(|a, b| a.symbol.cmp(&b.symbol))
        .collect()
}

/// Pinned symbols in pin order, each with its latest tick if the snapshot has one.
pub fn pinned_ticks<'a>(
    pins: &'a PinSet,
    snapshot: &'a LiveSnapshot,
) -> Vec<(&'a Symbol, Option<&'a Tick>)> {
    pins.iter()
        .map(|symbol| (symbol, snapshot.get(symbol)))
        .collect()
}

/// Number of gainers and losers [`top_movers`] keeps on each side.
pub const MOVERS_PER_SIDE: usize = 5;

/// A holding's profit or loss since the previous close.
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    pub symbol: Symbol,
    pub pnl: f64,
    pub pnl_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movers {
    /// Largest gain first
    pub gainers: Vec<Mover>,
    /// Largest loss first
    pub losers: Vec<Mover>,
}

/// Today's movers among held symbols.
///
/// The previous close is `price - change` from the live tick; holdings without a live change
/// have no day PnL and are left out, as are flat holdings.
pub fn top_movers(portfolio: &PortfolioSnapshot, snapshot: &LiveSnapshot) -> Movers {
    let movers = portfolio
        .holdings
        .iter()
        .filter_map(|(symbol, holding)| {
            let tick = snapshot.get(symbol)?;
            let prev_close = tick.price - tick.change?;
            let pnl = (holding.market_price - prev_close) * holding.shares;
            let basis = prev_close * holding.shares;
            let pnl_percent = if basis != 0.0 { pnl / basis * 100.0 } else { 0.0 };
            Some(Mover {
                symbol: symbol.clone(),
                pnl,
                pnl_percent,
            })
        })
        .filter(|mover| mover.pnl != 0.0 && mover.pnl.is_finite())
        .sorted_unstable_by(|a, b| b.pnl.total_cmp(&a.pnl).then_with(|| a.symbol.cmp(&b.symbol)))
        .collect::<Vec<_>>();

    let gainers = movers
        .iter()
        .take_while(|mover| mover.pnl > 0.0)
        .take(MOVERS_PER_SIDE)
        .cloned()
        .collect();
    let losers = movers
        .iter()
        .rev()
        .take_while(|mover| mover.pnl < 0.0)
        .take(MOVERS_PER_SIDE)
        .cloned()
        .collect();

    Movers { gainers, losers }
}

/// Sign of the latest price transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(tick: &Tick) -> Self {
        match tick.prev_price {
            Some(prev) if tick.price > prev => Direction::Up,
            Some(prev) if tick.price < prev => Direction::Down,
            _ => Direction::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    direction: Direction,
    started: Instant,
}

/// Short-lived highlight for symbols whose price just moved.
///
/// Feed it every new snapshot; a tick is only flashed the first time its timestamp and price
/// are seen, so feeding the same snapshot twice does not restart the highlight.
#[derive(Debug, Clone)]
pub struct FlashTracker {
    duration: Duration,
    flashes: FnvHashMap<Symbol, Flash>,
    seen: FnvHashMap<Symbol, (DateTime<Utc>, f64)>,
}

impl Default for FlashTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FLASH_DURATION)
    }
}

impl FlashTracker {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            flashes: FnvHashMap::default(),
            seen: FnvHashMap::default(),
        }
    }

    pub fn observe(&mut self, snapshot: &LiveSnapshot, now: Instant) {
        for tick in snapshot.ticks() {
            let key = (tick.timestamp, tick.price);
            if self.seen.get(&tick.symbol) == Some(&key) {
                continue;
            }
            self.seen.insert(tick.symbol.clone(), key);

            let direction = Direction::of(tick);
            if direction != Direction::Flat {
                self.flashes.insert(
                    tick.symbol.clone(),
                    Flash {
                        direction,
                        started: now,
                    },
                );
            }
        }
    }

    /// Direction to highlight `symbol` with, while its flash is still running.
    pub fn active(&self, symbol: &str, now: Instant) -> Option<Direction> {
        self.flashes
            .get(symbol)
            .filter(|flash| now.saturating_duration_since(flash.started) < self.duration)
            .map(|flash| flash.direction)
    }

    /// Forget expired flashes.
    pub fn prune(&mut self, now: Instant) {
        let duration = self.duration;
        self.flashes
            .retain(|_, flash| now.saturating_duration_since(flash.started) < duration);
    }
}
