//! Hub state and its single-writer reducer.
//!
//! [`HubState::apply`] is a pure function: the reducer task owns the only mutable copy of
//! the state and publishes each successor, so readers only ever see whole snapshots.

use std::sync::Arc;

use fnv::FnvHashMap;

use crate::model::{AlertEvent, PortfolioSnapshot, Symbol, Tick};

/// Which push subscription an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Feed {
    #[display("market")]
    Market,
    #[display("alerts")]
    Alerts,
}

/// Connection status updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
    Reconnecting,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// Input to the reducer, produced by the subscription tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// A market batch, optionally carrying a fresh portfolio payload
    Market {
        ticks: Vec<Tick>,
        portfolio: Option<PortfolioSnapshot>,
    },
    /// A notice from the alert subscription; fanned out, never stored
    Alert(AlertEvent),
    Status {
        feed: Feed,
        status: ConnectionStatus,
    },
}

/// Latest known tick per symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSnapshot {
    ticks: FnvHashMap<Symbol, Tick>,
}

impl LiveSnapshot {
    pub fn get(&self, symbol: &str) -> Option<&Tick> {
        self.ticks.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.ticks.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Ticks in arbitrary order; use [`crate::view::sorted_ticks`] for display order.
    pub fn ticks(&self) -> impl Iterator<Item = &Tick> {
        self.ticks.values()
    }

    /// Produce the successor snapshot for a batch.
    ///
    /// Symbols outside the batch survive unchanged. Each incoming tick's `prev_price` is the
    /// price this snapshot holds for its symbol, so a symbol repeated within one batch still
    /// compares against the previous snapshot rather than its earlier sibling.
    pub fn merge<I>(&self, batch: I) -> LiveSnapshot
    where
        I: IntoIterator<Item = Tick>,
    {
        let mut ticks = self.ticks.clone();
        for mut tick in batch {
            tick.prev_price = self.ticks.get(&tick.symbol).map(|previous| previous.price);
            ticks.insert(tick.symbol.clone(), tick);
        }
        LiveSnapshot { ticks }
    }
}

impl FromIterator<Tick> for LiveSnapshot {
    fn from_iter<T: IntoIterator<Item = Tick>>(iter: T) -> Self {
        LiveSnapshot::default().merge(iter)
    }
}

/// Everything the hub exposes to readers. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct HubState {
    pub live: Arc<LiveSnapshot>,
    pub portfolio: Option<Arc<PortfolioSnapshot>>,
    pub market_status: ConnectionStatus,
    pub alerts_status: ConnectionStatus,
    /// Number of updates published so far
    pub sequence: u64,
}

impl HubState {
    /// Connectivity flag: true while the market subscription is open.
    pub fn is_connected(&self) -> bool {
        self.market_status.is_connected()
    }

    /// Successor state for `event`, or `None` if the event leaves the state untouched.
    pub fn apply(&self, event: HubEvent) -> Option<HubState> {
        let mut next = match event {
            HubEvent::Market { ticks, portfolio } => {
                if ticks.is_empty() && portfolio.is_none() {
                    return None;
                }
                let mut next = self.clone();
                if !ticks.is_empty() {
                    next.live = Arc::new(self.live.merge(ticks));
                }
                if let Some(portfolio) = portfolio {
                    next.portfolio = Some(Arc::new(portfolio));
                }
                next
            }
            HubEvent::Alert(_) => return None,
            HubEvent::Status { feed, status } => {
                let current = match feed {
                    Feed::Market => self.market_status,
                    Feed::Alerts => self.alerts_status,
                };
                if current == status {
                    return None;
                }
                let mut next = self.clone();
                match feed {
                    Feed::Market => next.market_status = status,
                    Feed::Alerts => next.alerts_status = status,
                }
                next
            }
        };
        next.sequence = self.sequence + 1;
        Some(next)
    }
}
