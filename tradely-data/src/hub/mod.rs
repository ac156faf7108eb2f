//! Live Data Hub: one market subscription and one alert subscription merged into a single
//! published [`HubState`].
//!
//! ```text
//!  market task ─┐                      ┌─> watch<HubState>        (snapshots, many readers)
//!               ├─ mpsc<HubEvent> ─> reducer (single writer)
//!  alerts task ─┘                      └─> broadcast<AlertEvent>  (fire-and-forget)
//! ```

use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{config::HubConfig, model::AlertEvent};

pub mod state;
pub mod subscription;

pub use state::{ConnectionStatus, Feed, HubEvent, HubState, LiveSnapshot};

/// Process-scoped owner of the push subscriptions and the reducer.
///
/// Constructed once at startup; hand [`HubReader`]s to consumers. Dropping the hub or calling
/// [`LiveDataHub::shutdown`] closes both subscriptions.
#[derive(Debug)]
pub struct LiveDataHub {
    state_rx: watch::Receiver<HubState>,
    alert_rx: broadcast::Receiver<AlertEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveDataHub {
    /// Open both subscriptions and start the reducer.
    pub fn spawn(config: HubConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer_size);
        let mut hub = Self::from_events(event_rx, config.alert_buffer_size);

        hub.tasks.push(tokio::spawn(subscription::run_subscription(
            Feed::Market,
            config.market,
            event_tx.clone(),
        )));
        hub.tasks.push(tokio::spawn(subscription::run_subscription(
            Feed::Alerts,
            config.alerts,
            event_tx,
        )));

        hub
    }

    /// Hub driven by an arbitrary event source instead of sockets (replays, tests).
    pub fn from_events(event_rx: mpsc::Receiver<HubEvent>, alert_buffer_size: usize) -> Self {
        let (state_tx, state_rx) = watch::channel(HubState::default());
        let (alert_tx, alert_rx) = broadcast::channel(alert_buffer_size.max(1));

        let reducer = tokio::spawn(run_reducer(event_rx, state_tx, alert_tx));

        Self {
            state_rx,
            alert_rx,
            tasks: vec![reducer],
        }
    }

    pub fn reader(&self) -> HubReader {
        HubReader {
            state_rx: self.state_rx.clone(),
            alert_rx: self.alert_rx.resubscribe(),
        }
    }

    /// Latest published state.
    pub fn state(&self) -> HubState {
        self.state_rx.borrow().clone()
    }

    /// Close both subscriptions and stop the reducer. No update is published once this returns.
    pub async fn shutdown(mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            let _ = task.await;
        }
        info!("live data hub shut down");
    }
}

impl Drop for LiveDataHub {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Read-only view of the hub handed to consumers.
#[derive(Debug)]
pub struct HubReader {
    state_rx: watch::Receiver<HubState>,
    alert_rx: broadcast::Receiver<AlertEvent>,
}

impl Clone for HubReader {
    fn clone(&self) -> Self {
        Self {
            state_rx: self.state_rx.clone(),
            alert_rx: self.alert_rx.resubscribe(),
        }
    }
}

impl HubReader {
    /// Latest published state.
    pub fn snapshot(&self) -> HubState {
        self.state_rx.borrow().clone()
    }

    /// Latest state if it changed since this reader last looked.
    pub fn snapshot_if_changed(&mut self) -> Option<HubState> {
        match self.state_rx.has_changed() {
            Ok(true) => Some(self.state_rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next published state. `None` once the hub has shut down.
    pub async fn changed(&mut self) -> Option<HubState> {
        self.state_rx.changed().await.ok()?;
        Some(self.state_rx.borrow_and_update().clone())
    }

    /// Next alert not yet consumed by this reader, if any. Alerts that overflowed are skipped.
    pub fn try_next_alert(&mut self) -> Option<AlertEvent> {
        loop {
            match self.alert_rx.try_recv() {
                Ok(alert) => return Some(alert),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "alert reader lagged");
                }
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next alert. `None` once the hub has shut down.
    pub async fn next_alert(&mut self) -> Option<AlertEvent> {
        loop {
            match self.alert_rx.recv().await {
                Ok(alert) => return Some(alert),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "alert reader lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

async fn run_reducer(
    mut event_rx: mpsc::Receiver<HubEvent>,
    state_tx: watch::Sender<HubState>,
    alert_tx: broadcast::Sender<AlertEvent>,
) {
    let mut state = HubState::default();

    while let Some(event) = event_rx.recv().await {
        if let HubEvent::Alert(alert) = event {
            debug!(severity = %alert.severity, "alert received");
            // No receivers is fine: alerts are fire-and-forget
            let _ = alert_tx.send(alert);
            continue;
        }

        if let Some(next) = state.apply(event) {
            state = next;
            state_tx.send_replace(state.clone());
        }
    }

    debug!("hub event sources closed, reducer stopping");
}
