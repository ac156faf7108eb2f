//! Runtime configuration for the hub, REST client and local state.
//!
//! Every value has a default matching a backend running on `localhost:8000`, and can be
//! overridden through `TRADELY_*` environment variables or the `with_*` builders.
//!
//! | Variable | Default |
//! |---|---|
//! | `TRADELY_API_URL` | `http://localhost:8000/api` |
//! | `TRADELY_MARKET_WS_URL` | `ws://localhost:8000/ws/market-data` |
//! | `TRADELY_ALERTS_WS_URL` | `ws://localhost:8000/ws/alerts` |
//! | `TRADELY_PIN_FILE` | `pinned_tickers.json` |
//! | `TRADELY_FLASH_MS` | `500` |
//! | `TRADELY_READ_TIMEOUT_SECS` | `60` |

use std::{path::PathBuf, str::FromStr, time::Duration};

use tracing::warn;
use url::Url;

use crate::{error::DataError, streams::timeout::DEFAULT_READ_TIMEOUT};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_MARKET_WS_URL: &str = "ws://localhost:8000/ws/market-data";
pub const DEFAULT_ALERTS_WS_URL: &str = "ws://localhost:8000/ws/alerts";
pub const DEFAULT_PIN_FILE: &str = "pinned_tickers.json";
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(500);

/// How a dropped subscription is re-opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Stay disconnected after the first drop
    Never,
    /// Exponential backoff: `initial`, doubled per consecutive failure, capped at `max`
    Backoff { initial: Duration, max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Backoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt number `attempt` (0 based), or `None` if no retry should happen.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Backoff { initial, max } => {
                let factor = 2u32.saturating_pow(attempt);
                Some(initial.saturating_mul(factor).min(max))
            }
        }
    }
}

/// Push subscription configuration
#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    /// WebSocket URL
    pub url: String,
    /// Ping interval to keep the connection alive
    pub ping_interval: Duration,
    /// Idle period after which the socket is treated as dropped
    pub read_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl SubscriptionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ping_interval: Duration::from_secs(30),
            read_timeout: DEFAULT_READ_TIMEOUT,
            reconnect: ReconnectPolicy::default(),
        }
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// Hub configuration: one market subscription and one alert subscription.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub market: SubscriptionConfig,
    pub alerts: SubscriptionConfig,
    /// Capacity of the queue between socket tasks and the reducer
    pub event_buffer_size: usize,
    /// Capacity of the alert broadcast channel; slow readers miss older alerts
    pub alert_buffer_size: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MARKET_WS_URL, DEFAULT_ALERTS_WS_URL)
    }
}

impl HubConfig {
    pub fn new(market_url: impl Into<String>, alerts_url: impl Into<String>) -> Self {
        Self {
            market: SubscriptionConfig::new(market_url),
            alerts: SubscriptionConfig::new(alerts_url),
            event_buffer_size: 1_000,
            alert_buffer_size: 64,
        }
    }

    /// Apply the same reconnect policy to both subscriptions.
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.market.reconnect = reconnect;
        self.alerts.reconnect = reconnect;
        self
    }

    /// Apply the same idle timeout to both subscriptions.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.market.read_timeout = timeout;
        self.alerts.read_timeout = timeout;
        self
    }
}

/// Top level configuration for a Tradely client.
#[derive(Debug, Clone)]
pub struct TradelyConfig {
    /// REST base URL, e.g. `http://localhost:8000/api`
    pub api_url: String,
    pub hub: HubConfig,
    /// Location of the persisted pin set
    pub pin_file: PathBuf,
    /// How long a price transition stays highlighted
    pub flash_duration: Duration,
}

impl Default for TradelyConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            hub: HubConfig::default(),
            pin_file: PathBuf::from(DEFAULT_PIN_FILE),
            flash_duration: DEFAULT_FLASH_DURATION,
        }
    }
}

impl TradelyConfig {
    /// Build from `TRADELY_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any `TRADELY_*` key lookup, falling back to defaults for missing or
    /// unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("TRADELY_API_URL").unwrap_or(defaults.api_url);
        let market_url =
            lookup("TRADELY_MARKET_WS_URL").unwrap_or_else(|| DEFAULT_MARKET_WS_URL.to_string());
        let alerts_url =
            lookup("TRADELY_ALERTS_WS_URL").unwrap_or_else(|| DEFAULT_ALERTS_WS_URL.to_string());
        let pin_file = lookup("TRADELY_PIN_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.pin_file);
        let flash_duration = parse_var(&lookup, "TRADELY_FLASH_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.flash_duration);
        let read_timeout = parse_var(&lookup, "TRADELY_READ_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_READ_TIMEOUT);

        Self {
            api_url,
            hub: HubConfig::new(market_url, alerts_url).with_read_timeout(read_timeout),
            pin_file,
            flash_duration,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    pub fn with_pin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pin_file = path.into();
        self
    }

    /// Check that every endpoint is a well formed URL with the expected scheme.
    pub fn validate(&self) -> Result<(), DataError> {
        check_scheme(&self.api_url, &["http", "https"])?;
        check_scheme(&self.hub.market.url, &["ws", "wss"])?;
        check_scheme(&self.hub.alerts.url, &["ws", "wss"])?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "not a number, using default");
            None
        }
    }
}

fn check_scheme(raw: &str, allowed: &[&str]) -> Result<Url, DataError> {
    let url = Url::parse(raw)?;
    if allowed.contains(&url.scheme()) {
        Ok(url)
    } else {
        Err(DataError::Config(format!(
            "{raw}: expected scheme {}, got {}",
            allowed.join("/"),
            url.scheme()
        )))
    }
}
