//! WebSocket push subscription with heartbeat, idle timeout and backoff reconnection.
//!
//! Each subscription runs in its own task and only ever talks to the reducer through the
//! hub's event queue.

use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};
use tracing::{debug, error, info, warn};

use super::state::{ConnectionStatus, Feed, HubEvent};
use crate::{
    config::SubscriptionConfig, error::DataError, model::InboundMessage,
    streams::timeout::TimeoutStream,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a single connection ended.
enum SessionEnd {
    /// The hub is gone; the subscription must stop
    ReceiverDropped,
    Disconnected { delivered: bool },
}

/// Translate one inbound frame into a reducer event. `Ok(None)` for frames the hub ignores.
pub fn decode_frame(bytes: &[u8]) -> Result<Option<HubEvent>, DataError> {
    Ok(match InboundMessage::parse(bytes)? {
        InboundMessage::MarketData { ticks, portfolio } => Some(HubEvent::Market { ticks, portfolio }),
        InboundMessage::Alert(alert) => Some(HubEvent::Alert(alert)),
        InboundMessage::Other => None,
    })
}

/// Main subscription loop: connect, pump frames, back off, repeat until the policy gives up
/// or the hub drops its receiver.
pub(crate) async fn run_subscription(
    feed: Feed,
    config: SubscriptionConfig,
    event_tx: mpsc::Sender<HubEvent>,
) {
    info!(%feed, url = %config.url, "starting subscription");

    let mut attempt = 0u32;
    loop {
        match connect_async(config.url.as_str()).await {
            Ok((socket, _)) => {
                info!(%feed, url = %config.url, "subscription connected");
                if send_status(&event_tx, feed, ConnectionStatus::Connected).await.is_err() {
                    return;
                }

                match run_session(feed, &config, socket, &event_tx).await {
                    SessionEnd::ReceiverDropped => {
                        debug!(%feed, "hub dropped, stopping subscription");
                        return;
                    }
                    SessionEnd::Disconnected { delivered } => {
                        if delivered {
                            attempt = 0;
                        }
                    }
                }
            }
            Err(error) => {
                let error = DataError::from(error);
                error!(%feed, url = %config.url, %error, "failed to connect");
            }
        }

        if send_status(&event_tx, feed, ConnectionStatus::Disconnected).await.is_err() {
            return;
        }

        let Some(delay) = config.reconnect.delay(attempt) else {
            info!(%feed, "reconnect disabled, subscription closed");
            return;
        };

        if send_status(&event_tx, feed, ConnectionStatus::Reconnecting).await.is_err() {
            return;
        }
        debug!(%feed, ?delay, attempt, "waiting before reconnecting");
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}

async fn run_session(
    feed: Feed,
    config: &SubscriptionConfig,
    socket: Socket,
    event_tx: &mpsc::Sender<HubEvent>,
) -> SessionEnd {
    let (mut write, read) = socket.split();
    let mut read = TimeoutStream::new(read, config.read_timeout);

    let mut ping = tokio::time::interval(config.ping_interval);
    // The first tick completes immediately
    ping.tick().await;

    let mut delivered = false;
    loop {
        tokio::select! {
            _ = ping.tick() => {
                if write.send(Message::Ping(Vec::<u8>::new().into())).await.is_err() {
                    debug!(%feed, "failed to send ping, connection likely dead");
                    break;
                }
            }
            message = read.next() => {
                let frame = match message {
                    Some(Ok(Message::Text(text))) => decode_frame(text.as_bytes()),
                    Some(Ok(Message::Binary(bytes))) => decode_frame(&bytes),
                    Some(Ok(Message::Close(_))) => {
                        info!(%feed, "server closed subscription");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(error)) => {
                        let error = DataError::from(error);
                        error!(%feed, %error, "subscription error");
                        break;
                    }
                    None => {
                        warn!(%feed, timed_out = read.timed_out(), "subscription stream ended");
                        break;
                    }
                };

                delivered = true;
                match frame {
                    Ok(Some(event)) => {
                        if event_tx.send(event).await.is_err() {
                            return SessionEnd::ReceiverDropped;
                        }
                    }
                    Ok(None) => debug!(%feed, "ignoring control frame"),
                    Err(error) => warn!(%feed, %error, "dropping malformed frame"),
                }
            }
        }
    }

    let _ = write.close().await;
    SessionEnd::Disconnected { delivered }
}

async fn send_status(
    event_tx: &mpsc::Sender<HubEvent>,
    feed: Feed,
    status: ConnectionStatus,
) -> Result<(), mpsc::error::SendError<HubEvent>> {
    event_tx.send(HubEvent::Status { feed, status }).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_frame() {
        struct TestCase {
            input: &'static str,
            expected: Result<Option<&'static str>, ()>,
        }

        let tests = vec![
            TestCase {
                // TC0: market batch
                input: r#"{"type":"market_data","ticks":[{"ticker":"AAPL","timestamp":"2025-07-01","price":1.0}]}"#,
                expected: Ok(Some("market")),
            },
            TestCase {
                // TC1: alert
                input: r#"{"type":"alert","message":"hello"}"#,
                expected: Ok(Some("alert")),
            },
            TestCase {
                // TC2: welcome frame is ignored
                input: r#"{"type":"welcome"}"#,
                expected: Ok(None),
            },
            TestCase {
                // TC3: truncated JSON
                input: r#"{"type":"market_data","ticks":[{"#,
                expected: Err(()),
            },
            TestCase {
                // TC4: tick without a price
                input: r#"{"type":"market_data","ticks":[{"ticker":"AAPL","timestamp":"2025-07-01"}]}"#,
                expected: Err(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = decode_frame(test.input.as_bytes())
                .map(|event| {
                    event.map(|event| match event {
                        HubEvent::Market { .. } => "market",
                        HubEvent::Alert(_) => "alert",
                        HubEvent::Status { .. } => "status",
                    })
                })
                .map_err(|_| ());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
