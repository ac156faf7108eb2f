//! Idle-timeout wrapper for push subscription streams.
//!
//! A subscription socket can die silently (no close frame, no error). This wrapper
//! ends the stream if nothing at all arrives for a configured period, which the
//! subscription loop then treats like any other disconnect.

use futures::Stream;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::time::Instant;

/// Default idle period after which a push subscription is considered dead.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Stream wrapper that terminates once the inner stream has been idle for `timeout_duration`.
#[derive(Debug)]
pub struct TimeoutStream<S> {
    inner: S,
    timeout_duration: Duration,
    deadline: Pin<Box<tokio::time::Sleep>>,
    timed_out: bool,
}

impl<S> TimeoutStream<S> {
    pub fn new(inner: S, timeout_duration: Duration) -> Self {
        Self {
            inner,
            timeout_duration,
            deadline: Box::pin(tokio::time::sleep(timeout_duration)),
            timed_out: false,
        }
    }

    /// True once the stream ended because of the idle deadline rather than the inner stream.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}

impl<S> Stream for TimeoutStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.timed_out {
            return Poll::Ready(None);
        }

        let timeout_duration = self.timeout_duration;

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(item)) => {
                self.deadline
                    .as_mut()
                    .reset(Instant::now() + timeout_duration);
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => match self.deadline.as_mut().poll(cx) {
                Poll::Ready(()) => {
                    tracing::warn!(
                        timeout_secs = timeout_duration.as_secs(),
                        "subscription read timeout - no data received, treating as disconnect"
                    );
                    self.timed_out = true;
                    Poll::Ready(None)
                }
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn test_idle_stream_times_out() {
        let inner = futures::stream::pending::<u8>();
        let mut stream = TimeoutStream::new(inner, Duration::from_secs(5));

        assert_eq!(stream.next().await, None);
        assert!(stream.timed_out());
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_stream_passes_items_through() {
        let inner = futures::stream::iter(vec![1, 2, 3]);
        let mut stream = TimeoutStream::new(inner, Duration::from_secs(5));

        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, Some(3));
        assert_eq!(stream.next().await, None);
        assert!(!stream.timed_out());
    }
}
