//! Progress fan-out to WebSocket listeners.
//!
//! Every connected listener holds a broadcast receiver. Publishing is
//! best-effort: no listeners is not an error, lagging listeners silently
//! miss the events that were overwritten, and the publisher never waits.

use tokio::sync::broadcast;
use tracing::{debug, trace};

use gifcast_models::{ConversionId, WsMessage};

/// Broadcast channel for conversion progress.
#[derive(Debug, Clone)]
pub struct ProgressHub {
    tx: broadcast::Sender<WsMessage>,
}

impl ProgressHub {
    /// Create a hub buffering up to `capacity` events per listener.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a message. Returns how many listeners it was queued for.
    pub fn publish(&self, message: WsMessage) -> usize {
        // Err only means there are no listeners right now
        match self.tx.send(message) {
            Ok(count) => count,
            Err(_) => {
                trace!("No progress listeners connected");
                0
            }
        }
    }

    /// Publish a progress percentage.
    pub fn progress(&self, percent: f64, conversion_id: Option<ConversionId>) -> usize {
        self.publish(WsMessage::progress(percent, conversion_id))
    }

    /// Register a listener. A scoped listener only sees its own conversion.
    pub fn subscribe(&self, scope: Option<ConversionId>) -> ProgressSubscription {
        ProgressSubscription {
            rx: self.tx.subscribe(),
            scope,
        }
    }

    /// Number of connected listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One listener's view of the hub.
#[derive(Debug)]
pub struct ProgressSubscription {
    rx: broadcast::Receiver<WsMessage>,
    scope: Option<ConversionId>,
}

impl ProgressSubscription {
    /// Next message for this listener, or `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<WsMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => {
                    if self.accepts(&message) {
                        return Some(message);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Progress listener lagged, dropping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn scope(&self) -> Option<&ConversionId> {
        self.scope.as_ref()
    }

    fn accepts(&self, message: &WsMessage) -> bool {
        match &self.scope {
            None => true,
            Some(scope) => message.conversion_id() == Some(scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent(message: &WsMessage) -> f64 {
        match message {
            WsMessage::Progress { data, .. } => *data,
        }
    }

    #[tokio::test]
    async fn test_publish_without_listeners() {
        let hub = ProgressHub::new(8);
        assert_eq!(hub.progress(10.0, None), 0);
    }

    #[tokio::test]
    async fn test_fan_out_to_every_listener() {
        let hub = ProgressHub::new(8);
        let mut a = hub.subscribe(None);
        let mut b = hub.subscribe(None);

        assert_eq!(hub.listener_count(), 2);
        assert_eq!(hub.progress(25.0, None), 2);
        assert_eq!(hub.progress(50.0, None), 2);

        for sub in [&mut a, &mut b] {
            assert_eq!(percent(&sub.next().await.unwrap()), 25.0);
            assert_eq!(percent(&sub.next().await.unwrap()), 50.0);
        }
    }

    #[tokio::test]
    async fn test_dropped_listener_does_not_affect_others() {
        let hub = ProgressHub::new(8);
        let dropped = hub.subscribe(None);
        let mut kept = hub.subscribe(None);
        drop(dropped);

        assert_eq!(hub.progress(75.0, None), 1);
        assert_eq!(percent(&kept.next().await.unwrap()), 75.0);
    }

    #[tokio::test]
    async fn test_scoped_listener_filters() {
        let hub = ProgressHub::new(8);
        let mine = ConversionId::parse("mine").unwrap();
        let theirs = ConversionId::parse("theirs").unwrap();

        let mut scoped = hub.subscribe(Some(mine.clone()));
        let mut global = hub.subscribe(None);

        hub.progress(10.0, Some(theirs));
        hub.progress(20.0, None);
        hub.progress(30.0, Some(mine.clone()));

        let received = scoped.next().await.unwrap();
        assert_eq!(percent(&received), 30.0);
        assert_eq!(received.conversion_id(), Some(&mine));

        // Unscoped listeners see the interleaved stream
        assert_eq!(percent(&global.next().await.unwrap()), 10.0);
        assert_eq!(percent(&global.next().await.unwrap()), 20.0);
        assert_eq!(percent(&global.next().await.unwrap()), 30.0);
    }

    #[tokio::test]
    async fn test_scoped_listener_stays_pending_for_other_scopes() {
        let hub = ProgressHub::new(8);
        let mut scoped = hub.subscribe(Some(ConversionId::parse("mine").unwrap()));

        hub.progress(10.0, Some(ConversionId::parse("theirs").unwrap()));

        let mut next = tokio_test::task::spawn(scoped.next());
        tokio_test::assert_pending!(next.poll());
    }

    #[tokio::test]
    async fn test_lagging_listener_skips_ahead() {
        let hub = ProgressHub::new(2);
        let mut slow = hub.subscribe(None);

        for p in [10.0, 20.0, 30.0, 40.0] {
            hub.progress(p, None);
        }

        // Oldest events were overwritten; the listener resumes with what's left
        assert_eq!(percent(&slow.next().await.unwrap()), 30.0);
        assert_eq!(percent(&slow.next().await.unwrap()), 40.0);
    }

    #[tokio::test]
    async fn test_closed_hub_ends_subscription() {
        let hub = ProgressHub::new(2);
        let mut sub = hub.subscribe(None);
        drop(hub);
        assert!(sub.next().await.is_none());
    }
}
