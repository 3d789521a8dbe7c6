// Realtime transport - push delivery of widget snapshots
//
// External capability consumed by the engine: subscribe a callback to a
// channel, get pushes until unsubscribed. Delivery is at-least-once and
// unordered relative to the polling path; both simply trigger independent
// render passes, and staleness tickets settle any races.

pub mod bus;

use crate::data::Snapshot;
use std::sync::Arc;

/// Stable prefix both sides use to route a widget's pushes.
/// Channel = prefix + widget id, no registry round-trip needed.
const CHANNEL_PREFIX: &str = "widget:";

/// Channel name for a widget's refresh pushes
pub fn channel_for(widget_id: &str) -> String {
    format!("{CHANNEL_PREFIX}{widget_id}")
}

/// Callback invoked for each push on a subscribed channel.
///
/// Handlers receive an owned snapshot (cloned per subscriber) - never a
/// live reference shared with the transport.
pub type PushHandler = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// Subscribe capability. Implementations may internally fall back to
/// polling when push is unavailable; the engine neither knows nor cares.
pub trait RealtimeTransport: Send + Sync {
    fn subscribe(&self, channel: &str, handler: PushHandler) -> Subscription;
}

/// Shared handle the engine keeps for the dashboard's lifetime
pub type SharedTransport = Arc<dyn RealtimeTransport>;

/// Active subscription guard.
///
/// `unsubscribe` stops further handler invocations and is safe to call any
/// number of times; dropping the guard unsubscribes too. The cancel closure
/// runs at most once.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that was never established (transport failure).
    /// The polling fallback carries the widget in that case. Part of the
    /// contract for external transport implementations; the bundled bus
    /// never fails to subscribe.
    #[allow(dead_code)]
    pub fn dead() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn channel_names_are_deterministic() {
        assert_eq!(channel_for("a"), "widget:a");
        assert_eq!(channel_for("a"), channel_for("a"));
    }

    #[test]
    fn unsubscribe_runs_cancel_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        sub.unsubscribe();
        drop(sub);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
