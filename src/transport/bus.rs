// In-process push bus
//
// The bundled RealtimeTransport implementation: a handler table keyed by
// channel name. Publishers (the demo feed, tests) call `publish`; each
// subscribed handler gets its own clone of the snapshot. The handler count
// is observable so teardown can be verified down to zero.

use super::{PushHandler, RealtimeTransport, Subscription};
use crate::data::Snapshot;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct BusInner {
    next_id: u64,
    channels: HashMap<String, Vec<(u64, PushHandler)>>,
}

/// Publish/subscribe bus for widget refresh pushes
#[derive(Clone, Default)]
pub struct PushBus {
    inner: Arc<Mutex<BusInner>>,
}

impl PushBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a snapshot to every handler subscribed to `channel`.
    ///
    /// Handlers run synchronously on the publisher's task, outside the bus
    /// lock, each with an owned clone of the snapshot.
    pub fn publish(&self, channel: &str, snapshot: Snapshot) {
        let handlers: Vec<PushHandler> = {
            let inner = self.inner.lock().unwrap();
            match inner.channels.get(channel) {
                Some(subscribers) => subscribers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };

        for handler in handlers {
            handler(snapshot.clone());
        }
    }

    /// Total live subscriptions across all channels
    pub fn subscription_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .channels
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl RealtimeTransport for PushBus {
    fn subscribe(&self, channel: &str, handler: PushHandler) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .channels
                .entry(channel.to_string())
                .or_default()
                .push((id, handler));
            id
        };

        let bus = Arc::clone(&self.inner);
        let channel = channel.to_string();
        Subscription::new(move || {
            let mut inner = bus.lock().unwrap();
            if let Some(subscribers) = inner.channels.get_mut(&channel) {
                subscribers.retain(|(sub_id, _)| *sub_id != id);
                if subscribers.is_empty() {
                    inner.channels.remove(&channel);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::channel_for;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler() -> (PushHandler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let handler: PushHandler = Arc::new(move |_snapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (handler, count)
    }

    #[test]
    fn publish_reaches_only_the_matching_channel() {
        let bus = PushBus::new();
        let (handler_a, count_a) = counting_handler();
        let (handler_b, count_b) = counting_handler();

        let _sub_a = bus.subscribe(&channel_for("a"), handler_a);
        let _sub_b = bus.subscribe(&channel_for("b"), handler_b);

        bus.publish(&channel_for("a"), json!({ "value": 1 }));

        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_delivery_after_unsubscribe() {
        let bus = PushBus::new();
        let (handler, count) = counting_handler();

        let mut sub = bus.subscribe(&channel_for("a"), handler);
        bus.publish(&channel_for("a"), json!(1));
        sub.unsubscribe();
        sub.unsubscribe(); // second call must be safe
        bus.publish(&channel_for("a"), json!(2));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscription_count(), 0);
    }

    #[test]
    fn dropping_the_guard_unsubscribes() {
        let bus = PushBus::new();
        let (handler, _count) = counting_handler();

        let sub = bus.subscribe(&channel_for("a"), handler);
        assert_eq!(bus.subscription_count(), 1);
        drop(sub);
        assert_eq!(bus.subscription_count(), 0);
    }
}
