// Widget instances - the per-widget resource bundle
//
// Everything a live widget owns sits in one record so it is released as a
// unit: container, subscription, poll task, alive flag. Splitting these up
// is how the classic "forgot to cancel one of the two refresh paths" leak
// happens, so the bundle is the only place handles may live.

use crate::config::dashboard::WidgetSpec;
use crate::data::{DataSource, SharedDataSource, Snapshot};
use crate::engine::container::ContainerHandle;
use crate::engine::dispatch::{self, DispatchOutcome, StateCell, WidgetState};
use crate::events::{EngineEvent, RefreshTrigger};
use crate::transport::Subscription;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Staleness tickets for one widget.
///
/// Every refresh trigger takes a ticket before its fetch; the completion
/// renders only if no higher ticket has rendered since. The gate mutex is
/// held across the (synchronous) render so a stale completion can neither
/// render nor interleave with a fresher one.
#[derive(Debug, Default)]
pub(crate) struct RefreshSeq {
    next: AtomicU64,
    applied: Mutex<u64>,
}

impl RefreshSeq {
    /// Tickets start at 1; `applied` starts at 0
    pub fn take_ticket(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Run `render` iff `ticket` is fresher than the last applied one.
    /// Returns whether the render ran.
    pub fn apply_if_fresh(&self, ticket: u64, render: impl FnOnce()) -> bool {
        let mut applied = self.applied.lock().unwrap();
        if ticket <= *applied {
            return false;
        }
        *applied = ticket;
        render();
        true
    }
}

/// State shared between the lifecycle manager and a widget's refresh tasks
pub(crate) struct WidgetShared {
    pub spec: WidgetSpec,
    pub container: ContainerHandle,
    pub source: SharedDataSource,
    pub state: StateCell,
    seq: RefreshSeq,
    alive: AtomicBool,
    events_tx: mpsc::Sender<EngineEvent>,
}

impl WidgetShared {
    pub fn new(
        spec: WidgetSpec,
        container: ContainerHandle,
        source: SharedDataSource,
        events_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            spec,
            container,
            source,
            state: StateCell::new(),
            seq: RefreshSeq::default(),
            alive: AtomicBool::new(true),
            events_tx,
        }
    }

    pub fn alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// First step of teardown: no refresh may touch the surface after this
    pub fn kill(&self) {
        self.alive.store(false, Ordering::Release);
        self.state.transition(WidgetState::Destroyed);
    }

    /// Fire-and-forget event emission; a full channel drops the event
    /// rather than block a refresh task
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events_tx.try_send(event);
    }

    /// Push path: the transport already delivered the snapshot, so render
    /// it directly - no fetch round-trip
    pub fn apply_push(&self, snapshot: Snapshot) {
        if !self.alive() {
            return;
        }
        self.emit(EngineEvent::PushReceived {
            widget_id: self.spec.id.clone(),
            timestamp: Utc::now(),
        });

        let ticket = self.seq.take_ticket();
        let mut outcome = None;
        self.seq.apply_if_fresh(ticket, || {
            outcome = Some(dispatch::dispatch(
                &self.container,
                &self.spec,
                Ok(snapshot),
                &self.state,
            ));
        });
        if let Some(outcome) = outcome {
            self.report(outcome, RefreshTrigger::Push);
        }
    }

    /// Translate a dispatch outcome into an engine event + log line
    fn report(&self, outcome: DispatchOutcome, trigger: RefreshTrigger) {
        let widget_id = self.spec.id.clone();
        match outcome {
            DispatchOutcome::Rendered => {
                tracing::debug!(widget = %widget_id, trigger = trigger.as_str(), "rendered");
                self.emit(EngineEvent::Rendered {
                    widget_id,
                    timestamp: Utc::now(),
                    trigger,
                });
            }
            DispatchOutcome::RenderFailed(reason) => {
                tracing::warn!(widget = %widget_id, %reason, "template render failed");
                self.emit(EngineEvent::RenderFailed {
                    widget_id,
                    timestamp: Utc::now(),
                    reason,
                });
            }
            DispatchOutcome::FetchFailed(reason) => {
                tracing::warn!(widget = %widget_id, %reason, "snapshot fetch failed");
                self.emit(EngineEvent::FetchFailed {
                    widget_id,
                    timestamp: Utc::now(),
                    reason,
                });
            }
        }
    }
}

/// Fetch-and-render pass for the initial render and every poll tick.
///
/// The alive check happens after the await: teardown cannot cancel an
/// in-flight fetch, but its completion must never write into a torn-down
/// container. The ticket check then discards completions that lost the
/// race against a newer poll/push render.
pub(crate) async fn refresh(shared: Arc<WidgetShared>, trigger: RefreshTrigger) {
    let ticket = shared.seq.take_ticket();
    let fetched = shared.source.fetch(&shared.spec.id).await;

    if !shared.alive() {
        return;
    }

    let mut outcome = None;
    let applied = shared.seq.apply_if_fresh(ticket, || {
        outcome = Some(dispatch::dispatch(
            &shared.container,
            &shared.spec,
            fetched,
            &shared.state,
        ));
    });

    if !applied {
        tracing::debug!(widget = %shared.spec.id, "discarding stale snapshot");
        return;
    }
    if let Some(outcome) = outcome {
        shared.report(outcome, trigger);
    }
}

/// Runtime record for one live widget, owned exclusively by the lifecycle
/// manager. At most one subscription and one poll handle exist per widget;
/// both are released together in [`WidgetInstance::teardown`].
pub(crate) struct WidgetInstance {
    pub shared: Arc<WidgetShared>,
    pub subscription: Option<Subscription>,
    pub poller: Option<JoinHandle<()>>,
}

impl WidgetInstance {
    /// Release all resources: alive flag first, then the poll timer, then
    /// the subscription - the reverse of registration order, so nothing can
    /// schedule a render after teardown has begun.
    pub fn teardown(&mut self) {
        self.shared.kill();
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.shared.container.with_surface(|surface| surface.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_monotonic() {
        let seq = RefreshSeq::default();
        assert_eq!(seq.take_ticket(), 1);
        assert_eq!(seq.take_ticket(), 2);
        assert_eq!(seq.take_ticket(), 3);
    }

    #[test]
    fn stale_ticket_does_not_render() {
        let seq = RefreshSeq::default();
        let old = seq.take_ticket();
        let new = seq.take_ticket();

        assert!(seq.apply_if_fresh(new, || {}));

        let mut ran = false;
        assert!(!seq.apply_if_fresh(old, || ran = true));
        assert!(!ran);
    }

    #[test]
    fn same_ticket_cannot_apply_twice() {
        let seq = RefreshSeq::default();
        let ticket = seq.take_ticket();
        assert!(seq.apply_if_fresh(ticket, || {}));
        assert!(!seq.apply_if_fresh(ticket, || {}));
    }
}
