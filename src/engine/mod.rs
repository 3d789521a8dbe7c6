// Widget lifecycle manager
//
// Owns every live widget on the dashboard: creates container surfaces,
// performs the first render, wires up both refresh paths (push subscription
// + poll fallback timer), and guarantees deterministic teardown. All
// handles live in per-widget resource bundles (WidgetInstance) so the two
// refresh paths can never be released separately.

pub mod container;
pub mod dispatch;
mod instance;

use crate::config::dashboard::WidgetSpec;
use crate::data::SharedDataSource;
use crate::engine::container::{ContainerHandle, SharedContainers};
use crate::engine::dispatch::WidgetState;
use crate::engine::instance::{refresh, WidgetInstance, WidgetShared};
use crate::events::{EngineEvent, RefreshTrigger};
use crate::transport::{channel_for, PushHandler, RealtimeTransport, SharedTransport};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Orchestrator for one dashboard's widgets.
///
/// `render` and `destroy` are the only public operations; everything else
/// (refresh scheduling, failure isolation, staleness) happens inside the
/// tasks they spawn. Exactly one `WidgetInstance` exists per widget id at
/// any time - `render` always tears down the previous instance set first,
/// so re-registering an id cannot leak a duplicate timer or subscription.
pub struct DashboardEngine {
    source: SharedDataSource,
    transport: SharedTransport,
    containers: SharedContainers,
    instances: Vec<WidgetInstance>,
    events_tx: mpsc::Sender<EngineEvent>,
}

impl DashboardEngine {
    pub fn new(
        source: SharedDataSource,
        transport: SharedTransport,
        events_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            source,
            transport,
            containers: Arc::new(Mutex::new(Vec::new())),
            instances: Vec::new(),
            events_tx,
        }
    }

    /// The ordered container list the display loop draws each frame
    pub fn containers(&self) -> SharedContainers {
        Arc::clone(&self.containers)
    }

    /// Build the dashboard from a spec list.
    ///
    /// Any previous instance set is destroyed first; partial reuse is
    /// disallowed. Disabled specs produce nothing at all. With zero enabled
    /// widgets a single empty-state placeholder is shown instead of a
    /// blank screen.
    pub fn render(&mut self, specs: &[WidgetSpec]) {
        self.destroy();

        let enabled: Vec<&WidgetSpec> = specs.iter().filter(|s| s.config.enabled).collect();
        tracing::info!(
            widgets = enabled.len(),
            total = specs.len(),
            "rendering dashboard"
        );

        if enabled.is_empty() {
            let placeholder = ContainerHandle::new("empty-state", " dashboard ", "");
            dispatch::show_empty_state(&placeholder);
            self.containers.lock().unwrap().push(placeholder);
            return;
        }

        for spec in enabled {
            self.spawn_widget(spec.clone());
        }
    }

    /// Tear everything down: for each widget the alive flag drops first,
    /// then the poll timer, then the subscription (reverse of registration
    /// order), then surfaces and records are cleared. Idempotent - calling
    /// this twice, or before any render, has no effect beyond the first.
    pub fn destroy(&mut self) {
        let nothing_live =
            self.instances.is_empty() && self.containers.lock().unwrap().is_empty();
        if nothing_live {
            return;
        }

        for mut instance in self.instances.drain(..) {
            instance.teardown();
        }
        self.containers.lock().unwrap().clear();

        tracing::info!("dashboard destroyed");
        let _ = self.events_tx.try_send(EngineEvent::Destroyed {
            timestamp: Utc::now(),
        });
    }

    /// Live poll timers (teardown verification)
    pub fn active_pollers(&self) -> usize {
        self.instances.iter().filter(|i| i.poller.is_some()).count()
    }

    /// Live subscriptions held by the engine (transport-side counts come
    /// from the transport itself)
    pub fn active_subscriptions(&self) -> usize {
        self.instances
            .iter()
            .filter(|i| i.subscription.is_some())
            .count()
    }

    /// Current state of every live widget
    pub fn widget_states(&self) -> Vec<(String, WidgetState)> {
        self.instances
            .iter()
            .map(|i| (i.shared.spec.id.clone(), i.shared.state.current()))
            .collect()
    }

    fn spawn_widget(&mut self, spec: WidgetSpec) {
        let container = ContainerHandle::new(&spec.id, spec.title(), &spec.app.icon);
        dispatch::show_loading(&container);
        self.containers.lock().unwrap().push(container.clone());

        let shared = Arc::new(WidgetShared::new(
            spec.clone(),
            container,
            Arc::clone(&self.source),
            self.events_tx.clone(),
        ));
        shared.state.transition(WidgetState::Loading);

        // Initial fetch-and-render always runs, refresh wiring only for
        // positive intervals
        tokio::spawn(refresh(Arc::clone(&shared), RefreshTrigger::Initial));

        let mut subscription = None;
        let mut poller = None;

        if spec.config.refresh_interval_secs > 0 {
            // Registration order: subscription, then the poll fallback
            let push_shared = Arc::clone(&shared);
            let handler: PushHandler = Arc::new(move |snapshot| push_shared.apply_push(snapshot));
            subscription = Some(self.transport.subscribe(&channel_for(&spec.id), handler));

            let poll_shared = Arc::clone(&shared);
            let period = Duration::from_secs(spec.config.refresh_interval_secs);
            poller = Some(tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                // interval fires immediately once; the initial render
                // already covers t=0
                interval.tick().await;
                loop {
                    interval.tick().await;
                    if !poll_shared.alive() {
                        break;
                    }
                    poll_shared.emit(EngineEvent::PollTick {
                        widget_id: poll_shared.spec.id.clone(),
                        timestamp: Utc::now(),
                    });
                    refresh(Arc::clone(&poll_shared), RefreshTrigger::Poll).await;
                }
            }));

            tracing::debug!(
                widget = %spec.id,
                interval_secs = spec.config.refresh_interval_secs,
                "refresh wired (push + poll fallback)"
            );
        }

        self.instances.push(WidgetInstance {
            shared,
            subscription,
            poller,
        });
    }
}

impl Drop for DashboardEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataSource, Snapshot};
    use crate::registry::TemplateKind;
    use crate::transport::bus::PushBus;
    use anyhow::{anyhow, Result};
    use futures::future::BoxFuture;
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    /// Data source that replays a script of outcomes per fetch, then keeps
    /// returning a fixed snapshot
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Snapshot>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Snapshot>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
            })
        }

        fn ok() -> Arc<Self> {
            Self::new(Vec::new())
        }
    }

    impl DataSource for ScriptedSource {
        fn fetch<'a>(&'a self, _widget_id: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
            let next = self.script.lock().unwrap().pop_front();
            Box::pin(async move {
                match next {
                    Some(outcome) => outcome,
                    None => Ok(json!({ "headline": "steady" })),
                }
            })
        }
    }

    /// Data source whose first fetch blocks until released; later fetches
    /// resolve immediately. Used to race a slow fetch against newer renders.
    struct SlowFirstSource {
        release: Arc<Notify>,
        first_taken: Mutex<bool>,
    }

    impl SlowFirstSource {
        fn new(release: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                release,
                first_taken: Mutex::new(false),
            })
        }
    }

    impl DataSource for SlowFirstSource {
        fn fetch<'a>(&'a self, _widget_id: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
            let is_first = {
                let mut taken = self.first_taken.lock().unwrap();
                !std::mem::replace(&mut *taken, true)
            };
            Box::pin(async move {
                if is_first {
                    self.release.notified().await;
                    Ok(json!({ "headline": "stale" }))
                } else {
                    Ok(json!({ "headline": "fresh" }))
                }
            })
        }
    }

    fn engine_with(source: SharedDataSource) -> (DashboardEngine, PushBus) {
        let bus = PushBus::new();
        // receiver dropped: emit() ignores send errors by design
        let (events_tx, _events_rx) = mpsc::channel(64);
        let engine = DashboardEngine::new(source, Arc::new(bus.clone()), events_tx);
        (engine, bus)
    }

    fn spec(id: &str, template: TemplateKind, enabled: bool, interval: u64) -> WidgetSpec {
        WidgetSpec::for_tests(id, template, enabled, interval)
    }

    async fn settle() {
        // paused-clock runtimes auto-advance past this sleep once all
        // spawned refresh tasks are idle
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_widgets_get_no_resources() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        engine.render(&[
            spec("a", TemplateKind::Text, true, 30),
            spec("b", TemplateKind::Text, false, 30),
        ]);
        settle().await;

        assert_eq!(engine.containers().lock().unwrap().len(), 1);
        assert_eq!(engine.active_subscriptions(), 1);
        assert_eq!(engine.active_pollers(), 1);
        assert_eq!(bus.subscription_count(), 1);

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_releases_every_timer_and_subscription() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        engine.render(&[
            spec("a", TemplateKind::Text, true, 10),
            spec("b", TemplateKind::Gauge, true, 20),
        ]);
        settle().await;
        assert_eq!(bus.subscription_count(), 2);

        engine.destroy();

        assert_eq!(engine.active_pollers(), 0);
        assert_eq!(engine.active_subscriptions(), 0);
        assert_eq!(bus.subscription_count(), 0);
        assert!(engine.containers().lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_is_idempotent() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());

        // before any render: no effect
        engine.destroy();

        engine.render(&[spec("a", TemplateKind::Text, true, 30)]);
        settle().await;

        engine.destroy();
        engine.destroy(); // second call must be a no-op, not a panic

        assert_eq!(bus.subscription_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rerender_does_not_duplicate_resources() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        let specs = [
            spec("a", TemplateKind::Gauge, true, 30),
            spec("b", TemplateKind::Text, true, 15),
        ];

        engine.render(&specs);
        settle().await;
        engine.destroy();
        engine.render(&specs);
        settle().await;

        assert_eq!(engine.active_subscriptions(), 2);
        assert_eq!(engine.active_pollers(), 2);
        assert_eq!(bus.subscription_count(), 2);

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn rerender_without_explicit_destroy_tears_down_first() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        let specs = [spec("a", TemplateKind::Gauge, true, 30)];

        engine.render(&specs);
        settle().await;
        engine.render(&specs);
        settle().await;

        assert_eq!(bus.subscription_count(), 1);
        assert_eq!(engine.active_pollers(), 1);

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn empty_spec_list_shows_empty_state_placeholder() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        engine.render(&[]);
        settle().await;

        let containers = engine.containers();
        let containers = containers.lock().unwrap();
        assert_eq!(containers.len(), 1);
        let body = containers[0].snapshot().lines().join("\n");
        assert!(body.contains("no widgets enabled"));
        assert_eq!(bus.subscription_count(), 0);
        drop(containers);

        engine.destroy();
        assert!(engine.containers().lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_renders_once_without_refresh_wiring() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        engine.render(&[spec("a", TemplateKind::Text, true, 0)]);
        settle().await;

        assert_eq!(engine.active_subscriptions(), 0);
        assert_eq!(engine.active_pollers(), 0);
        assert_eq!(bus.subscription_count(), 0);

        let containers = engine.containers();
        let body = containers.lock().unwrap()[0].snapshot().lines().join("\n");
        assert!(body.contains("steady"));

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_recovers_on_next_poll_tick() {
        let source = ScriptedSource::new(vec![Err(anyhow!("connection refused"))]);
        let (mut engine, _bus) = engine_with(source);
        engine.render(&[spec("a", TemplateKind::Text, true, 5)]);
        settle().await;

        {
            let containers = engine.containers();
            let body = containers.lock().unwrap()[0].snapshot().lines().join("\n");
            assert!(body.contains("data load failed"), "got: {body}");
        }
        assert_eq!(engine.widget_states()[0].1, WidgetState::ErrorDisplayed);

        // next poll tick fetches successfully, no manual intervention
        tokio::time::sleep(Duration::from_secs(6)).await;

        {
            let containers = engine.containers();
            let body = containers.lock().unwrap()[0].snapshot().lines().join("\n");
            assert!(body.contains("steady"), "got: {body}");
        }
        assert_eq!(engine.widget_states()[0].1, WidgetState::Rendered);

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_template_does_not_disturb_other_widgets() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        engine.render(&[
            spec("bad", TemplateKind::Gauge, true, 30),
            spec("good", TemplateKind::Text, true, 30),
        ]);
        settle().await;

        // malformed push makes the gauge template fail for "bad" only
        bus.publish(&channel_for("bad"), json!({ "value": "garbage" }));
        bus.publish(&channel_for("good"), json!({ "headline": "fine" }));
        settle().await;

        let states: std::collections::HashMap<_, _> =
            engine.widget_states().into_iter().collect();
        assert_eq!(states["bad"], WidgetState::ErrorDisplayed);
        assert_eq!(states["good"], WidgetState::Rendered);

        // the failing widget keeps its refresh schedule
        assert_eq!(engine.active_pollers(), 2);
        assert_eq!(bus.subscription_count(), 2);

        // and a later good push recovers it
        bus.publish(&channel_for("bad"), json!({ "value": 0.5 }));
        let states: std::collections::HashMap<_, _> =
            engine.widget_states().into_iter().collect();
        assert_eq!(states["bad"], WidgetState::Rendered);

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn push_messages_render_through_the_dispatcher() {
        let (mut engine, bus) = engine_with(ScriptedSource::ok());
        engine.render(&[spec("a", TemplateKind::Text, true, 60)]);
        settle().await;

        bus.publish(&channel_for("a"), json!({ "headline": "pushed!" }));

        let containers = engine.containers();
        let body = containers.lock().unwrap()[0].snapshot().lines().join("\n");
        assert!(body.contains("pushed!"));

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_cannot_overwrite_a_newer_render() {
        let release = Arc::new(Notify::new());
        let source = SlowFirstSource::new(Arc::clone(&release));
        let (mut engine, bus) = engine_with(source);

        engine.render(&[spec("a", TemplateKind::Text, true, 5)]);
        settle().await; // initial fetch is now parked on the notify

        // push renders newer content while the initial fetch is in flight
        bus.publish(&channel_for("a"), json!({ "headline": "newest" }));

        // let the slow fetch finally resolve; its ticket is stale
        release.notify_one();
        settle().await;

        let containers = engine.containers();
        let body = containers.lock().unwrap()[0].snapshot().lines().join("\n");
        assert!(body.contains("newest"), "stale render overwrote: {body}");

        engine.destroy();
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_fetch_does_not_write_after_destroy() {
        let release = Arc::new(Notify::new());
        let source = SlowFirstSource::new(Arc::clone(&release));
        let (mut engine, _bus) = engine_with(source);

        engine.render(&[spec("a", TemplateKind::Text, true, 30)]);
        settle().await;

        let container = engine.containers().lock().unwrap()[0].clone();
        engine.destroy();

        release.notify_one();
        settle().await;

        // alive flag stopped the completion from touching the surface
        assert!(container.snapshot().lines().is_empty());
    }
}
