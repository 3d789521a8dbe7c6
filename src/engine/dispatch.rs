// Render dispatcher - template invocation inside a failure boundary
//
// Resolves the widget's template against the process-wide registry and
// invokes it. A failing template or a rejected fetch degrades that one
// widget to a placeholder surface; nothing here can abort another widget's
// render or cancel this widget's own refresh schedule.

use crate::config::dashboard::WidgetSpec;
use crate::data::Snapshot;
use crate::engine::container::ContainerHandle;
use crate::registry;
use anyhow::Result;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a single widget.
///
/// `Rendered` and `ErrorDisplayed` are the steady states, re-entered on
/// every successful/failing refresh. `Destroyed` is terminal and reachable
/// only through engine teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WidgetState {
    Uninitialized = 0,
    Loading = 1,
    Rendered = 2,
    ErrorDisplayed = 3,
    Destroyed = 4,
}

impl WidgetState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Loading,
            2 => Self::Rendered,
            3 => Self::ErrorDisplayed,
            4 => Self::Destroyed,
            _ => Self::Uninitialized,
        }
    }
}

/// Atomic cell holding a widget's state, shared between the lifecycle
/// manager and the refresh tasks
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(WidgetState::Uninitialized as u8))
    }

    pub fn current(&self) -> WidgetState {
        WidgetState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next` unless already destroyed. Destroyed is terminal -
    /// a late refresh completion cannot resurrect a torn-down widget.
    pub fn transition(&self, next: WidgetState) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                if WidgetState::from_u8(raw) == WidgetState::Destroyed {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// What a dispatch pass did, for event reporting by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Rendered,
    RenderFailed(String),
    FetchFailed(String),
}

/// Render the outcome of a fetch into the widget's container.
///
/// Ok(snapshot) runs the resolved template; a template error swaps in the
/// generic error placeholder. Err(fetch error) swaps in the load-failed
/// placeholder. Either failure leaves the refresh schedule untouched - the
/// next tick or push simply tries again.
pub fn dispatch(
    container: &ContainerHandle,
    spec: &WidgetSpec,
    outcome: Result<Snapshot>,
    state: &StateCell,
) -> DispatchOutcome {
    match outcome {
        Ok(snapshot) => {
            let template = registry::global().resolve(spec.config.template);
            let rendered = container.with_surface(|surface| template(surface, spec, &snapshot));
            match rendered {
                Ok(()) => {
                    state.transition(WidgetState::Rendered);
                    DispatchOutcome::Rendered
                }
                Err(err) => {
                    let reason = err.to_string();
                    show_render_error(container, &reason);
                    state.transition(WidgetState::ErrorDisplayed);
                    DispatchOutcome::RenderFailed(reason)
                }
            }
        }
        Err(err) => {
            let reason = err.to_string();
            show_fetch_error(container, &reason);
            state.transition(WidgetState::ErrorDisplayed);
            DispatchOutcome::FetchFailed(reason)
        }
    }
}

/// Initial surface contents before the first snapshot lands
pub fn show_loading(container: &ContainerHandle) {
    container.with_surface(|surface| surface.replace(vec!["⏳ loading…".to_string()]));
}

/// Generic error placeholder: small icon, short reason, nothing else
fn show_render_error(container: &ContainerHandle, reason: &str) {
    container.with_surface(|surface| {
        surface.replace(vec!["✖ render failed".to_string(), reason.to_string()]);
    });
}

/// Fetch-failure placeholder; retried on the next tick/message
fn show_fetch_error(container: &ContainerHandle, reason: &str) {
    container.with_surface(|surface| {
        surface.replace(vec!["⚠ data load failed".to_string(), reason.to_string()]);
    });
}

/// Shown instead of a blank screen when no widgets are enabled
pub fn show_empty_state(container: &ContainerHandle) {
    container.with_surface(|surface| {
        surface.replace(vec![
            "no widgets enabled".to_string(),
            "add [[widgets]] entries to the config file".to_string(),
        ]);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TemplateKind;
    use anyhow::anyhow;
    use serde_json::json;

    fn fixture(template: TemplateKind) -> (ContainerHandle, WidgetSpec, StateCell) {
        let spec = WidgetSpec::for_tests("w", template, true, 30);
        let container = ContainerHandle::new("w", spec.title(), "");
        (container, spec, StateCell::new())
    }

    #[test]
    fn successful_dispatch_enters_rendered() {
        let (container, spec, state) = fixture(TemplateKind::Gauge);
        let outcome = dispatch(&container, &spec, Ok(json!({ "value": 0.25 })), &state);

        assert_eq!(outcome, DispatchOutcome::Rendered);
        assert_eq!(state.current(), WidgetState::Rendered);
    }

    #[test]
    fn template_error_shows_placeholder_with_reason() {
        let (container, spec, state) = fixture(TemplateKind::Gauge);
        // present-but-malformed value makes the gauge template fail
        let outcome = dispatch(&container, &spec, Ok(json!({ "value": "garbage" })), &state);

        assert!(matches!(outcome, DispatchOutcome::RenderFailed(_)));
        assert_eq!(state.current(), WidgetState::ErrorDisplayed);
        let body = container.snapshot().lines().join("\n");
        assert!(body.contains("render failed"));
        assert!(body.contains("not a number"));
    }

    #[test]
    fn fetch_error_shows_load_failed_placeholder() {
        let (container, spec, state) = fixture(TemplateKind::Text);
        let outcome = dispatch(&container, &spec, Err(anyhow!("connection refused")), &state);

        assert!(matches!(outcome, DispatchOutcome::FetchFailed(_)));
        let body = container.snapshot().lines().join("\n");
        assert!(body.contains("data load failed"));
        assert!(body.contains("connection refused"));
    }

    #[test]
    fn error_state_recovers_on_next_successful_refresh() {
        let (container, spec, state) = fixture(TemplateKind::Text);
        dispatch(&container, &spec, Err(anyhow!("boom")), &state);
        assert_eq!(state.current(), WidgetState::ErrorDisplayed);

        dispatch(&container, &spec, Ok(json!({ "headline": "back" })), &state);
        assert_eq!(state.current(), WidgetState::Rendered);
        assert!(container.snapshot().lines()[0].contains("back"));
    }

    #[test]
    fn destroyed_is_terminal() {
        let state = StateCell::new();
        state.transition(WidgetState::Rendered);
        state.transition(WidgetState::Destroyed);
        state.transition(WidgetState::Rendered);

        assert_eq!(state.current(), WidgetState::Destroyed);
    }
}
