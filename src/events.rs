// Events that flow from the engine's refresh tasks to the host shell
//
// Every render pass, refresh tick, and failure emits one of these over an
// mpsc channel. The TUI consumes them for its stats line and the log panel;
// using an enum keeps the task boundary type-safe and pattern-matchable.

use chrono::{DateTime, Utc};

/// What caused a refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First render after the widget was created
    Initial,
    /// Poll fallback timer fired
    Poll,
    /// Push message arrived on the widget's channel
    Push,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Poll => "poll",
            Self::Push => "push",
        }
    }
}

/// Main event type emitted by the engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A widget rendered successfully
    Rendered {
        widget_id: String,
        timestamp: DateTime<Utc>,
        trigger: RefreshTrigger,
    },

    /// A template failed while rendering; the error placeholder is shown
    RenderFailed {
        widget_id: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },

    /// The data source rejected a fetch; the load-failed placeholder is shown
    FetchFailed {
        widget_id: String,
        timestamp: DateTime<Utc>,
        reason: String,
    },

    /// A push message arrived on the widget's channel
    PushReceived {
        widget_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The poll fallback timer fired
    PollTick {
        widget_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The whole dashboard was torn down
    Destroyed { timestamp: DateTime<Utc> },
}

/// Summary statistics for the status bar
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub renders: usize,
    pub render_failures: usize,
    pub fetch_failures: usize,
    pub pushes: usize,
    pub poll_ticks: usize,
}

impl EngineStats {
    /// Fold one event into the counters
    pub fn apply(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Rendered { .. } => self.renders += 1,
            EngineEvent::RenderFailed { .. } => self.render_failures += 1,
            EngineEvent::FetchFailed { .. } => self.fetch_failures += 1,
            EngineEvent::PushReceived { .. } => self.pushes += 1,
            EngineEvent::PollTick { .. } => self.poll_ticks += 1,
            EngineEvent::Destroyed { .. } => {}
        }
    }

    /// Render passes attempted, successful or not
    pub fn refresh_attempts(&self) -> usize {
        self.renders + self.render_failures + self.fetch_failures
    }

    pub fn success_rate(&self) -> f64 {
        let attempts = self.refresh_attempts();
        if attempts == 0 {
            0.0
        } else {
            (self.renders as f64 / attempts as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(id: &str) -> EngineEvent {
        EngineEvent::Rendered {
            widget_id: id.to_string(),
            timestamp: Utc::now(),
            trigger: RefreshTrigger::Poll,
        }
    }

    #[test]
    fn stats_accumulate_per_event_kind() {
        let mut stats = EngineStats::default();
        stats.apply(&rendered("a"));
        stats.apply(&rendered("b"));
        stats.apply(&EngineEvent::FetchFailed {
            widget_id: "a".to_string(),
            timestamp: Utc::now(),
            reason: "boom".to_string(),
        });

        assert_eq!(stats.renders, 2);
        assert_eq!(stats.fetch_failures, 1);
        assert_eq!(stats.refresh_attempts(), 3);
        assert!((stats.success_rate() - 66.6).abs() < 1.0);
    }

    #[test]
    fn success_rate_is_zero_without_attempts() {
        assert_eq!(EngineStats::default().success_rate(), 0.0);
    }
}
