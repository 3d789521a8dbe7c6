// TUI application state
//
// Holds what the display loop needs between frames: the shared container
// list the engine renders into, accumulated engine statistics, the log
// buffer, and a couple of UI toggles.

use super::theme::Theme;
use crate::engine::container::SharedContainers;
use crate::events::{EngineEvent, EngineStats};
use crate::logging::LogBuffer;
use std::time::Instant;

/// Main application state for the TUI
pub struct App {
    /// Containers the engine keeps fresh; drawn every frame
    pub containers: SharedContainers,

    /// Accumulated statistics folded from engine events
    pub stats: EngineStats,

    /// Log buffer for the system logs panel
    pub log_buffer: LogBuffer,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Whether the logs panel is visible
    pub show_logs: bool,

    /// When the app started (for uptime display)
    pub start_time: Instant,

    /// Color styles
    pub theme: Theme,

    /// Most recent widget activity, shown in the status bar
    pub last_activity: Option<String>,
}

impl App {
    pub fn new(containers: SharedContainers, log_buffer: LogBuffer) -> Self {
        Self {
            containers,
            stats: EngineStats::default(),
            log_buffer,
            should_quit: false,
            show_logs: false,
            start_time: Instant::now(),
            theme: Theme::default(),
            last_activity: None,
        }
    }

    /// Fold an engine event into the stats and activity line
    pub fn apply_event(&mut self, event: EngineEvent) {
        self.stats.apply(&event);

        self.last_activity = match &event {
            EngineEvent::Rendered {
                widget_id, trigger, ..
            } => Some(format!("{widget_id} rendered ({})", trigger.as_str())),
            EngineEvent::RenderFailed { widget_id, .. } => {
                Some(format!("{widget_id} render failed"))
            }
            EngineEvent::FetchFailed { widget_id, .. } => {
                Some(format!("{widget_id} fetch failed"))
            }
            EngineEvent::Destroyed { .. } => Some("dashboard destroyed".to_string()),
            _ => self.last_activity.take(),
        };
    }

    /// Toggle the logs panel
    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
    }

    /// Get uptime as a formatted string
    pub fn uptime(&self) -> String {
        let seconds = self.start_time.elapsed().as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;

        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}
