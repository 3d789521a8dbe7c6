//! Dashboard definition - the widget specs supplied to the engine
//!
//! Widgets are declared as `[[widgets]]` tables in the config file. The
//! deserialization layer (`FileWidget`) accepts template names as strings;
//! the runtime `WidgetSpec` carries the parsed `TemplateKind` so unknown
//! names are resolved (to the default placeholder) exactly once, at load.

use crate::registry::TemplateKind;
use serde::Deserialize;

/// Reference to the application a widget belongs to
#[derive(Debug, Clone, Deserialize)]
pub struct AppRef {
    /// Display name shown in the panel title
    pub name: String,

    /// Short icon prepended to the title
    #[serde(default)]
    pub icon: String,

    /// Grouping category (informational, shown in the status bar)
    #[serde(default)]
    pub category: String,
}

impl Default for AppRef {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            icon: String::new(),
            category: String::new(),
        }
    }
}

/// Per-widget refresh and rendering configuration
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Disabled widgets get no container, subscription, or timer
    pub enabled: bool,

    /// Which renderer draws this widget's snapshots
    pub template: TemplateKind,

    /// Poll fallback period; 0 disables both refresh paths (render once)
    pub refresh_interval_secs: u64,
}

/// Caller-supplied widget descriptor.
///
/// Immutable once a render pass begins: changing a spec means destroying
/// the dashboard and re-rendering, never mutating in place.
#[derive(Debug, Clone)]
pub struct WidgetSpec {
    /// Unique within a dashboard
    pub id: String,

    /// Owning application
    pub app: AppRef,

    /// Refresh and rendering settings
    pub config: WidgetConfig,
}

impl WidgetSpec {
    /// Panel title: "icon name / id" (icon omitted when empty)
    pub fn title(&self) -> String {
        if self.app.icon.is_empty() {
            format!(" {} / {} ", self.app.name, self.id)
        } else {
            format!(" {} {} / {} ", self.app.icon, self.app.name, self.id)
        }
    }

    /// Shorthand constructor for unit tests
    #[cfg(test)]
    pub fn for_tests(id: &str, template: TemplateKind, enabled: bool, interval: u64) -> Self {
        Self {
            id: id.to_string(),
            app: AppRef::default(),
            config: WidgetConfig {
                enabled,
                template,
                refresh_interval_secs: interval,
            },
        }
    }
}

/// `[[widgets]]` table as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct FileWidget {
    pub id: String,

    #[serde(default)]
    pub app: AppRef,

    /// Widgets default to enabled; listing one and disabling it keeps the
    /// entry around for easy toggling
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Template name; unknown names fall back to the default placeholder
    #[serde(default)]
    pub template: Option<String>,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    30
}

impl FileWidget {
    /// Build the runtime spec, parsing the template name
    pub fn into_spec(self) -> WidgetSpec {
        let template = self
            .template
            .as_deref()
            .map(TemplateKind::parse)
            .unwrap_or_default();

        WidgetSpec {
            id: self.id,
            app: self.app,
            config: WidgetConfig {
                enabled: self.enabled,
                template,
                refresh_interval_secs: self.refresh_interval_secs,
            },
        }
    }
}
