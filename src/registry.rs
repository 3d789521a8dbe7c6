// Template registry - process-wide mapping from template kind to renderer
//
// The registry is initialized once at startup (init_templates) and read-only
// afterwards, so dashboard render passes never mutate shared state. Template
// names form a small closed set: unknown names from config resolve to the
// default placeholder deliberately rather than failing at render time.

use crate::config::dashboard::WidgetSpec;
use crate::engine::container::Surface;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A rendering function: replaces the surface contents from a data snapshot.
///
/// Templates are pure - no I/O, no retained state. A returned error marks
/// the render as failed; the dispatcher substitutes the error placeholder.
/// Missing optional fields in the snapshot are NOT an error; templates
/// treat absence as an empty state.
pub type BoxedTemplate = Box<dyn Fn(&mut Surface, &WidgetSpec, &Value) -> Result<()> + Send + Sync>;

/// The closed set of known template identifiers.
///
/// Config files name templates as strings; [`TemplateKind::parse`] maps
/// anything unrecognized to `Default` so a typo degrades to the generic
/// placeholder instead of a blank panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateKind {
    /// Single ratio rendered as a bar with percentage
    Gauge,
    /// Named entries with status icons
    StatusList,
    /// Headline plus detail lines
    Text,
    /// Numeric series as a unicode sparkline
    Sparkline,
    /// Generic placeholder - always registered, never fails to resolve
    #[default]
    Default,
}

impl TemplateKind {
    /// Parse a config-supplied template name, falling back to `Default`
    pub fn parse(name: &str) -> Self {
        match name {
            "gauge" => Self::Gauge,
            "status-list" => Self::StatusList,
            "text" => Self::Text,
            "sparkline" => Self::Sparkline,
            "default" => Self::Default,
            other => {
                tracing::debug!(template = other, "unknown template name, using default");
                Self::Default
            }
        }
    }

    /// Canonical name as written in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::StatusList => "status-list",
            Self::Text => "text",
            Self::Sparkline => "sparkline",
            Self::Default => "default",
        }
    }
}

/// Registry of renderers keyed by template kind.
///
/// The default renderer is stored separately so resolution can never fail:
/// every widget is always visually representable, if only as a placeholder.
pub struct TemplateRegistry {
    default: BoxedTemplate,
    templates: HashMap<TemplateKind, BoxedTemplate>,
}

impl TemplateRegistry {
    /// Create a registry with the given default renderer and nothing else
    pub fn new(default: BoxedTemplate) -> Self {
        Self {
            default,
            templates: HashMap::new(),
        }
    }

    /// Store or overwrite the renderer for a kind (last write wins).
    ///
    /// Registering `TemplateKind::Default` replaces the fallback renderer.
    pub fn register(&mut self, kind: TemplateKind, template: BoxedTemplate) {
        if kind == TemplateKind::Default {
            self.default = template;
        } else {
            self.templates.insert(kind, template);
        }
    }

    /// Resolve a kind to its renderer, or the default renderer if absent.
    /// Never fails.
    pub fn resolve(&self, kind: TemplateKind) -> &BoxedTemplate {
        self.templates.get(&kind).unwrap_or(&self.default)
    }
}

static REGISTRY: OnceLock<TemplateRegistry> = OnceLock::new();

/// Install the built-in templates into the process-wide registry.
///
/// Called once during startup; later calls are no-ops. Reads through
/// [`global`] are lock-free after initialization.
pub fn init_templates() {
    let _ = REGISTRY.set(crate::templates::builtin_registry());
}

/// The process-wide registry, initializing with the built-ins on first use
pub fn global() -> &'static TemplateRegistry {
    REGISTRY.get_or_init(crate::templates::builtin_registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_template(marker: &'static str) -> BoxedTemplate {
        Box::new(move |surface, _spec, _data| {
            surface.replace(vec![marker.to_string()]);
            Ok(())
        })
    }

    fn spec() -> WidgetSpec {
        WidgetSpec::for_tests("w1", TemplateKind::Gauge, true, 30)
    }

    #[test]
    fn parse_maps_unknown_names_to_default() {
        assert_eq!(TemplateKind::parse("gauge"), TemplateKind::Gauge);
        assert_eq!(TemplateKind::parse("status-list"), TemplateKind::StatusList);
        assert_eq!(TemplateKind::parse("no-such-template"), TemplateKind::Default);
        assert_eq!(TemplateKind::parse(""), TemplateKind::Default);
    }

    #[test]
    fn resolve_falls_back_to_default_for_unregistered_kind() {
        let registry = TemplateRegistry::new(noop_template("default"));

        let mut surface = Surface::default();
        let template = registry.resolve(TemplateKind::Sparkline);
        template(&mut surface, &spec(), &Value::Null).unwrap();

        assert_eq!(surface.lines(), &["default".to_string()]);
    }

    #[test]
    fn register_is_last_write_wins() {
        let mut registry = TemplateRegistry::new(noop_template("default"));
        registry.register(TemplateKind::Gauge, noop_template("first"));
        registry.register(TemplateKind::Gauge, noop_template("second"));

        let mut surface = Surface::default();
        registry.resolve(TemplateKind::Gauge)(&mut surface, &spec(), &Value::Null).unwrap();

        assert_eq!(surface.lines(), &["second".to_string()]);
    }

    #[test]
    fn registering_default_replaces_the_fallback() {
        let mut registry = TemplateRegistry::new(noop_template("old"));
        registry.register(TemplateKind::Default, noop_template("new"));

        let mut surface = Surface::default();
        registry.resolve(TemplateKind::Text)(&mut surface, &spec(), &Value::Null).unwrap();

        assert_eq!(surface.lines(), &["new".to_string()]);
    }
}
