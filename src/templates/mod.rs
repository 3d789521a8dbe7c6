// Built-in templates
//
// Each template is a pure function from (surface, spec, snapshot) to new
// surface contents. Snapshots are free-form JSON with no enforced schema,
// so every template does defensive field access: a missing field is an
// empty state, never an error. A present-but-malformed field IS an error -
// that is the render-failure path the dispatcher isolates.

mod gauge;
mod placeholder;
mod sparkline;
mod status_list;
mod text;

use crate::registry::{BoxedTemplate, TemplateKind, TemplateRegistry};
use serde_json::Value;

/// Build a registry containing all built-in templates.
///
/// The placeholder template doubles as the guaranteed default entry.
pub fn builtin_registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new(boxed(placeholder::render));
    registry.register(TemplateKind::Gauge, boxed(gauge::render));
    registry.register(TemplateKind::StatusList, boxed(status_list::render));
    registry.register(TemplateKind::Text, boxed(text::render));
    registry.register(TemplateKind::Sparkline, boxed(sparkline::render));
    registry
}

fn boxed(
    f: fn(
        &mut crate::engine::container::Surface,
        &crate::config::dashboard::WidgetSpec,
        &Value,
    ) -> anyhow::Result<()>,
) -> BoxedTemplate {
    Box::new(f)
}

/// Read an optional string field from the snapshot root
fn str_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

/// Read an optional numeric field from the snapshot root
fn f64_field(data: &Value, key: &str) -> Option<f64> {
    data.get(key).and_then(Value::as_f64)
}
