// Default placeholder template
//
// Renders any widget the registry has no specific template for. Shows the
// widget identity and a compact dump of whatever top-level fields the
// snapshot happens to carry, so an unconfigured widget is still readable.

use crate::config::dashboard::WidgetSpec;
use crate::engine::container::Surface;
use anyhow::Result;
use serde_json::Value;

/// Keep the dump short; panels are small
const MAX_FIELDS: usize = 6;

pub fn render(surface: &mut Surface, spec: &WidgetSpec, data: &Value) -> Result<()> {
    let mut lines = vec![format!("widget: {}", spec.id)];

    match data {
        Value::Object(map) if !map.is_empty() => {
            for (key, value) in map.iter().take(MAX_FIELDS) {
                lines.push(format!("{}: {}", key, compact(value)));
            }
            if map.len() > MAX_FIELDS {
                lines.push(format!("… {} more", map.len() - MAX_FIELDS));
            }
        }
        _ => lines.push("no data yet".to_string()),
    }

    surface.replace(lines);
    Ok(())
}

/// One-line rendering of a snapshot field
fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        other => other.to_string(),
    }
}
