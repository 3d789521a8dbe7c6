// Text template - headline plus detail lines
//
// Snapshot fields:
//   headline - main line
//   detail   - string or array of strings

use crate::config::dashboard::WidgetSpec;
use crate::engine::container::Surface;
use crate::templates::str_field;
use anyhow::Result;
use serde_json::Value;

pub fn render(surface: &mut Surface, _spec: &WidgetSpec, data: &Value) -> Result<()> {
    let mut lines = Vec::new();

    if let Some(headline) = str_field(data, "headline") {
        lines.push(headline.to_string());
    }

    match data.get("detail") {
        Some(Value::String(s)) => lines.push(s.clone()),
        Some(Value::Array(items)) => {
            lines.extend(items.iter().filter_map(Value::as_str).map(String::from));
        }
        _ => {}
    }

    if lines.is_empty() {
        lines.push("no data yet".to_string());
    }

    surface.replace(lines);
    Ok(())
}
