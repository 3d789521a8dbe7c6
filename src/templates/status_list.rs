// Status list template - named entries with status icons
//
// Snapshot fields:
//   items - array of { name, status } where status is one of
//           ok | warn | down (anything else shows as "?")

use crate::config::dashboard::WidgetSpec;
use crate::engine::container::Surface;
use anyhow::{bail, Result};
use serde_json::Value;

pub fn render(surface: &mut Surface, _spec: &WidgetSpec, data: &Value) -> Result<()> {
    let items = match data.get("items") {
        Some(Value::Array(items)) => items,
        Some(_) => bail!("status items is not an array"),
        None => {
            surface.replace(vec!["no entries".to_string()]);
            return Ok(());
        }
    };

    if items.is_empty() {
        surface.replace(vec!["no entries".to_string()]);
        return Ok(());
    }

    let lines = items
        .iter()
        .map(|item| {
            let name = item.get("name").and_then(Value::as_str).unwrap_or("?");
            let status = item.get("status").and_then(Value::as_str).unwrap_or("");
            format!("{} {}", status_icon(status), name)
        })
        .collect();

    surface.replace(lines);
    Ok(())
}

fn status_icon(status: &str) -> &'static str {
    match status {
        "ok" => "✔",
        "warn" => "!",
        "down" => "✖",
        _ => "?",
    }
}
