// Gauge template - a single ratio as a textual bar
//
// Snapshot fields:
//   value  - ratio in [0, 1] (or "percent" in [0, 100])
//   label  - optional caption under the bar

use crate::config::dashboard::WidgetSpec;
use crate::engine::container::Surface;
use crate::templates::{f64_field, str_field};
use anyhow::{bail, Result};
use serde_json::Value;

const BAR_WIDTH: usize = 24;

pub fn render(surface: &mut Surface, _spec: &WidgetSpec, data: &Value) -> Result<()> {
    // Accept either a 0-1 ratio or a 0-100 percentage
    let ratio = match (f64_field(data, "value"), f64_field(data, "percent")) {
        (Some(v), _) => v,
        (None, Some(p)) => p / 100.0,
        (None, None) => {
            // Distinguish "field absent" (empty state) from "field garbage"
            if data.get("value").is_some() || data.get("percent").is_some() {
                bail!("gauge value is not a number");
            }
            surface.replace(vec!["no data yet".to_string()]);
            return Ok(());
        }
    };

    if !ratio.is_finite() {
        bail!("gauge value is not finite");
    }

    let clamped = ratio.clamp(0.0, 1.0);
    let filled = (clamped * BAR_WIDTH as f64).round() as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);

    let mut lines = vec![format!("{} {:>5.1}%", bar, clamped * 100.0)];
    if let Some(label) = str_field(data, "label") {
        lines.push(label.to_string());
    }

    surface.replace(lines);
    Ok(())
}
