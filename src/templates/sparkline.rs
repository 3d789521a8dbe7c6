// Sparkline template - numeric series as unicode blocks
//
// Snapshot fields:
//   series - array of numbers, oldest first
//   unit   - optional suffix for the current-value line

use crate::config::dashboard::WidgetSpec;
use crate::engine::container::Surface;
use crate::templates::str_field;
use anyhow::{bail, Result};
use serde_json::Value;

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render(surface: &mut Surface, _spec: &WidgetSpec, data: &Value) -> Result<()> {
    let series: Vec<f64> = match data.get("series") {
        Some(Value::Array(values)) => {
            let parsed: Option<Vec<f64>> = values.iter().map(Value::as_f64).collect();
            match parsed {
                Some(series) => series,
                None => bail!("sparkline series contains non-numeric values"),
            }
        }
        Some(_) => bail!("sparkline series is not an array"),
        None => {
            surface.replace(vec!["no data yet".to_string()]);
            return Ok(());
        }
    };

    if series.is_empty() {
        surface.replace(vec!["no data yet".to_string()]);
        return Ok(());
    }

    let min = series.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);

    let spark: String = series
        .iter()
        .map(|v| {
            let idx = ((v - min) / span * (BLOCKS.len() - 1) as f64).round() as usize;
            BLOCKS[idx.min(BLOCKS.len() - 1)]
        })
        .collect();

    let unit = str_field(data, "unit").unwrap_or("");
    let current = series.last().copied().unwrap_or(0.0);

    surface.replace(vec![spark, format!("current: {:.1}{}", current, unit)]);
    Ok(())
}
