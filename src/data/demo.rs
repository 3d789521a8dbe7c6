// Demo data source - generated snapshots so the dashboard runs out of the box
//
// Produces deterministic pseudo-random metrics derived from the widget id
// and a per-source tick counter. Every built-in template finds the fields
// it needs in the same snapshot (value, items, series, headline), so any
// widget/template pairing in the default config renders something sensible.
//
// Run with: GLANCE_DEMO=1 cargo run --release

use super::{DataSource, Snapshot};
use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::json;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct DemoDataSource {
    /// Advances on every fetch so repeated polls show movement
    tick: AtomicU64,
}

impl DemoDataSource {
    pub fn new() -> Self {
        Self {
            tick: AtomicU64::new(0),
        }
    }

    /// Build the snapshot for a widget at a given tick (also used by the
    /// demo push publisher so both refresh paths agree on shape)
    pub fn snapshot_for(widget_id: &str, tick: u64) -> Snapshot {
        let base = mix(widget_id, tick);

        // Smooth-ish ratio in [0, 1] that drifts over time
        let value = ((base % 1000) as f64 / 1000.0 + (tick as f64 * 0.07).sin().abs()) % 1.0;

        let series: Vec<f64> = (0..16)
            .map(|i| (mix(widget_id, tick.wrapping_add(i)) % 100) as f64)
            .collect();

        let statuses = ["ok", "ok", "ok", "warn", "down"];
        let items: Vec<_> = ["web", "api", "worker", "cache"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let status = statuses[(mix(name, tick / 4) as usize + i) % statuses.len()];
                json!({ "name": name, "status": status })
            })
            .collect();

        json!({
            "value": value,
            "label": format!("{} load", widget_id),
            "series": series,
            "unit": "ms",
            "items": items,
            "headline": format!("{} is nominal", widget_id),
            "detail": format!("tick {}", tick),
        })
    }
}

impl Default for DemoDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for DemoDataSource {
    fn fetch<'a>(&'a self, widget_id: &'a str) -> BoxFuture<'a, Result<Snapshot>> {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        Box::pin(async move { Ok(Self::snapshot_for(widget_id, tick)) })
    }
}

/// Deterministic hash of id + tick; no RNG dependency needed for fake data
fn mix(widget_id: &str, tick: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    widget_id.hash(&mut hasher);
    tick.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshots_carry_fields_for_every_builtin_template() {
        let source = DemoDataSource::new();
        let snapshot = source.fetch("w1").await.unwrap();

        assert!(snapshot.get("value").is_some());
        assert!(snapshot.get("series").is_some());
        assert!(snapshot.get("items").is_some());
        assert!(snapshot.get("headline").is_some());
    }

    #[test]
    fn snapshots_are_deterministic_per_id_and_tick() {
        assert_eq!(
            DemoDataSource::snapshot_for("a", 3),
            DemoDataSource::snapshot_for("a", 3)
        );
        assert_ne!(
            DemoDataSource::snapshot_for("a", 3),
            DemoDataSource::snapshot_for("b", 3)
        );
    }
}
