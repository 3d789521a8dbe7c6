// Demo mode: feed the push bus so the realtime path visibly works
//
// The demo data source already answers every poll; this task exercises the
// OTHER refresh path by publishing snapshots onto widget channels between
// poll ticks. Watching the status bar's push counter climb is the point.
//
// Run with: GLANCE_DEMO=1 cargo run --release

use crate::data::demo::DemoDataSource;
use crate::transport::{bus::PushBus, channel_for};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;

/// Push one widget's snapshot every few seconds, round-robin
const PUSH_PERIOD: Duration = Duration::from_secs(3);

pub async fn run_demo_feed(
    bus: PushBus,
    widget_ids: Vec<String>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    if widget_ids.is_empty() {
        return;
    }

    // Initial delay to let the TUI render the first fetched snapshots
    sleep(Duration::from_millis(1500)).await;

    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                tracing::info!("demo feed received shutdown signal");
                return;
            }
            _ = sleep(PUSH_PERIOD) => {
                let id = &widget_ids[(tick as usize) % widget_ids.len()];
                let snapshot = DemoDataSource::snapshot_for(id, tick);
                tracing::debug!(widget = %id, "demo push");
                bus.publish(&channel_for(id), snapshot);
                tick += 1;
            }
        }
    }
}
