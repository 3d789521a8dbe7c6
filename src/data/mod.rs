// Data source adapters - where widget snapshots come from
//
// The engine consumes data through one narrow contract: give me the latest
// snapshot for a widget id, asynchronously, possibly failing. Snapshots are
// free-form JSON; the engine never inspects them, templates do.

pub mod demo;
pub mod http;

use anyhow::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// A widget data snapshot. No schema is enforced by the engine; keys vary
/// per application domain (metrics, status, service lists).
pub type Snapshot = serde_json::Value;

/// External capability: fetch the latest snapshot for a widget.
///
/// `BoxFuture` keeps the trait object-safe so sources stay pluggable
/// behind `Arc<dyn DataSource>`. A rejected fetch never propagates past
/// the render dispatcher - it becomes that widget's error placeholder.
pub trait DataSource: Send + Sync {
    fn fetch<'a>(&'a self, widget_id: &'a str) -> BoxFuture<'a, Result<Snapshot>>;
}

/// Shared handle the engine clones into its refresh tasks
pub type SharedDataSource = Arc<dyn DataSource>;
