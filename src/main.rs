// glance - live terminal dashboard
//
// Renders a set of widgets, each bound to an application and a template,
// and keeps every panel fresh over two independent paths: push messages
// from a realtime transport and a polling fallback timer.
//
// Architecture:
// - Engine: widget lifecycle (containers, refresh wiring, teardown)
// - Registry: template name -> renderer, with a guaranteed default
// - Data sources: demo generator or remote HTTP status endpoint
// - Transport: in-process push bus (demo feed publishes onto it)
// - TUI (ratatui): draws the container surfaces and engine stats
// - Event system: mpsc channel connects engine tasks to the TUI

mod cli;
mod config;
mod data;
mod demo;
mod engine;
mod events;
mod logging;
mod registry;
mod templates;
mod transport;
mod tui;

use anyhow::{Context, Result};
use config::{Config, LogRotation, SourceKind};
use data::{demo::DemoDataSource, http::HttpDataSource, SharedDataSource};
use engine::DashboardEngine;
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transport::{bus::PushBus, SharedTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --edit, --path).
    // If a command was handled, exit early.
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env();

    // Log capture for the TUI panel; the guard keeps file logging flushing
    // until exit
    let log_buffer = LogBuffer::new();
    let _file_guard = init_logging(&config, log_buffer.clone());

    // Install the built-in templates once; the registry is read-only after
    registry::init_templates();

    // Demo mode forces the generated source so the dashboard always has data
    let source: SharedDataSource = if config.demo_mode || config.source.kind == SourceKind::Demo {
        Arc::new(DemoDataSource::new())
    } else {
        Arc::new(HttpDataSource::new(config.source.base_url.clone()))
    };

    let bus = PushBus::new();
    let transport: SharedTransport = Arc::new(bus.clone());

    let (events_tx, events_rx) = mpsc::channel(256);
    let mut dashboard = DashboardEngine::new(source, transport, events_tx);
    dashboard.render(&config.widgets);

    // Demo feed exercises the push path alongside the poll fallback
    let (demo_shutdown_tx, demo_shutdown_rx) = oneshot::channel();
    let demo_handle = if config.demo_mode {
        let ids: Vec<String> = config
            .widgets
            .iter()
            .filter(|w| w.config.enabled)
            .map(|w| w.id.clone())
            .collect();
        tracing::info!(widgets = ids.len(), "demo feed started");
        Some(tokio::spawn(demo::run_demo_feed(
            bus.clone(),
            ids,
            demo_shutdown_rx,
        )))
    } else {
        None
    };

    if config.enable_tui {
        tui::run_tui(dashboard.containers(), events_rx, log_buffer).await?;
    } else {
        // Headless: engine events are already logged via tracing; just keep
        // the channel drained and wait for Ctrl-C
        tokio::spawn(async move {
            let mut events_rx = events_rx;
            while events_rx.recv().await.is_some() {}
        });
        tracing::info!("running headless, Ctrl-C to stop");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
    }

    // Deterministic teardown: stop the demo feed, then release every
    // widget's timer and subscription
    let _ = demo_shutdown_tx.send(());
    if let Some(handle) = demo_handle {
        let _ = handle.await;
    }
    dashboard.destroy();

    Ok(())
}

/// Initialize tracing with conditional output.
///
/// In TUI mode logs go to the in-memory buffer (anything printed to stdout
/// would garble the alternate screen); in headless mode they go to stdout.
/// File logging is optionally layered on top of either.
///
/// Precedence: RUST_LOG env var > config file > default "info".
fn init_logging(
    config: &Config,
    log_buffer: LogBuffer,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("glance={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // Optional rotating file layer
    let (file_layer, guard) = if config.logging.file_enabled {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Ok(()) => {
                let appender = match config.logging.file_rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(&config.logging.file_dir, "glance.log")
                    }
                    LogRotation::Daily => {
                        tracing_appender::rolling::daily(&config.logging.file_dir, "glance.log")
                    }
                    LogRotation::Never => {
                        tracing_appender::rolling::never(&config.logging.file_dir, "glance.log")
                    }
                };
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let base = tracing_subscriber::registry().with(filter).with(file_layer);
    if config.enable_tui {
        base.with(TuiLogLayer::new(log_buffer)).init();
    } else {
        base.with(tracing_subscriber::fmt::layer()).init();
    }

    guard
}
