//! Configuration for the dashboard
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/glance/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! The widget list itself lives in the config file as `[[widgets]]` tables;
//! env vars only override runtime toggles (TUI, demo mode, log level,
//! source URL).

pub mod dashboard;


use dashboard::{FileWidget, WidgetSpec};
use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Where widget snapshots come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Generated metrics; the out-of-the-box experience
    Demo,
    /// Remote status endpoint (GET {base_url}/widgets/{id})
    Http,
}

impl SourceKind {
    fn parse(name: &str) -> Self {
        match name {
            "http" => Self::Http,
            "demo" => Self::Demo,
            other => {
                eprintln!("Warning: unknown source kind {other:?}, using demo");
                Self::Demo
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Http => "http",
        }
    }
}

/// Data source configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Demo,
            base_url: "http://127.0.0.1:9090".to_string(),
        }
    }
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    fn parse(name: &str) -> Self {
        match name {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default tracing filter level (overridden by RUST_LOG)
    pub level: String,

    /// Also write logs to rotating files
    pub file_enabled: bool,

    pub file_dir: PathBuf,

    pub file_rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to run the TUI (disable for headless mode)
    pub enable_tui: bool,

    /// Demo mode: generated snapshots plus a push feed showcasing the engine
    pub demo_mode: bool,

    /// Data source settings
    pub source: SourceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Widget specs for the dashboard
    pub widgets: Vec<WidgetSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_tui: true,
            demo_mode: false,
            source: SourceConfig::default(),
            logging: LoggingConfig::default(),
            widgets: default_widgets(),
        }
    }
}

/// The starter dashboard written into a fresh config file. One widget per
/// built-in template so `GLANCE_DEMO=1 glance` shows everything.
fn default_widgets() -> Vec<WidgetSpec> {
    let raw = [
        ("api-latency", "API Gateway", "🌐", "infra", "sparkline", 10),
        ("error-rate", "API Gateway", "🌐", "infra", "gauge", 15),
        ("services", "Fleet", "🛰", "infra", "status-list", 30),
        ("announcements", "Ops", "📣", "people", "text", 60),
    ];

    raw.iter()
        .map(|(id, app, icon, category, template, interval)| FileWidget {
            id: id.to_string(),
            app: dashboard::AppRef {
                name: app.to_string(),
                icon: icon.to_string(),
                category: category.to_string(),
            },
            enabled: true,
            template: Some(template.to_string()),
            refresh_interval_secs: *interval,
        })
        .map(FileWidget::into_spec)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [source] section
    pub source: Option<FileSource>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// [[widgets]] tables; an absent list means the starter dashboard
    pub widgets: Option<Vec<FileWidget>>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileSource {
    pub kind: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
}

/// Env var overrides, captured in one place so the merge logic is testable
/// without touching process environment
#[derive(Debug, Default)]
pub(crate) struct EnvOverrides {
    pub no_tui: bool,
    pub demo: bool,
    pub log_level: Option<String>,
    pub source_url: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        let flag = |name: &str| {
            std::env::var(name)
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false)
        };

        Self {
            no_tui: flag("GLANCE_NO_TUI"),
            demo: flag("GLANCE_DEMO"),
            log_level: std::env::var("GLANCE_LOG_LEVEL").ok(),
            source_url: std::env::var("GLANCE_SOURCE_URL").ok(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/glance/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("glance").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        // Create parent directory
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Use Config::default().to_toml() as single source of truth
        let template = Self::default().to_toml();

        // Write config (ignore errors - config is optional)
        let _ = std::fs::write(&path, template);
    }

    /// Load file config if it exists.
    ///
    /// A config file that exists but cannot be parsed fails fast with a
    /// clear error instead of silently falling back to defaults while the
    /// user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\nCONFIG ERROR - Failed to parse configuration file\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  To reset, delete the file and restart glance.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\nCONFIG ERROR - Cannot read configuration file\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        Self::from_parts(Self::load_file_config(), EnvOverrides::capture())
    }

    /// Merge the three layers. Split out of `from_env` so tests can drive
    /// it without mutating the process environment.
    pub(crate) fn from_parts(file: FileConfig, env: EnvOverrides) -> Self {
        let defaults_source = SourceConfig::default();
        let file_source = file.source.unwrap_or_default();

        // GLANCE_SOURCE_URL implies the http source
        let kind = if env.source_url.is_some() {
            SourceKind::Http
        } else {
            file_source
                .kind
                .as_deref()
                .map(SourceKind::parse)
                .unwrap_or(defaults_source.kind)
        };
        let base_url = env
            .source_url
            .or(file_source.base_url)
            .unwrap_or(defaults_source.base_url);

        let defaults_logging = LoggingConfig::default();
        let file_logging = file.logging.unwrap_or_default();
        let logging = LoggingConfig {
            level: env
                .log_level
                .or(file_logging.level)
                .unwrap_or(defaults_logging.level),
            file_enabled: file_logging
                .file_enabled
                .unwrap_or(defaults_logging.file_enabled),
            file_dir: file_logging
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(defaults_logging.file_dir),
            file_rotation: file_logging
                .file_rotation
                .as_deref()
                .map(LogRotation::parse)
                .unwrap_or(defaults_logging.file_rotation),
        };

        let widgets = match file.widgets {
            Some(widgets) => widgets.into_iter().map(FileWidget::into_spec).collect(),
            None => default_widgets(),
        };

        Self {
            enable_tui: !env.no_tui,
            demo_mode: env.demo,
            source: SourceConfig { kind, base_url },
            logging,
            widgets,
        }
    }

    /// Render the config as a commented TOML template.
    ///
    /// Used both for `config --show` and as the file written on first run,
    /// so the template always round-trips through the parser.
    pub fn to_toml(&self) -> String {
        let mut out = String::new();

        out.push_str("# glance configuration\n");
        out.push_str("# Env overrides: GLANCE_NO_TUI, GLANCE_DEMO, GLANCE_LOG_LEVEL, GLANCE_SOURCE_URL\n\n");

        out.push_str("[source]\n");
        out.push_str("# \"demo\" for generated data, \"http\" for a remote status endpoint\n");
        out.push_str(&format!("kind = \"{}\"\n", self.source.kind.as_str()));
        out.push_str(&format!("base_url = \"{}\"\n\n", self.source.base_url));

        out.push_str("[logging]\n");
        out.push_str(&format!("level = \"{}\"\n", self.logging.level));
        out.push_str(&format!("file_enabled = {}\n", self.logging.file_enabled));
        out.push_str(&format!(
            "file_dir = \"{}\"\n",
            self.logging.file_dir.display()
        ));
        out.push_str("# \"hourly\", \"daily\", or \"never\"\n");
        out.push_str(&format!(
            "file_rotation = \"{}\"\n",
            match self.logging.file_rotation {
                LogRotation::Hourly => "hourly",
                LogRotation::Daily => "daily",
                LogRotation::Never => "never",
            }
        ));

        for widget in &self.widgets {
            out.push_str("\n[[widgets]]\n");
            out.push_str(&format!("id = \"{}\"\n", widget.id));
            out.push_str(&format!("enabled = {}\n", widget.config.enabled));
            out.push_str(&format!(
                "template = \"{}\"\n",
                widget.config.template.as_str()
            ));
            out.push_str(&format!(
                "refresh_interval_secs = {}\n",
                widget.config.refresh_interval_secs
            ));
            out.push_str("[widgets.app]\n");
            out.push_str(&format!("name = \"{}\"\n", widget.app.name));
            out.push_str(&format!("icon = \"{}\"\n", widget.app.icon));
            out.push_str(&format!("category = \"{}\"\n", widget.app.category));
        }

        out
    }
}
