//! TOML configuration for ferrywatch.
//!
//! A layered model with sensible defaults: an explicit path, the
//! `FERRYWATCH_CONFIG` environment variable, the standard system location,
//! and finally compiled-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::VocabularyEntry;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "FERRYWATCH_CONFIG";

/// Standard system location for the config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ferrywatch/ferrywatch.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for a ferrywatch process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded ferrywatch configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. `explicit`, when given.
    /// 2. The path in the `FERRYWATCH_CONFIG` environment variable.
    /// 3. `/etc/ferrywatch/ferrywatch.toml`.
    /// 4. Compiled-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "config file given but could not be loaded, trying fallback"
                    );
                }
            }
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "FERRYWATCH_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let system_path = Path::new(SYSTEM_CONFIG_PATH);
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Input and output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// YAML document with the top-level `Routes` list.
    pub routes_file: PathBuf,
    /// JSON run history, most recent run first.
    pub history_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            routes_file: PathBuf::from("ferry_routes.yaml"),
            history_file: PathBuf::from("output/ferrystatus.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Page retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound on the page-load phase of a single route (seconds).
    pub page_load_timeout_secs: u64,
    /// Pause after a successful load before extraction (milliseconds).
    pub settle_delay_ms: u64,
    /// User-Agent header sent with each request.
    pub user_agent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_load_timeout_secs: 10,
            settle_delay_ms: 500,
            user_agent: concat!("ferrywatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Route checking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Routes checked at once. `1` keeps the strictly sequential model.
    pub concurrency: usize,
    /// Overall deadline for one run (seconds). `0` disables it.
    pub run_deadline_secs: u64,
    /// Element name of the status indicator.
    pub selector_tag: String,
    /// CSS class carried by the status indicator.
    pub selector_class: String,
    /// Replacement vocabulary. Empty means the built-in table.
    pub vocabulary: Vec<VocabularyEntry>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            run_deadline_secs: 300,
            selector_tag: "span".to_string(),
            selector_class: "sailingStatus".to_string(),
            vocabulary: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Keep at most this many runs on disk. `0` keeps everything.
    pub max_runs: usize,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Watch-mode schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Six-field cron expression (seconds first).
    pub cron: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: "0 */15 * * * *".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit log lines as JSON instead of the human format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
