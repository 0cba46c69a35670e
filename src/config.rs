//! Report generator settings.
//!
//! Settings are optional: every section falls back to defaults, so the tool
//! runs without a settings file. When one is given it is TOML:
//!
//! ```toml
//! [paths]
//! results_dir = "results"
//! reports_dir = "reports"
//!
//! [servers.primary]
//! id = "xampp"
//! label = "XAMPP"
//! color = "#f2b264"
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

use crate::texts::Lang;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub servers: ServerPair,
    #[serde(default)]
    pub report: ReportOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        let settings: Settings =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.primary.id == self.servers.baseline.id {
            return Err(ConfigError::Invalid(format!(
                "primary and baseline servers must differ (both are '{}')",
                self.servers.primary.id
            )));
        }
        if self.servers.primary.id.is_empty() || self.servers.baseline.id.is_empty() {
            return Err(ConfigError::Invalid("server id must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    /// Directory holding one subdirectory per benchmark run.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Directory the HTML report is written into.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// One benchmarked server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Server {
    /// Value of the `server` column in the results file.
    pub id: String,
    /// Name shown in the report.
    pub label: String,
    /// Chart color.
    pub color: String,
}

/// The two configurations being compared. Deltas are always expressed
/// relative to the baseline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerPair {
    #[serde(default = "default_primary")]
    pub primary: Server,
    #[serde(default = "default_baseline")]
    pub baseline: Server,
}

impl Default for ServerPair {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            baseline: default_baseline(),
        }
    }
}

impl ServerPair {
    /// Servers in enumeration order: primary first, then baseline.
    pub fn iter(&self) -> impl Iterator<Item = &Server> {
        [&self.primary, &self.baseline].into_iter()
    }

    pub fn get(&self, id: &str) -> Option<&Server> {
        self.iter().find(|s| s.id == id)
    }
}

fn default_primary() -> Server {
    Server {
        id: "xampp".to_string(),
        label: "XAMPP".to_string(),
        color: "#f2b264".to_string(),
    }
}

fn default_baseline() -> Server {
    Server {
        id: "nginx_multi".to_string(),
        label: "NGINX (Multi-core)".to_string(),
        color: "#64b5f6".to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportOptions {
    /// Language shown when the report is first opened.
    #[serde(default)]
    pub default_lang: Lang,
    /// Color theme shown when the report is first opened.
    #[serde(default)]
    pub default_theme: Theme,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG` when set.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps in log lines.
    #[serde(default = "LoggingConfig::default_timestamps")]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
            timestamps: Self::default_timestamps(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    fn default_timestamps() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}
