//! Parameters of a benchmark run.
//!
//! The benchmark driver may leave a `config.json` next to `results.csv`
//! describing how the run was configured. It is informational only: any
//! problem reading it falls back to the driver's defaults.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Name of the run configuration file inside a run directory.
pub const RUN_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Total benchmark duration in seconds.
    #[serde(deserialize_with = "lenient_seconds")]
    pub duration: u64,
    /// Duration of each endpoint's load phase in seconds.
    #[serde(deserialize_with = "lenient_seconds")]
    pub per_endpoint_duration: u64,
    /// Concurrent client connections.
    pub connections: u64,
    pub endpoint_params: EndpointParams,
    /// When the run started, as written by the driver.
    pub test_time: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: 10,
            per_endpoint_duration: 10,
            connections: 50,
            endpoint_params: EndpointParams::default(),
            test_time: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointParams {
    pub cpu: CpuParams,
    pub json: JsonParams,
    pub io: IoParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuParams {
    pub iterations: u64,
}

impl Default for CpuParams {
    fn default() -> Self {
        Self { iterations: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonParams {
    pub items: u64,
}

impl Default for JsonParams {
    fn default() -> Self {
        Self { items: 2_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoParams {
    /// Block size in bytes.
    pub size: u64,
    pub iterations: u64,
    pub mode: String,
}

impl Default for IoParams {
    fn default() -> Self {
        Self {
            size: 8192,
            iterations: 20,
            mode: "memory".to_string(),
        }
    }
}

impl RunConfig {
    /// Load `config.json` from a run directory, merged over the defaults.
    pub fn load(run_dir: &Path) -> Self {
        let path = run_dir.join(RUN_CONFIG_FILE);
        if !path.is_file() {
            tracing::debug!("no {} in {}, using defaults", RUN_CONFIG_FILE, run_dir.display());
            return Self::default();
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("failed to read {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to parse {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Accept whole seconds as an integer, a float (truncated) or a digit
/// string. Anything else, including negative numbers, counts as zero.
fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(seconds_from_value(&value))
}

fn seconds_from_value(value: &serde_json::Value) -> u64 {
    use serde_json::Value;

    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else if let Some(f) = n.as_f64() {
                if f > 0.0 { f as u64 } else { 0 }
            } else {
                0
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().unwrap_or(0)
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Format a duration for display: seconds below a minute, minutes (and
/// seconds) up to half an hour, hours (and minutes) beyond that.
pub fn format_duration_display(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }

    if seconds <= 1800 {
        let minutes = seconds / 60;
        let rem = seconds % 60;
        return if rem == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m {rem}s")
        };
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if minutes == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {minutes}m")
    }
}
