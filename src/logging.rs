//! Logging initialization.
//!
//! Log lines go to stderr so that stdout carries only the report path.
//! The RUST_LOG environment variable takes precedence over the configured
//! level.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber. Must be called at most once.
pub fn init(config: &LoggingConfig) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.level.as_str())
    };

    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, config.timestamps) {
        (LogFormat::Pretty, true) => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_ansi(true))
                .init();
        }
        (LogFormat::Pretty, false) => {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(true)
                        .without_time(),
                )
                .init();
        }
        (LogFormat::Json, true) => {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        (LogFormat::Json, false) => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .without_time(),
                )
                .init();
        }
        (LogFormat::Compact, true) => {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
        }
        (LogFormat::Compact, false) => {
            registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .without_time(),
                )
                .init();
        }
    }
}
