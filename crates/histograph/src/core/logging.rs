//! Logging infrastructure for graph processing
//!
//! Structured logging through the `tracing` crate. Native builds install a
//! `tracing-subscriber` registry; wasm32 builds log to the browser console
//! through `tracing-wasm`.
//!
//! # Usage
//!
//! ```no_run
//! use histograph::core::logging::init_logging;
//!
//! // Level and format from the environment, falling back to info/compact
//! init_logging(None, None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `HISTOGRAPH_LOG_LEVEL`: Log level or filter directive (trace|debug|info|warn|error|off)
//! - `HISTOGRAPH_LOG_FORMAT`: Output format (compact|pretty|json)
//! - `RUST_LOG`: Standard filter directive, used when `HISTOGRAPH_LOG_LEVEL` is unset
//!
//! # Span Layout
//!
//! The layout engine opens an `info` span per pass and a `debug` span per
//! phase, so filtering on the module path narrows output to one phase:
//!
//! ```bash
//! RUST_LOG="info,histograph::canvas::ordering=trace" histograph layout -i graph.json
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

/// Environment variable holding the log level
pub const LOG_LEVEL_ENV: &str = "HISTOGRAPH_LOG_LEVEL";

/// Environment variable holding the log format
pub const LOG_FORMAT_ENV: &str = "HISTOGRAPH_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Resolve the effective level directive
///
/// An explicit level wins, then `HISTOGRAPH_LOG_LEVEL`, then `RUST_LOG`,
/// then `info`.
pub fn resolve_level(level: Option<&str>) -> String {
    level
        .map(|s| s.to_string())
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

/// Resolve the effective format, defaulting to compact
pub fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    let raw = format
        .map(|s| s.to_string())
        .or_else(|| std::env::var(LOG_FORMAT_ENV).ok());
    match raw {
        Some(raw) => LogFormat::from_str(&raw).map_err(|e| format!("Invalid log format: {}", e)),
        None => Ok(LogFormat::default()),
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// Returns an error when the format is unknown or a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // Console output only; level and format are not configurable here
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let log_level = resolve_level(level);
        let format = resolve_format(format)?;

        let filter = if log_level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        match format {
            LogFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .with_level(true)
                            .with_file(false)
                            .with_line_number(false)
                            .with_span_events(FmtSpan::NONE),
                    )
                    .try_init()?;
            }
            LogFormat::Pretty => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_level(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::ACTIVE)
                            .pretty(),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_level(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::CLOSE)
                            .json(),
                    )
                    .try_init()?;
            }
        }

        Ok(())
    }
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
