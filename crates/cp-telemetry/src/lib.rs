//! # Connection-Point Telemetry
//!
//! Structured logging for binaries and test harnesses built on the registry
//! crates. Library crates only emit `tracing` events; installing a
//! subscriber is left to the process that owns `main`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cp_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CP_SERVICE_NAME` | `connection-points` | Service name in logs |
//! | `CP_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CP_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CP_JSON_LOGS` | `false` | JSON formatted output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
