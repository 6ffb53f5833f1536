//! # LSD Telemetry
//!
//! Logging and metrics setup shared by LSD network services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lsd_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `lsd-network-factory` | Service name in logs |
//! | `LSD_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LSD_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `LSD_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `LSD_NETWORK` | `devnet` | Network name |

#![warn(missing_docs)]

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::encode_metrics;
pub use tracing_setup::{env_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),

    /// Metrics could not be gathered or encoded.
    #[error("Failed to encode Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging for `config`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(config)
}
