//! # Ledger Telemetry
//!
//! Observability for the registration ledger.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an env filter and a
//!   pretty or JSON formatter.
//! - **Metrics**: Prometheus collectors in a global registry, incremented by
//!   the registration subsystems and encoded for scraping.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `registration-ledger` | Service name on log lines |
//! | `RL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `RL_JSON_LOGS` | `false` | JSON formatted logs |
//! | `RL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, AUDIT_ENTRIES_WRITTEN,
    AUDIT_WRITE_FAILURES, CHAIN_VERIFICATIONS, PIPELINE_DURATION, PRECONDITION_REJECTIONS,
    QR_FALLBACKS, REGISTRATIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
