//! Structured logging.
//!
//! Every subsystem logs through `tracing` with an `[rl-NN]` prefix in the
//! message. This module installs the global subscriber: an env filter plus
//! either a human readable or a JSON formatter.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Structured logger handle
pub struct LoggingGuard {
    service_name: String,
}

impl LoggingGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::LoggerInit`] when a global subscriber is
/// already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    let fmt_layer: Option<Box<dyn Layer<Registry> + Send + Sync>> = match (
        config.console_output,
        config.json_logs,
    ) {
        (false, _) => None,
        (true, true) => Some(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        ),
        (true, false) => Some(fmt::layer().with_target(true).boxed()),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| TelemetryError::LoggerInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Structured logging initialized"
    );

    Ok(LoggingGuard {
        service_name: config.service_name.clone(),
    })
}

/// Log an invoice-scoped event with the standard fields.
#[macro_export]
macro_rules! log_invoice_event {
    ($level:ident, $subsystem:expr, $msg:expr, $invoice_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            invoice_id = %$invoice_id,
            $($($field)*,)?
            $msg
        )
    };
}
