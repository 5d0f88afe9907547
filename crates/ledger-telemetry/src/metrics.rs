//! Prometheus metrics for the registration ledger.
//!
//! All metrics follow the naming convention: `rl_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // REGISTRATION PIPELINE (rl-04)
    // =========================================================================

    /// Registration operations by outcome
    pub static ref REGISTRATIONS: CounterVec = CounterVec::new(
        Opts::new("rl_registration_operations_total", "Registration operations by outcome"),
        &["operation", "outcome"]  // operation: register/retry/cancel, outcome: success/error/rejected
    ).expect("metric creation failed");

    /// Pipeline duration from pending to terminal status
    pub static ref PIPELINE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "rl_registration_pipeline_duration_seconds",
            "Time spent in the registration pipeline"
        ).buckets(exponential_buckets(0.0005, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Precondition rejections by error code
    pub static ref PRECONDITION_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("rl_registration_rejections_total", "Operations refused by a precondition"),
        &["code"]
    ).expect("metric creation failed");

    /// Chain verifications by result
    pub static ref CHAIN_VERIFICATIONS: CounterVec = CounterVec::new(
        Opts::new("rl_chain_verifications_total", "Chain verifications by result"),
        &["result"]  // result: intact/broken
    ).expect("metric creation failed");

    // =========================================================================
    // VERIFICATION ARTIFACTS (rl-02)
    // =========================================================================

    /// QR renders that fell back to the placeholder image
    pub static ref QR_FALLBACKS: Counter = Counter::new(
        "rl_qr_fallbacks_total",
        "QR renders replaced by the placeholder image"
    ).expect("metric creation failed");

    // =========================================================================
    // AUDIT LOG (rl-03)
    // =========================================================================

    /// Audit entries persisted
    pub static ref AUDIT_ENTRIES_WRITTEN: CounterVec = CounterVec::new(
        Opts::new("rl_audit_entries_written_total", "Audit entries persisted"),
        &["action", "status"]
    ).expect("metric creation failed");

    /// Audit writes that failed and were dropped
    pub static ref AUDIT_WRITE_FAILURES: Counter = Counter::new(
        "rl_audit_write_failures_total",
        "Audit writes that failed"
    ).expect("metric creation failed");
}

/// Handle for the metrics registry
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors already registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Registration
        Box::new(REGISTRATIONS.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(PRECONDITION_REJECTIONS.clone()),
        Box::new(CHAIN_VERIFICATIONS.clone()),
        // Verification artifacts
        Box::new(QR_FALLBACKS.clone()),
        // Audit
        Box::new(AUDIT_ENTRIES_WRITTEN.clone()),
        Box::new(AUDIT_WRITE_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
