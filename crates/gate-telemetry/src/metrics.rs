//! Prometheus metrics for the ticket gate.
//!
//! All metrics follow the naming convention: `tg_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: scans by outcome, redemptions, forgeries, oracle failures
//! - **Gauge**: scan sessions currently open
//! - **Histogram**: end-to-end verification latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::time::Instant;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SCANS
    // =========================================================================

    /// Scans by outcome (`accepted` or the rejection kind)
    pub static ref SCANS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tg_scans_total", "Scans processed at the door, by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// End-to-end verification latency
    pub static ref VERIFICATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "tg_verification_duration_seconds",
            "Time from raw payload to verdict"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Tickets redeemed
    pub static ref REDEMPTIONS_TOTAL: IntCounter = IntCounter::new(
        "tg_redemptions_total",
        "Tickets redeemed in the ledger"
    ).expect("metric creation failed");

    /// Ownership transfers recorded in the ledger
    pub static ref TRANSFERS_TOTAL: IntCounter = IntCounter::new(
        "tg_transfers_total",
        "Ticket ownership transfers"
    ).expect("metric creation failed");

    // =========================================================================
    // SECURITY
    // =========================================================================

    /// Payloads whose signature did not verify
    pub static ref FORGERIES_TOTAL: IntCounter = IntCounter::new(
        "tg_forgeries_total",
        "Payloads rejected for a bad signature"
    ).expect("metric creation failed");

    /// Ownership oracle calls that failed or timed out
    pub static ref ORACLE_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "tg_oracle_failures_total",
        "Ownership oracle calls that did not produce an answer"
    ).expect("metric creation failed");

    /// Connected wallet did not hold the displayed ticket
    pub static ref WALLET_MISMATCHES_TOTAL: IntCounter = IntCounter::new(
        "tg_wallet_mismatches_total",
        "Displayed tickets not held by the connected wallet"
    ).expect("metric creation failed");

    // =========================================================================
    // ISSUANCE & SESSIONS
    // =========================================================================

    /// Codes minted by kind (`rotating` / `legacy`)
    pub static ref CODES_ISSUED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tg_codes_issued_total", "Verification codes minted, by kind"),
        &["kind"]
    ).expect("metric creation failed");

    /// Scan sessions currently open
    pub static ref SCAN_SESSIONS_ACTIVE: IntGauge = IntGauge::new(
        "tg_scan_sessions_active",
        "Door scan sessions currently running"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SCANS_TOTAL.clone()),
        Box::new(VERIFICATION_DURATION.clone()),
        Box::new(REDEMPTIONS_TOTAL.clone()),
        Box::new(TRANSFERS_TOTAL.clone()),
        Box::new(FORGERIES_TOTAL.clone()),
        Box::new(ORACLE_FAILURES_TOTAL.clone()),
        Box::new(WALLET_MISMATCHES_TOTAL.clone()),
        Box::new(CODES_ISSUED_TOTAL.clone()),
        Box::new(SCAN_SESSIONS_ACTIVE.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Count one scan under `outcome`.
pub fn record_scan(outcome: &str) {
    SCANS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Current count for `outcome`.
pub fn scan_count(outcome: &str) -> u64 {
    SCANS_TOTAL.with_label_values(&[outcome]).get()
}

/// Encode all metrics as Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
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
    start: Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_record_scan_counts_by_outcome() {
        let before = scan_count("expired");
        record_scan("expired");
        record_scan("expired");
        assert_eq!(scan_count("expired"), before + 2);
    }

    #[test]
    fn test_histogram_timer_observes_on_drop() {
        let before = VERIFICATION_DURATION.get_sample_count();
        {
            let _timer = time_histogram!(VERIFICATION_DURATION);
        }
        assert_eq!(VERIFICATION_DURATION.get_sample_count(), before + 1);
    }

    #[test]
    fn test_gather_text_exposes_registered_metrics() {
        register_metrics().unwrap();
        record_scan("accepted");
        REDEMPTIONS_TOTAL.inc();
        let text = gather_text().unwrap();
        assert!(text.contains("tg_scans_total"));
        assert!(text.contains("outcome=\"accepted\""));
        assert!(text.contains("tg_redemptions_total"));
    }
}
