//! # Gate Telemetry
//!
//! Logging and metrics for the ticket gate.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with `EnvFilter`, pretty or JSON output
//! - **Metrics**: Prometheus collectors in a private registry, exposed as text
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // scans, redemptions and sessions are now logged and counted
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TG_SERVICE_NAME` | `ticket-gate` | Service name in logs |
//! | `TG_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `TG_JSON_LOGS` | `false` | JSON log lines (default on in containers) |
//! | `TG_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `TG_METRICS_ENABLED` | `true` | Register Prometheus collectors |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    gather_text, record_scan, register_metrics, HistogramTimer, CODES_ISSUED_TOTAL,
    FORGERIES_TOTAL, ORACLE_FAILURES_TOTAL, REDEMPTIONS_TOTAL, SCANS_TOTAL,
    SCAN_SESSIONS_ACTIVE, TRANSFERS_TOTAL, VERIFICATION_DURATION, WALLET_MISMATCHES_TOTAL,
};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A collector could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Bad configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    if config.metrics_enabled {
        register_metrics()?;
    }
    init_logging(config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active. Logs on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
