//! Structured logging.
//!
//! Human-readable output for development, JSON for log shippers. Every
//! verdict goes through [`log_scan_event!`](crate::log_scan_event) so the
//! same fields (`outcome`, `ticket_id`, `scope_id`) appear on every line.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(format!("log filter `{}`: {e}", config.log_level)))
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::LoggingInit`] when a subscriber is
/// already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let console = if !config.console_output {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log a scan verdict with the standard fields.
///
/// ```rust,ignore
/// log_scan_event!(info, verdict, "Scan processed", origin = "camera");
/// ```
#[macro_export]
macro_rules! log_scan_event {
    ($level:ident, $verdict:expr, $msg:expr $(, $($field:tt)*)?) => {{
        let verdict = &$verdict;
        $crate::tracing::$level!(
            outcome = verdict.outcome_label(),
            ticket_id = ?verdict.ticket_id,
            scope_id = ?verdict.scope_id,
            $($($field)*,)?
            $msg
        )
    }};
}
