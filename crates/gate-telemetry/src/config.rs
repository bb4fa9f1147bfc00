//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (`info`, `tg_03_verification=debug`, ...)
    pub log_level: String,

    /// Whether to write logs to stderr at all
    pub console_output: bool,

    /// JSON formatted logs for log shippers
    pub json_logs: bool,

    /// Whether to register the Prometheus collectors
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ticket-gate".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TG_SERVICE_NAME`: Service name (default: ticket-gate)
    /// - `TG_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `TG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TG_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `TG_METRICS_ENABLED`: Register Prometheus collectors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("TG_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("TG_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("TG_CONSOLE_OUTPUT")
                .map(|v| flag_enabled(&v))
                .unwrap_or(defaults.console_output),

            json_logs: lookup("TG_JSON_LOGS")
                .map(|v| flag_enabled(&v))
                .unwrap_or(is_container),

            metrics_enabled: lookup("TG_METRICS_ENABLED")
                .map(|v| flag_enabled(&v))
                .unwrap_or(defaults.metrics_enabled),
        }
    }
}

fn flag_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
