//! # Metrics Recorder
//!
//! Bus subscriber that turns domain events into Prometheus counters. Scan
//! outcomes and latency are recorded at the verifier (`MeteredVerifier`).

use gate_telemetry::metrics::{
    CODES_ISSUED_TOTAL, FORGERIES_TOTAL, REDEMPTIONS_TOTAL, SCAN_SESSIONS_ACTIVE, TRANSFERS_TOTAL,
    WALLET_MISMATCHES_TOTAL,
};
use gate_telemetry::metric_inc;
use shared_bus::{EventStream, GateEvent};
use tokio_stream::StreamExt;
use tracing::{debug, error};

pub struct MetricsRecorder {
    events: EventStream,
}

impl MetricsRecorder {
    /// `events` should be unfiltered.
    pub fn new(events: EventStream) -> Self {
        Self { events }
    }

    pub async fn run(mut self) {
        debug!("Metrics recorder started");
        while let Some(event) = self.events.next().await {
            record(&event);
        }
    }
}

/// Applies one event to the metrics.
pub fn record(event: &GateEvent) {
    match event {
        GateEvent::CodeIssued { kind, .. } => metric_inc!(CODES_ISSUED_TOTAL, &[kind.as_str()]),
        GateEvent::TicketRedeemed { .. } => metric_inc!(REDEMPTIONS_TOTAL),
        GateEvent::TicketTransferred { .. } => metric_inc!(TRANSFERS_TOTAL),
        GateEvent::ForgeryDetected { .. } => metric_inc!(FORGERIES_TOTAL),
        GateEvent::WalletMismatch { .. } => metric_inc!(WALLET_MISMATCHES_TOTAL),
        GateEvent::ScanSessionStarted { .. } => metric_inc!(SCAN_SESSIONS_ACTIVE),
        GateEvent::ScanSessionClosed { .. } => SCAN_SESSIONS_ACTIVE.dec(),
        GateEvent::CriticalError {
            subsystem_id,
            error,
        } => error!(subsystem_id, %error, "Critical error"),
        _ => {}
    }
}
