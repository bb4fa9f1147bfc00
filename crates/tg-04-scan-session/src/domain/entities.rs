//! # Scan Session Entities

use shared_bus::SessionId;
use shared_types::VerificationVerdict;
use std::time::Duration;

/// One raw payload and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanInput {
    Camera(String),
    Manual(String),
}

impl ScanInput {
    pub fn payload(&self) -> &str {
        match self {
            Self::Camera(raw) | Self::Manual(raw) => raw,
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, Self::Camera(_))
    }

    pub fn origin(&self) -> &'static str {
        match self {
            Self::Camera(_) => "camera",
            Self::Manual(_) => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Pause after a verdict before the next scan is accepted.
    pub cooldown: Duration,
    /// Pause after a `TransientFailure` verdict.
    pub transient_cooldown: Duration,
    /// Capacity of the input channel handed out by `ScanSessionController::spawn`.
    pub input_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(3_000),
            transient_cooldown: Duration::ZERO,
            input_buffer: 32,
        }
    }
}

impl SessionConfig {
    /// Cool-down that follows `verdict`.
    pub fn cooldown_after(&self, verdict: &VerificationVerdict) -> Duration {
        match verdict.error_kind() {
            Some(kind) if kind.is_retryable() => self.transient_cooldown,
            _ => self.cooldown,
        }
    }
}

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Payloads sent to the verifier.
    pub processed: u64,
    /// Payloads dropped because a cool-down was active.
    pub dropped: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Scans cut off mid-verification by teardown.
    pub abandoned: u64,
}

impl SessionStats {
    pub(crate) fn record(&mut self, verdict: &VerificationVerdict) {
        self.processed += 1;
        if verdict.is_valid {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Torn down through the cancel signal (or its sender went away).
    Cancelled,
    /// Every input sender was dropped.
    InputClosed,
}

/// What a finished session hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub stats: SessionStats,
    pub exit: ExitReason,
}
