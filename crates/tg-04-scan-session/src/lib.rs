//! # Scan Session Subsystem (TG-04)
//!
//! The door-side loop that turns a stream of raw scans into a stream of
//! verdicts.
//!
//! ## Cycle
//!
//! ```text
//! Ready ──scan──→ suspend camera ──→ verify ──→ show verdict ──→ CoolingDown
//!   ↑                                                               │
//!   └──────────── clear display, resume camera ←── cooldown elapsed ┘
//! ```
//!
//! Scans arriving while cooling down are dropped, not queued. Manual entry
//! takes the same path but never touches the camera. A `TransientFailure`
//! verdict uses the (shorter) transient cool-down so staff can rescan.
//!
//! Teardown, whether by cancellation or by the input channel closing,
//! releases the camera exactly once wherever the cycle stands. A scan
//! still being verified at cancellation is abandoned.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::bus::BusSessionObserver;
pub use adapters::channel::{ChannelVerdictSink, DisplayUpdate};
pub use adapters::source::InMemoryScanSource;
pub use domain::entities::{ExitReason, ScanInput, SessionConfig, SessionReport, SessionStats};
pub use domain::errors::{SessionError, SourceError};
pub use ports::inbound::ScanSessionApi;
pub use ports::outbound::{NoOpSessionObserver, ScanSource, SessionObserver, VerdictSink};
pub use service::{ScanSessionController, ScanSessionHandle};
