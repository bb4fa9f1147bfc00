//! # Ports Layer
//!
//! - **Inbound (Driving)**: `ScanSessionApi`, used by camera and keyboard front-ends
//! - **Outbound (Driven)**: `ScanSource` (camera), `VerdictSink` (display),
//!   `SessionObserver` (lifecycle), plus `tg_03_verification::VerificationApi`

pub mod inbound;
pub mod outbound;
