//! # Shared Types Crate
//!
//! This crate contains the domain entities shared by every Ticket Gate
//! subsystem: the decoded QR payload, the ledger-side redemption record,
//! and the verdict returned for each scan.
//!
//! ## Design Principles
//!
//! - **Parse, don't validate**: identifiers are newtypes whose constructors
//!   reject malformed input, so a `VerificationCode` is never partially filled.
//! - **Sum types over optional fields**: rotating and legacy codes are
//!   distinct `CodeKind` variants rather than an optional nonce.
//! - **Single Source of Truth**: the verdict taxonomy (`ErrorKind`) is
//!   defined once and consumed by the orchestrator, the scan session and
//!   the runtime alike.

pub mod entities;
pub mod errors;
pub mod time;
pub mod verdict;

pub use entities::*;
pub use errors::*;
pub use time::{ManualClock, SystemTimeSource, TimeSource};
pub use verdict::{ErrorKind, OwnershipCheck, VerdictError, VerificationVerdict};
