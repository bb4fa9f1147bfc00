//! # Verification Subsystem (TG-03)
//!
//! Turns a raw scanned payload into an accept/reject verdict.
//!
//! ## Pipeline
//!
//! Strictly sequential; the first failing stage decides the verdict.
//!
//! ```text
//! raw ─→ decode ─→ signature ─→ freshness ─→ ledger lookup ─→ used? ─→ mark_used ─→ verdict
//!          │           │            │              │             │          │
//!   InvalidFormat  ForgedOrCorrupt  Expired   UnknownTicket  AlreadyRedeemed  TransientFailure
//! ```
//!
//! The optional on-chain ownership check runs before `mark_used` in
//! fail-closed mode (so a failing check never burns the ticket) and after it
//! in advisory mode.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): ownership policy, scope directory, notices
//! - **Ports Layer** (`ports/`): `VerificationApi` (inbound);
//!   `OwnershipOracle`, `VerdictPublisher` (outbound)
//! - **Adapters** (`adapters/`): bus publisher, in-memory oracle
//! - **Service Layer** (`service.rs`): `VerificationService`

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::bus::BusVerdictPublisher;
pub use adapters::oracle::InMemoryOwnershipOracle;
pub use domain::entities::{OwnershipCheckMode, ScopeDirectory, VerificationNotice, VerificationPolicy};
pub use domain::errors::{OracleError, PolicyParseError};
pub use ports::inbound::VerificationApi;
pub use ports::outbound::{NoOpVerdictPublisher, OwnershipOracle, VerdictPublisher};
pub use service::VerificationService;
