//! # Cross-Subsystem Integration
//!
//! Wires the real services together (issuer, ledger, verifier, scan
//! session, bus) with a manual clock standing in for wall time.

pub mod flows;
pub mod scenarios;
