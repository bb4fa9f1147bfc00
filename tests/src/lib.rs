//! # Ticket Gate Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks (signing, decoding, full verify)
//! └── src/integration/
//!     ├── scenarios.rs  # door scenarios end to end: issue, scan, re-scan, expiry, forgery
//!     └── flows.rs      # event-bus choreography across subsystems
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gate-tests
//! cargo test -p gate-tests integration::scenarios::
//! cargo bench -p gate-tests
//! ```

#![allow(dead_code)]

pub mod integration;
