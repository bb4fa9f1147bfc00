//! # Redemption Ledger Subsystem (TG-02)
//!
//! Client of the authoritative ledger that records whether a ticket has
//! been redeemed. The ledger itself lives in an external store; this crate
//! defines what the verification pipeline needs from it and how store
//! outcomes map to redemption outcomes.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): conditional-write outcomes, receipts, errors
//! - **Ports Layer** (`ports/`): `RedemptionLedger` (inbound), `RecordStore` (outbound)
//! - **Adapters** (`adapters/`): in-memory store, RocksDB store (feature
//!   `rocksdb`), event-bus announcement of transfers
//! - **Service Layer** (`service.rs`): `LedgerClient`
//!
//! ## Single-use guarantee
//!
//! `mark_used` is a conditional write ("set used WHERE not used") executed
//! by the store. Any number of concurrent callers may race on one ticket;
//! exactly one of them observes success.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::InMemoryRecordStore;
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb_store::{RocksDbConfig, RocksDbRecordStore};
pub use domain::entities::{ConditionalWrite, RedemptionReceipt};
pub use domain::errors::{LedgerError, RedemptionError, StoreError};
pub use ports::inbound::RedemptionLedger;
pub use ports::outbound::RecordStore;
pub use service::LedgerClient;
