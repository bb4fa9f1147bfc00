//! # Adapters Module
//!
//! Record stores and the event-bus adapter.

pub mod bus;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use bus::LedgerBusAdapter;
