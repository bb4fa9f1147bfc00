//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.

pub mod bus;
pub mod nonce;

pub use bus::IssuanceBusAdapter;
pub use nonce::RandomNonceSource;
