//! # Domain Layer
//!
//! Pure logic with no I/O dependencies.

pub mod codec;
pub mod errors;
pub mod freshness;
pub mod signer;
