//! # Runtime Adapters
//!
//! Glue between the subsystems that only the runtime needs.
//!
//! - `metered` - verification decorator feeding the scan metrics
//! - `registry` - open scan sessions and the tickets on display

pub mod metered;
pub mod registry;

pub use metered::MeteredVerifier;
pub use registry::{DisplayedTickets, SessionRegistry};
