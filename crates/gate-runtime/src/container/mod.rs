//! # Gate Container
//!
//! Central container holding the subsystem instances with their adapters.
//!
//! - Subsystems are built in dependency order: keyring, ledger, verifier, issuer
//! - Cross-subsystem notifications travel over the event bus

pub mod config;
pub mod services;

pub use config::{load_config, load_config_from, ConfigError, GateConfig};
pub use services::{GateContainer, OpenSession};
