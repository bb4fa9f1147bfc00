//! # Gate Runtime Library
//!
//! This library exposes the internal modules of the door runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and subsystem wiring
//! - `adapters/` - runtime-only glue (metered verifier, registries)
//! - `handlers/` - bus subscribers (sign-out, wallet checks, metrics)
//! - `console` - operator command parsing
//! - `runtime` - startup, command execution and shutdown

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod console;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use console::{parse_command, Command, CommandError};
pub use container::{load_config, ConfigError, GateConfig, GateContainer};
pub use runtime::GateRuntime;
