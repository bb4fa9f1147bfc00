//! # Adapters Module

pub mod bus;
pub mod oracle;
