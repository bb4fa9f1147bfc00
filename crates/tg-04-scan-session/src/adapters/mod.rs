//! # Adapters Module

pub mod bus;
pub mod channel;
pub mod source;
