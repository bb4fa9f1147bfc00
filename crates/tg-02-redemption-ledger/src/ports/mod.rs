//! # Ports Layer
//!
//! - **Inbound (Driving)**: `RedemptionLedger`, used by the verification pipeline
//! - **Outbound (Driven)**: `RecordStore`, the external durable store

pub mod inbound;
pub mod outbound;
