//! # Ports Layer
//!
//! - **Inbound (Driving)**: `CodeIssuanceApi`, used by ticket displays
//! - **Outbound (Driven)**: `NonceSource`

pub mod inbound;
pub mod outbound;
