//! # Ports Layer
//!
//! - **Inbound (Driving)**: `VerificationApi`, called by scanners
//! - **Outbound (Driven)**: `OwnershipOracle` (chain view), `VerdictPublisher`
//!   (ledger access goes through `tg_02_redemption_ledger::RedemptionLedger`)

pub mod inbound;
pub mod outbound;
