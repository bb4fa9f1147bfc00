//! # QR Codes Subsystem (TG-01)
//!
//! Mints and checks the compact, signed payload carried inside a ticket's
//! dynamic QR code.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): signer, wire codec and freshness policy.
//!   Pure computation, no I/O.
//! - **Ports Layer** (`ports/`): `CodeIssuanceApi` (inbound), `NonceSource` (outbound)
//! - **Adapters** (`adapters/`): random nonces, event-bus announcement
//! - **Service Layer** (`service.rs`): `CodeIssuer`, which stamps time and
//!   nonce, signs and encodes
//!
//! ## Security Notes
//!
//! - Digests are HMAC-SHA256 and are compared in constant time.
//! - Signing belongs to a trusted server/edge process. Anything holding the
//!   secret can mint valid codes, so it must never ship in a client bundle.
//! - The scope id is part of the signed message, so a code for one event
//!   cannot be replayed at another.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{IssuanceBusAdapter, RandomNonceSource};
pub use domain::codec::{decode, encode};
pub use domain::errors::{DecodeError, SecretError};
pub use domain::freshness::{is_expired, Expired, FreshnessConfig, FreshnessPolicy};
pub use domain::signer::{
    canonical_message, sign, sign_claims, verify, verify_code, SigningKeyring, SigningSecret,
};
pub use ports::inbound::CodeIssuanceApi;
pub use ports::outbound::NonceSource;
pub use service::CodeIssuer;
