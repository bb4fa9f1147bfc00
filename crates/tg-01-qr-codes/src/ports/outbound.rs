//! # Outbound Ports (Driven Ports / SPI)

use shared_types::Nonce;

/// Source of per-code nonces.
///
/// Two codes minted for the same ticket in the same second must differ,
/// so implementations must not repeat values in practice.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> Nonce;
}

impl<T: NonceSource + ?Sized> NonceSource for std::sync::Arc<T> {
    fn next_nonce(&self) -> Nonce {
        (**self).next_nonce()
    }
}
