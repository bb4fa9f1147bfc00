//! # Random Nonces

use crate::ports::outbound::NonceSource;
use shared_types::Nonce;

/// 16 bytes from the thread-local CSPRNG, hex-encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonceSource;

impl NonceSource for RandomNonceSource {
    fn next_nonce(&self) -> Nonce {
        Nonce::from_random_bytes(rand::random())
    }
}
