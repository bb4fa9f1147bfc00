//! # Signer / Verifier
//!
//! HMAC-SHA256 over the canonical message `ticketId:scopeId:issuedAt[:nonce]`.
//!
//! The nonce segment is omitted entirely for legacy codes, so legacy
//! signatures minted before rotation existed still verify.

use crate::domain::errors::SecretError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use shared_types::{
    CodeClaims, CodeKind, ScopeId, SignatureDigest, VerificationCode, MESSAGE_DELIMITER,
};
use std::collections::HashMap;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// A keyed HMAC state built from secret bytes.
///
/// The raw bytes are wiped as soon as the MAC is keyed. `Debug` only ever
/// shows a short fingerprint.
#[derive(Clone)]
pub struct SigningSecret {
    mac: HmacSha256,
    fingerprint: [u8; 4],
    all_zero: bool,
}

impl SigningSecret {
    /// Minimum accepted key length in bytes.
    pub const MIN_LEN: usize = 32;

    /// Keys a MAC from raw bytes. The input is zeroized before returning.
    ///
    /// # Errors
    ///
    /// [`SecretError::TooShort`] if fewer than [`Self::MIN_LEN`] bytes are given.
    pub fn new(mut bytes: Vec<u8>) -> Result<Self, SecretError> {
        let result = Self::key(&bytes);
        bytes.zeroize();
        result
    }

    /// Parses a hex-encoded secret (optional `0x` prefix).
    ///
    /// # Errors
    ///
    /// [`SecretError::InvalidHex`] or [`SecretError::TooShort`].
    pub fn from_hex(text: &str) -> Result<Self, SecretError> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| SecretError::InvalidHex(e.to_string()))?;
        Self::new(bytes)
    }

    fn key(bytes: &[u8]) -> Result<Self, SecretError> {
        if bytes.len() < Self::MIN_LEN {
            return Err(SecretError::TooShort {
                len: bytes.len(),
                min: Self::MIN_LEN,
            });
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(bytes)
            .map_err(|e| SecretError::Rejected(e.to_string()))?;

        let digest = Sha256::digest(bytes);
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&digest[..4]);

        Ok(Self {
            mac,
            fingerprint,
            all_zero: bytes.iter().all(|b| *b == 0),
        })
    }

    /// First four bytes of SHA-256(secret), hex. Safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(self.fingerprint)
    }

    /// True for the all-zero development secret.
    #[must_use]
    pub fn is_all_zero(&self) -> bool {
        self.all_zero
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Default secret plus optional per-scope secrets.
#[derive(Debug, Clone)]
pub struct SigningKeyring {
    default: SigningSecret,
    scoped: HashMap<ScopeId, SigningSecret>,
}

impl SigningKeyring {
    /// Keyring with a single secret for every scope.
    #[must_use]
    pub fn new(default: SigningSecret) -> Self {
        Self {
            default,
            scoped: HashMap::new(),
        }
    }

    /// Adds (or replaces) the secret used for one scope.
    #[must_use]
    pub fn with_scope_secret(mut self, scope: ScopeId, secret: SigningSecret) -> Self {
        self.scoped.insert(scope, secret);
        self
    }

    /// The secret that signs and verifies codes of `scope`.
    #[must_use]
    pub fn secret_for(&self, scope: &ScopeId) -> &SigningSecret {
        self.scoped.get(scope).unwrap_or(&self.default)
    }

    /// The fallback secret.
    #[must_use]
    pub fn default_secret(&self) -> &SigningSecret {
        &self.default
    }

    /// Number of scope-specific secrets.
    #[must_use]
    pub fn scoped_count(&self) -> usize {
        self.scoped.len()
    }
}

/// Builds `ticketId:scopeId:issuedAt[:nonce]`.
#[must_use]
pub fn canonical_message(claims: &CodeClaims) -> String {
    let base = format!(
        "{}{d}{}{d}{}",
        claims.ticket_id,
        claims.scope_id,
        claims.issued_at,
        d = MESSAGE_DELIMITER
    );
    match &claims.kind {
        CodeKind::Rotating { nonce } => format!("{base}{MESSAGE_DELIMITER}{nonce}"),
        CodeKind::Legacy => base,
    }
}

/// HMAC-SHA256 of `message` under `secret`.
#[must_use]
pub fn sign(message: &str, secret: &SigningSecret) -> SignatureDigest {
    let mut mac = secret.mac.clone();
    mac.update(message.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&tag);
    digest
}

/// Constant-time check of `candidate` against the digest of `message`.
///
/// A candidate of the wrong length is simply unequal.
#[must_use]
pub fn verify(message: &str, secret: &SigningSecret, candidate: &[u8]) -> bool {
    let expected = sign(message, secret);
    expected[..].ct_eq(candidate).into()
}

/// Signs claims with the keyring's scope-appropriate secret.
#[must_use]
pub fn sign_claims(claims: &CodeClaims, keyring: &SigningKeyring) -> SignatureDigest {
    sign(
        &canonical_message(claims),
        keyring.secret_for(&claims.scope_id),
    )
}

/// Recomputes the digest of a decoded code and compares it with the one it carries.
#[must_use]
pub fn verify_code(code: &VerificationCode, keyring: &SigningKeyring) -> bool {
    verify(
        &canonical_message(&code.claims),
        keyring.secret_for(code.scope_id()),
        &code.signature,
    )
}
