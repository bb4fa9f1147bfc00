//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `TicketId`, `ScopeId`, `LedgerKey`, `OwnerRef`, `ContractRef`
//! - **Wire**: `Nonce`, `CodeKind`, `WireVersion`, `CodeClaims`, `VerificationCode`
//! - **Ledger**: `TicketRedemptionRecord`

use crate::errors::{NonceError, ScopeIdError, TicketIdError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 32-byte keyed digest (HMAC-SHA256 output).
pub type SignatureDigest = [u8; 32];

/// Separator between fields of the canonical signed message.
///
/// Identifiers that end up in the message may not contain it.
pub const MESSAGE_DELIMITER: char = ':';

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Opaque identifier of a physical/NFT ticket (the token id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(pub u64);

impl TicketId {
    /// Returns the raw token id.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = TicketIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TicketIdError::NotAnInteger(s.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(TicketId)
            .map_err(|_| TicketIdError::NotAnInteger(s.to_string()))
    }
}

impl From<u64> for TicketId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Identifier of the event/collection a ticket belongs to.
///
/// Binds a signature to one event so a code for event A cannot be replayed
/// against event B.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeId(String);

impl ScopeId {
    /// Maximum length in bytes.
    pub const MAX_LEN: usize = 128;

    /// Validates and wraps a scope identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeIdError`] if the value is empty, longer than
    /// [`Self::MAX_LEN`], or contains the message delimiter, whitespace or
    /// a control character.
    pub fn new(value: impl Into<String>) -> Result<Self, ScopeIdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ScopeIdError::Empty);
        }
        if value.len() > Self::MAX_LEN {
            return Err(ScopeIdError::TooLong {
                len: value.len(),
                max: Self::MAX_LEN,
            });
        }
        if let Some(c) = value
            .chars()
            .find(|c| *c == MESSAGE_DELIMITER || c.is_whitespace() || c.is_control())
        {
            return Err(ScopeIdError::ForbiddenCharacter(c));
        }
        Ok(Self(value))
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ScopeId {
    type Error = ScopeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScopeId> for String {
    fn from(value: ScopeId) -> Self {
        value.0
    }
}

impl FromStr for ScopeId {
    type Err = ScopeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Composite lookup key of a redemption record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
    /// Ticket (token) id.
    pub ticket_id: TicketId,
    /// Event/collection id.
    pub scope_id: ScopeId,
}

impl LedgerKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(ticket_id: TicketId, scope_id: ScopeId) -> Self {
        Self {
            ticket_id,
            scope_id,
        }
    }

    /// Stable byte encoding used by key-value stores: `scope:ticket`.
    #[must_use]
    pub fn storage_key(&self) -> Vec<u8> {
        format!("{}{}{}", self.scope_id, MESSAGE_DELIMITER, self.ticket_id).into_bytes()
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope_id, self.ticket_id)
    }
}

/// Identifier of the current ticket holder (wallet address or account id).
///
/// Display only; never used for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef(pub String);

impl OwnerRef {
    /// Wraps a holder identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, since wallet addresses are hex.
    #[must_use]
    pub fn same_holder(&self, other: &OwnerRef) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the on-chain contract backing a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractRef(pub String);

impl fmt::Display for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: WIRE
// =============================================================================

/// Random token mixed into rotating codes so two codes minted in the same
/// second never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nonce(String);

impl Nonce {
    /// Maximum length in bytes.
    pub const MAX_LEN: usize = 128;

    /// Validates and wraps a nonce.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError`] if the value is empty, too long, or holds
    /// anything other than printable ASCII without the delimiter.
    pub fn new(value: impl Into<String>) -> Result<Self, NonceError> {
        let value = value.into();
        if value.is_empty() {
            return Err(NonceError::Empty);
        }
        if value.len() > Self::MAX_LEN {
            return Err(NonceError::TooLong {
                len: value.len(),
                max: Self::MAX_LEN,
            });
        }
        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_graphic() || *c == MESSAGE_DELIMITER)
        {
            return Err(NonceError::ForbiddenCharacter(c));
        }
        Ok(Self(value))
    }

    /// Lowercase-hex nonce from raw random bytes.
    #[must_use]
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Borrow the nonce text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Nonce {
    type Error = NonceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Nonce> for String {
    fn from(value: Nonce) -> Self {
        value.0
    }
}

/// Which family a code belongs to.
///
/// Selected at decode time; each variant drives its own freshness policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeKind {
    /// Continuously regenerated by the ticket display; carries a nonce.
    Rotating {
        /// Per-code random token.
        nonce: Nonce,
    },
    /// Long-lived code issued before rotation existed; no nonce.
    Legacy,
}

impl CodeKind {
    /// The nonce, when this is a rotating code.
    #[must_use]
    pub fn nonce(&self) -> Option<&Nonce> {
        match self {
            Self::Rotating { nonce } => Some(nonce),
            Self::Legacy => None,
        }
    }

    /// Whether this is a rotating code.
    #[must_use]
    pub fn is_rotating(&self) -> bool {
        matches!(self, Self::Rotating { .. })
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rotating { .. } => "rotating",
            Self::Legacy => "legacy",
        }
    }
}

/// Version tag carried in the QR payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireVersion {
    /// Payload without a `v` field (issued before versioning).
    Unversioned,
    /// First explicitly versioned format.
    V1,
}

impl WireVersion {
    /// Version written by current issuers.
    pub const CURRENT: Self = Self::V1;

    /// Numeric tag, `None` for unversioned payloads.
    #[must_use]
    pub const fn tag(self) -> Option<u8> {
        match self {
            Self::Unversioned => None,
            Self::V1 => Some(1),
        }
    }

    /// Maps a numeric tag back to a version.
    #[must_use]
    pub const fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(Self::V1),
            _ => None,
        }
    }
}

/// The signed fields of a verification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeClaims {
    /// Ticket (token) id.
    pub ticket_id: TicketId,
    /// Event/collection id.
    pub scope_id: ScopeId,
    /// Unix seconds when the code was minted.
    pub issued_at: Timestamp,
    /// Rotating (with nonce) or legacy.
    pub kind: CodeKind,
}

impl CodeClaims {
    /// Ledger key these claims refer to.
    #[must_use]
    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey::new(self.ticket_id, self.scope_id.clone())
    }
}

/// The decoded QR payload.
///
/// Immutable once minted. A rescan after rotation yields a structurally
/// different code with the same ticket and scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Wire version the payload was read from or will be written as.
    pub version: WireVersion,
    /// Signed fields.
    pub claims: CodeClaims,
    /// Keyed digest over the canonical message of `claims`.
    pub signature: SignatureDigest,
}

impl VerificationCode {
    /// Ticket id shortcut.
    #[must_use]
    pub fn ticket_id(&self) -> TicketId {
        self.claims.ticket_id
    }

    /// Scope id shortcut.
    #[must_use]
    pub fn scope_id(&self) -> &ScopeId {
        &self.claims.scope_id
    }

    /// Issue time shortcut.
    #[must_use]
    pub fn issued_at(&self) -> Timestamp {
        self.claims.issued_at
    }

    /// Code kind shortcut.
    #[must_use]
    pub fn kind(&self) -> &CodeKind {
        &self.claims.kind
    }
}

// =============================================================================
// CLUSTER C: LEDGER
// =============================================================================

/// Ledger-side state of one ticket.
///
/// `is_used` is monotonic: it starts `false` and flips to `true` exactly once,
/// together with `used_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRedemptionRecord {
    /// Ticket (token) id.
    pub ticket_id: TicketId,
    /// Event/collection id.
    pub scope_id: ScopeId,
    /// Whether the ticket has been redeemed.
    pub is_used: bool,
    /// When the ticket was redeemed.
    pub used_at: Option<Timestamp>,
    /// Current holder, for display.
    pub owner_ref: Option<OwnerRef>,
}

impl TicketRedemptionRecord {
    /// A freshly issued, unused ticket.
    #[must_use]
    pub fn issued(ticket_id: TicketId, scope_id: ScopeId, owner_ref: Option<OwnerRef>) -> Self {
        Self {
            ticket_id,
            scope_id,
            is_used: false,
            used_at: None,
            owner_ref,
        }
    }

    /// Composite key of this record.
    #[must_use]
    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.ticket_id, self.scope_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_parses_decimal_text() {
        assert_eq!("42".parse::<TicketId>(), Ok(TicketId(42)));
        assert_eq!(" 7 ".parse::<TicketId>(), Ok(TicketId(7)));
    }

    #[test]
    fn test_ticket_id_rejects_non_integers() {
        assert!("-1".parse::<TicketId>().is_err());
        assert!("0x2a".parse::<TicketId>().is_err());
        assert!("".parse::<TicketId>().is_err());
        assert!("99999999999999999999999".parse::<TicketId>().is_err());
    }

    #[test]
    fn test_scope_id_rejects_delimiter() {
        assert_eq!(
            ScopeId::new("event:7"),
            Err(ScopeIdError::ForbiddenCharacter(':'))
        );
        assert_eq!(ScopeId::new(""), Err(ScopeIdError::Empty));
        assert!(ScopeId::new("event-7").is_ok());
    }

    #[test]
    fn test_scope_id_length_limit() {
        let long = "a".repeat(ScopeId::MAX_LEN + 1);
        assert!(matches!(
            ScopeId::new(long),
            Err(ScopeIdError::TooLong { .. })
        ));
        assert!(ScopeId::new("a".repeat(ScopeId::MAX_LEN)).is_ok());
    }

    #[test]
    fn test_nonce_validation() {
        assert!(Nonce::new("3f2a9c").is_ok());
        assert_eq!(Nonce::new(""), Err(NonceError::Empty));
        assert_eq!(Nonce::new("a b"), Err(NonceError::ForbiddenCharacter(' ')));
        assert_eq!(Nonce::new("a:b"), Err(NonceError::ForbiddenCharacter(':')));
    }

    #[test]
    fn test_nonce_from_random_bytes_is_valid_hex() {
        let mut bytes = [0xAB; 16];
        bytes[0] = 0x01;
        let nonce = Nonce::from_random_bytes(bytes);
        assert_eq!(nonce.as_str(), format!("01{}", "ab".repeat(15)));
        assert_eq!(Nonce::new(nonce.as_str()), Ok(nonce));
    }

    #[test]
    fn test_code_kind_nonce_access() {
        let nonce = Nonce::new("abc").unwrap();
        let rotating = CodeKind::Rotating {
            nonce: nonce.clone(),
        };
        assert_eq!(rotating.nonce(), Some(&nonce));
        assert!(rotating.is_rotating());
        assert_eq!(CodeKind::Legacy.nonce(), None);
        assert_eq!(CodeKind::Legacy.label(), "legacy");
    }

    #[test]
    fn test_wire_version_tags() {
        assert_eq!(WireVersion::CURRENT.tag(), Some(1));
        assert_eq!(WireVersion::Unversioned.tag(), None);
        assert_eq!(WireVersion::from_tag(1), Some(WireVersion::V1));
        assert_eq!(WireVersion::from_tag(2), None);
    }

    #[test]
    fn test_record_serde_rejects_bad_scope() {
        let record = TicketRedemptionRecord::issued(
            TicketId(1),
            ScopeId::new("event-1").unwrap(),
            Some(OwnerRef::new("0xabc")),
        );
        let bytes = bincode::serialize(&record).unwrap();
        let back: TicketRedemptionRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, record);

        let bad = serde_json::json!({
            "ticket_id": 1,
            "scope_id": "bad:scope",
            "is_used": false,
            "used_at": null,
            "owner_ref": null
        });
        assert!(serde_json::from_value::<TicketRedemptionRecord>(bad).is_err());
    }

    #[test]
    fn test_owner_ref_case_insensitive() {
        let a = OwnerRef::new("0xABCdef");
        let b = OwnerRef::new("0xabcDEF");
        assert!(a.same_holder(&b));
        assert!(!a.same_holder(&OwnerRef::new("0x123")));
    }

    #[test]
    fn test_ledger_key_storage_encoding() {
        let key = LedgerKey::new(TicketId(42), ScopeId::new("event-7").unwrap());
        assert_eq!(key.storage_key(), b"event-7:42".to_vec());
        assert_eq!(key.to_string(), "event-7/42");
    }
}
