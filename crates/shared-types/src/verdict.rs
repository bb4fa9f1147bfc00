//! # Verification Verdict
//!
//! The single result returned for every scan. Failures are values, never
//! control flow, so the orchestrator can attach whatever it already knows
//! (ticket id, owner, redemption time) to a rejection.

use crate::entities::{OwnerRef, ScopeId, TicketId, TicketRedemptionRecord, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a scan was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Payload not decodable. Re-scan a legitimate code.
    InvalidFormat,
    /// Signature mismatch. Potential security event.
    ForgedOrCorrupt,
    /// Code aged out. Refresh the ticket display and rescan.
    Expired,
    /// No ledger record for the ticket/scope pair.
    UnknownTicket,
    /// Ledger shows prior use.
    AlreadyRedeemed,
    /// Storage or network hiccup. Retryable.
    TransientFailure,
    /// Fail-closed ownership check found the ticket invalid on chain.
    OwnershipMismatch,
}

impl ErrorKind {
    /// Whether an immediate rescan may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::TransientFailure)
    }

    /// Whether this rejection should be logged as a security event.
    #[must_use]
    pub const fn is_security_event(self) -> bool {
        matches!(self, Self::ForgedOrCorrupt | Self::OwnershipMismatch)
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::ForgedOrCorrupt => "forged_or_corrupt",
            Self::Expired => "expired",
            Self::UnknownTicket => "unknown_ticket",
            Self::AlreadyRedeemed => "already_redeemed",
            Self::TransientFailure => "transient_failure",
            Self::OwnershipMismatch => "ownership_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection reason plus human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictError {
    /// Machine-readable category.
    pub kind: ErrorKind,
    /// Detail for door staff and logs.
    pub detail: String,
}

/// Outcome of the optional on-chain ownership cross-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OwnershipCheck {
    /// Cross-check disabled or not reached.
    #[default]
    NotRequested,
    /// Chain agrees with the ledger.
    Confirmed {
        /// Current on-chain holder.
        owner: OwnerRef,
    },
    /// Chain reports a different holder than the ledger.
    OwnerDiffers {
        /// Holder recorded in the ledger, if any.
        ledger: Option<OwnerRef>,
        /// Holder reported by the chain.
        chain: OwnerRef,
    },
    /// Chain reports the ticket as not valid.
    TicketInvalidOnChain,
    /// Oracle unreachable or timed out; ledger-only verdict.
    Unavailable {
        /// Why the oracle could not answer.
        reason: String,
    },
}

/// Ephemeral per-scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    /// Accept or reject.
    pub is_valid: bool,
    /// Present whenever the payload decoded far enough to know it.
    pub ticket_id: Option<TicketId>,
    /// Present whenever the payload decoded far enough to know it.
    pub scope_id: Option<ScopeId>,
    /// Holder from the ledger record.
    pub owner_ref: Option<OwnerRef>,
    /// Set when the rejection is "already redeemed".
    pub is_used: Option<bool>,
    /// Redemption time: the commit time on success, the prior use on
    /// `AlreadyRedeemed`.
    pub used_at: Option<Timestamp>,
    /// Rejection reason when `is_valid == false`.
    pub error: Option<VerdictError>,
    /// Result of the ownership cross-check.
    pub ownership: OwnershipCheck,
}

impl VerificationVerdict {
    /// A successful redemption.
    #[must_use]
    pub fn accepted(record: &TicketRedemptionRecord, used_at: Timestamp) -> Self {
        Self {
            is_valid: true,
            ticket_id: Some(record.ticket_id),
            scope_id: Some(record.scope_id.clone()),
            owner_ref: record.owner_ref.clone(),
            is_used: None,
            used_at: Some(used_at),
            error: None,
            ownership: OwnershipCheck::NotRequested,
        }
    }

    /// A rejection carrying no ticket context.
    pub fn rejected(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            ticket_id: None,
            scope_id: None,
            owner_ref: None,
            is_used: None,
            used_at: None,
            error: Some(VerdictError {
                kind,
                detail: detail.into(),
            }),
            ownership: OwnershipCheck::NotRequested,
        }
    }

    /// Attaches the decoded ticket and scope.
    #[must_use]
    pub fn with_ticket(mut self, ticket_id: TicketId, scope_id: ScopeId) -> Self {
        self.ticket_id = Some(ticket_id);
        self.scope_id = Some(scope_id);
        self
    }

    /// Attaches the holder recorded in the ledger.
    #[must_use]
    pub fn with_owner(mut self, owner_ref: Option<OwnerRef>) -> Self {
        self.owner_ref = owner_ref;
        self
    }

    /// Marks the rejection as "already redeemed at `used_at`".
    #[must_use]
    pub fn with_prior_use(mut self, used_at: Option<Timestamp>) -> Self {
        self.is_used = Some(true);
        self.used_at = used_at;
        self
    }

    /// Records the ownership cross-check outcome.
    #[must_use]
    pub fn with_ownership(mut self, ownership: OwnershipCheck) -> Self {
        self.ownership = ownership;
        self
    }

    /// Rejection category, if any.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Short label: `accepted` or the error kind.
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        self.error_kind().map_or("accepted", ErrorKind::as_str)
    }
}

impl fmt::Display for VerificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, self.ticket_id) {
            (None, Some(ticket)) => {
                write!(f, "ACCEPTED ticket {ticket}")?;
                if let Some(owner) = &self.owner_ref {
                    write!(f, " (holder {owner})")?;
                }
                Ok(())
            }
            (None, None) => f.write_str("ACCEPTED"),
            (Some(err), Some(ticket)) => {
                write!(f, "REJECTED [{}] ticket {ticket}: {}", err.kind, err.detail)
            }
            (Some(err), None) => write!(f, "REJECTED [{}]: {}", err.kind, err.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TicketRedemptionRecord {
        TicketRedemptionRecord::issued(
            TicketId(42),
            ScopeId::new("event-7").unwrap(),
            Some(OwnerRef::new("0xholder")),
        )
    }

    #[test]
    fn test_only_transient_failures_are_retryable() {
        let kinds = [
            ErrorKind::InvalidFormat,
            ErrorKind::ForgedOrCorrupt,
            ErrorKind::Expired,
            ErrorKind::UnknownTicket,
            ErrorKind::AlreadyRedeemed,
            ErrorKind::OwnershipMismatch,
        ];
        for kind in kinds {
            assert!(!kind.is_retryable(), "{kind} must not be retryable");
        }
        assert!(ErrorKind::TransientFailure.is_retryable());
    }

    #[test]
    fn test_accepted_verdict_carries_record_context() {
        let verdict = VerificationVerdict::accepted(&record(), 1_000);
        assert!(verdict.is_valid);
        assert_eq!(verdict.ticket_id, Some(TicketId(42)));
        assert_eq!(verdict.owner_ref, Some(OwnerRef::new("0xholder")));
        assert_eq!(verdict.used_at, Some(1_000));
        assert_eq!(verdict.error_kind(), None);
        assert_eq!(verdict.outcome_label(), "accepted");
    }

    #[test]
    fn test_already_redeemed_verdict() {
        let verdict = VerificationVerdict::rejected(ErrorKind::AlreadyRedeemed, "used")
            .with_ticket(TicketId(42), ScopeId::new("event-7").unwrap())
            .with_prior_use(Some(999));
        assert!(!verdict.is_valid);
        assert_eq!(verdict.is_used, Some(true));
        assert_eq!(verdict.used_at, Some(999));
        assert_eq!(verdict.outcome_label(), "already_redeemed");
    }

    #[test]
    fn test_display() {
        let ok = VerificationVerdict::accepted(&record(), 1);
        assert_eq!(ok.to_string(), "ACCEPTED ticket 42 (holder 0xholder)");

        let bad = VerificationVerdict::rejected(ErrorKind::InvalidFormat, "not json");
        assert_eq!(bad.to_string(), "REJECTED [invalid_format]: not json");
    }
}
