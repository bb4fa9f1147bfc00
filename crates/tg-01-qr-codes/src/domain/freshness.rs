//! # Freshness Policy
//!
//! A code older than its policy's maximum age is expired. Rotating codes
//! live for seconds; legacy printed codes for a day.

use shared_types::{CodeClaims, CodeKind, Timestamp};
use std::fmt;
use thiserror::Error;

/// True iff `now - issued_at > max_age_secs`.
///
/// Codes dated in the future are not expired; no clock-skew allowance is applied.
#[must_use]
pub fn is_expired(issued_at: Timestamp, max_age_secs: u64, now: Timestamp) -> bool {
    now.saturating_sub(issued_at) > max_age_secs
}

/// A named maximum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub name: &'static str,
    pub max_age_secs: u64,
}

impl FreshnessPolicy {
    /// Continuously rotating display codes.
    pub const ROTATING: Self = Self {
        name: "rotating",
        max_age_secs: 30,
    };

    /// Legacy/static printed codes.
    pub const STATIC: Self = Self {
        name: "static",
        max_age_secs: 86_400,
    };

    /// Same name, different age.
    #[must_use]
    pub const fn with_max_age(self, max_age_secs: u64) -> Self {
        Self {
            name: self.name,
            max_age_secs,
        }
    }

    /// Whether a code issued at `issued_at` is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, issued_at: Timestamp, now: Timestamp) -> bool {
        is_expired(issued_at, self.max_age_secs, now)
    }
}

impl fmt::Display for FreshnessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.name, self.max_age_secs)
    }
}

/// Expiry details for the verdict.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("code is {age}s old, {policy} codes are valid for {max_age}s")]
pub struct Expired {
    pub issued_at: Timestamp,
    pub age: u64,
    pub max_age: u64,
    pub policy: &'static str,
}

/// Which policy applies to which code family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessConfig {
    pub rotating: FreshnessPolicy,
    pub legacy: FreshnessPolicy,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            rotating: FreshnessPolicy::ROTATING,
            legacy: FreshnessPolicy::STATIC,
        }
    }
}

impl FreshnessConfig {
    /// Overrides both maximum ages.
    #[must_use]
    pub fn with_max_ages(rotating_secs: u64, legacy_secs: u64) -> Self {
        Self {
            rotating: FreshnessPolicy::ROTATING.with_max_age(rotating_secs),
            legacy: FreshnessPolicy::STATIC.with_max_age(legacy_secs),
        }
    }

    #[must_use]
    pub fn policy_for(&self, kind: &CodeKind) -> FreshnessPolicy {
        match kind {
            CodeKind::Rotating { .. } => self.rotating,
            CodeKind::Legacy => self.legacy,
        }
    }

    /// Applies the kind's policy to decoded claims.
    ///
    /// # Errors
    ///
    /// [`Expired`] when the code is past its maximum age.
    pub fn check(&self, claims: &CodeClaims, now: Timestamp) -> Result<(), Expired> {
        let policy = self.policy_for(&claims.kind);
        if policy.is_expired(claims.issued_at, now) {
            return Err(Expired {
                issued_at: claims.issued_at,
                age: now.saturating_sub(claims.issued_at),
                max_age: policy.max_age_secs,
                policy: policy.name,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Nonce, ScopeId, TicketId};

    fn claims(kind: CodeKind, issued_at: Timestamp) -> CodeClaims {
        CodeClaims {
            ticket_id: TicketId(1),
            scope_id: ScopeId::new("e").unwrap(),
            issued_at,
            kind,
        }
    }

    fn rotating() -> CodeKind {
        CodeKind::Rotating {
            nonce: Nonce::new("n").unwrap(),
        }
    }

    #[test]
    fn test_rotating_boundary() {
        let t = 1_000;
        assert!(!is_expired(t, 30, t + 30));
        assert!(is_expired(t, 30, t + 31));
    }

    #[test]
    fn test_static_boundary() {
        let t = 1_000;
        assert!(!is_expired(t, 86_400, t + 86_400));
        assert!(is_expired(t, 86_400, t + 86_401));
    }

    #[test]
    fn test_future_dated_code_is_not_expired() {
        assert!(!is_expired(2_000, 30, 1_000));
    }

    #[test]
    fn test_policy_selected_by_kind() {
        let config = FreshnessConfig::default();
        assert_eq!(config.policy_for(&rotating()), FreshnessPolicy::ROTATING);
        assert_eq!(config.policy_for(&CodeKind::Legacy), FreshnessPolicy::STATIC);
    }

    #[test]
    fn test_check_reports_age() {
        let config = FreshnessConfig::default();
        assert!(config.check(&claims(rotating(), 100), 130).is_ok());

        let err = config.check(&claims(rotating(), 100), 131).unwrap_err();
        assert_eq!(err.age, 31);
        assert_eq!(err.max_age, 30);
        assert_eq!(err.policy, "rotating");

        // A 31s-old legacy code is still fine.
        assert!(config.check(&claims(CodeKind::Legacy, 100), 131).is_ok());
    }

    #[test]
    fn test_overridden_ages() {
        let config = FreshnessConfig::with_max_ages(5, 60);
        assert!(config.check(&claims(rotating(), 0), 6).is_err());
        assert!(config.check(&claims(CodeKind::Legacy, 0), 60).is_ok());
        assert_eq!(config.rotating.name, "rotating");
    }
}
