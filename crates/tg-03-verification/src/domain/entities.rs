//! # Verification Entities

use crate::domain::errors::PolicyParseError;
use shared_types::{ContractRef, ErrorKind, OwnerRef, OwnershipCheck, ScopeId, TicketId, Timestamp};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tg_01_qr_codes::FreshnessConfig;

/// Whether, and how strictly, the chain is consulted during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipCheckMode {
    /// Ledger-only verdicts.
    #[default]
    Disabled,
    /// Check after redemption; outcome is recorded but never changes the verdict.
    Advisory,
    /// Check before redemption; an unreachable oracle or an invalid ticket rejects.
    Required,
}

impl OwnershipCheckMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Advisory => "advisory",
            Self::Required => "required",
        }
    }
}

impl fmt::Display for OwnershipCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnershipCheckMode {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(Self::Disabled),
            "advisory" => Ok(Self::Advisory),
            "required" | "fail-closed" | "fail_closed" => Ok(Self::Required),
            other => Err(PolicyParseError::UnknownMode(other.to_string())),
        }
    }
}

/// Tunables of the verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    pub freshness: FreshnessConfig,
    pub ownership_mode: OwnershipCheckMode,
    /// Upper bound on each individual oracle call.
    pub oracle_timeout: Duration,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            freshness: FreshnessConfig::default(),
            ownership_mode: OwnershipCheckMode::Disabled,
            oracle_timeout: Duration::from_millis(1_500),
        }
    }
}

/// Which on-chain contract backs each scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeDirectory {
    contracts: HashMap<ScopeId, ContractRef>,
}

impl ScopeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_contract(mut self, scope: ScopeId, contract: ContractRef) -> Self {
        self.contracts.insert(scope, contract);
        self
    }

    pub fn contract_for(&self, scope: &ScopeId) -> Option<&ContractRef> {
        self.contracts.get(scope)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl FromIterator<(ScopeId, ContractRef)> for ScopeDirectory {
    fn from_iter<I: IntoIterator<Item = (ScopeId, ContractRef)>>(iter: I) -> Self {
        Self {
            contracts: iter.into_iter().collect(),
        }
    }
}

/// What the pipeline tells the rest of the system after a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationNotice {
    Redeemed {
        ticket_id: TicketId,
        scope_id: ScopeId,
        owner_ref: Option<OwnerRef>,
        used_at: Timestamp,
    },
    Rejected {
        ticket_id: Option<TicketId>,
        scope_id: Option<ScopeId>,
        kind: ErrorKind,
        detail: String,
    },
    Forgery {
        ticket_id: TicketId,
        scope_id: ScopeId,
    },
    OwnershipDisagreement {
        ticket_id: TicketId,
        scope_id: ScopeId,
        check: OwnershipCheck,
    },
}
