//! # Verification Errors
//!
//! Pipeline failures are verdicts, not errors. Only the collaborators here
//! can fail.

use shared_types::ScopeId;
use std::time::Duration;
use thiserror::Error;

/// Failure of an ownership oracle call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("ownership oracle unreachable: {0}")]
    Unreachable(String),

    #[error("ownership oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("no contract configured for scope {0}")]
    UnknownScope(ScopeId),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyParseError {
    #[error("unknown ownership check mode `{0}` (expected disabled, advisory or required)")]
    UnknownMode(String),
}
