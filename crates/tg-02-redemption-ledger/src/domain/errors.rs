//! # Ledger Errors

use shared_types::{LedgerKey, Timestamp};
use thiserror::Error;

/// Failure reported by a record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Store unreachable or timed out. Worth retrying.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored bytes could not be read back as a record.
    #[error("corrupt record under {key}: {message}")]
    Corrupt { key: String, message: String },

    /// Any other I/O failure.
    #[error("store I/O error: {0}")]
    Io(String),
}

impl StoreError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors from lookups and ticket registration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no ledger record for ticket {0}")]
    NotFound(LedgerKey),

    #[error("ticket {0} is already registered")]
    DuplicateTicket(LedgerKey),

    #[error("ledger storage error: {message}")]
    Storage { message: String, retryable: bool },
}

/// Errors from state-changing operations on an existing ticket.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RedemptionError {
    /// Someone else (or an earlier scan) already redeemed the ticket.
    #[error("ticket already redeemed at {used_at:?}")]
    AlreadyUsed { used_at: Option<Timestamp> },

    #[error("no ledger record for ticket {0}")]
    NotFound(LedgerKey),

    #[error("ledger storage error: {message}")]
    Storage { message: String, retryable: bool },
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Storage {
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for RedemptionError {
    fn from(err: StoreError) -> Self {
        Self::Storage {
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}
