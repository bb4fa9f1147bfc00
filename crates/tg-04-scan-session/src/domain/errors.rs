//! # Scan Session Errors

use thiserror::Error;

/// Camera/input-source failure. Logged; never ends the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("input source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session loop has exited.
    #[error("scan session is closed")]
    Closed,
}
