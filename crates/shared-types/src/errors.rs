//! # Error Types
//!
//! Construction errors for the identifier newtypes.

use thiserror::Error;

/// Errors raised when building a [`crate::ScopeId`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScopeIdError {
    /// Scope identifier is empty.
    #[error("scope id is empty")]
    Empty,

    /// Scope identifier exceeds the maximum length.
    #[error("scope id is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// Scope identifier contains the canonical-message delimiter or a
    /// non-printable character.
    #[error("scope id contains forbidden character {0:?}")]
    ForbiddenCharacter(char),
}

/// Errors raised when building a [`crate::Nonce`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NonceError {
    /// Nonce is empty.
    #[error("nonce is empty")]
    Empty,

    /// Nonce exceeds the maximum length.
    #[error("nonce is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// Nonce contains a character outside printable ASCII, or the delimiter.
    #[error("nonce contains forbidden character {0:?}")]
    ForbiddenCharacter(char),
}

/// Errors raised when parsing a [`crate::TicketId`] from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketIdError {
    /// The text is not a non-negative decimal integer.
    #[error("ticket id {0:?} is not a non-negative integer")]
    NotAnInteger(String),
}
