//! # QR Code Errors

use thiserror::Error;

/// Why a raw QR payload could not be turned into a `VerificationCode`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The text is not a JSON object.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A required field is absent (or null).
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Wire name of the field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The payload declares a version this build does not understand.
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u64),
}

/// Errors building a signing secret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    /// Secret shorter than the minimum key length.
    #[error("signing secret is {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    /// Secret text is not valid hex.
    #[error("signing secret is not valid hex: {0}")]
    InvalidHex(String),

    /// The keyed MAC rejected the key.
    #[error("signing secret rejected: {0}")]
    Rejected(String),
}
