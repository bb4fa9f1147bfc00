//! # Code Codec
//!
//! JSON wire format of the QR payload:
//!
//! ```json
//! {"v":1,"ticketId":"42","eventId":"event-7","timestamp":1700000000,"nonce":"…","signature":"<hex>"}
//! ```
//!
//! Decoding accepts the older key names (`tokenId`, `scopeId`, `issuedAt`)
//! and payloads without `v`. A missing or empty `nonce` yields a legacy code.

use crate::domain::errors::DecodeError;
use serde_json::{json, Map, Value};
use shared_types::{
    CodeClaims, CodeKind, Nonce, ScopeId, SignatureDigest, TicketId, Timestamp, VerificationCode,
    WireVersion,
};

const KEY_VERSION: &str = "v";
const KEY_TICKET: &str = "ticketId";
const KEY_SCOPE: &str = "eventId";
const KEY_ISSUED_AT: &str = "timestamp";
const KEY_NONCE: &str = "nonce";
const KEY_SIGNATURE: &str = "signature";

const TICKET_ALIASES: &[&str] = &[KEY_TICKET, "tokenId"];
const SCOPE_ALIASES: &[&str] = &[KEY_SCOPE, "scopeId"];
const ISSUED_AT_ALIASES: &[&str] = &[KEY_ISSUED_AT, "issuedAt"];

/// Serializes a code to its QR text.
#[must_use]
pub fn encode(code: &VerificationCode) -> String {
    let mut object = Map::new();
    if let Some(tag) = code.version.tag() {
        object.insert(KEY_VERSION.into(), json!(tag));
    }
    object.insert(KEY_TICKET.into(), json!(code.ticket_id().to_string()));
    object.insert(KEY_SCOPE.into(), json!(code.scope_id().as_str()));
    object.insert(KEY_ISSUED_AT.into(), json!(code.issued_at()));
    if let Some(nonce) = code.kind().nonce() {
        object.insert(KEY_NONCE.into(), json!(nonce.as_str()));
    }
    object.insert(KEY_SIGNATURE.into(), json!(hex::encode(code.signature)));
    Value::Object(object).to_string()
}

/// Parses QR text into a code. Does not check the signature or freshness.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode(raw: &str) -> Result<VerificationCode, DecodeError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(DecodeError::MalformedPayload(
            "payload is not a JSON object".into(),
        ));
    };

    let version = decode_version(&object)?;
    let ticket_id = decode_ticket_id(required(&object, TICKET_ALIASES)?)?;
    let scope_id = decode_scope_id(required(&object, SCOPE_ALIASES)?)?;
    let issued_at = decode_issued_at(required(&object, ISSUED_AT_ALIASES)?)?;
    let kind = decode_kind(object.get(KEY_NONCE))?;
    let signature = decode_signature(required(&object, &[KEY_SIGNATURE])?)?;

    Ok(VerificationCode {
        version,
        claims: CodeClaims {
            ticket_id,
            scope_id,
            issued_at,
            kind,
        },
        signature,
    })
}

/// First non-null value under any of `aliases`; reports the canonical name when absent.
fn required<'a>(
    object: &'a Map<String, Value>,
    aliases: &[&'static str],
) -> Result<&'a Value, DecodeError> {
    aliases
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|v| !v.is_null())
        .ok_or(DecodeError::MissingField(aliases[0]))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn decode_version(object: &Map<String, Value>) -> Result<WireVersion, DecodeError> {
    match object.get(KEY_VERSION) {
        None | Some(Value::Null) => Ok(WireVersion::Unversioned),
        Some(Value::Number(n)) => {
            let tag = n
                .as_u64()
                .ok_or_else(|| invalid(KEY_VERSION, "not an unsigned integer"))?;
            WireVersion::from_tag(tag).ok_or(DecodeError::UnsupportedVersion(tag))
        }
        Some(_) => Err(invalid(KEY_VERSION, "not a number")),
    }
}

fn decode_ticket_id(value: &Value) -> Result<TicketId, DecodeError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(TicketId)
            .ok_or_else(|| invalid(KEY_TICKET, format!("{n} is not an unsigned integer"))),
        Value::String(s) => s.parse().map_err(|e| invalid(KEY_TICKET, format!("{e}"))),
        _ => Err(invalid(KEY_TICKET, "expected a number or decimal string")),
    }
}

fn decode_scope_id(value: &Value) -> Result<ScopeId, DecodeError> {
    match value {
        Value::String(s) => ScopeId::new(s.as_str()).map_err(|e| invalid(KEY_SCOPE, e.to_string())),
        // Numeric event ids from older issuers.
        Value::Number(n) => {
            ScopeId::new(n.to_string()).map_err(|e| invalid(KEY_SCOPE, e.to_string()))
        }
        _ => Err(invalid(KEY_SCOPE, "expected a string")),
    }
}

fn decode_issued_at(value: &Value) -> Result<Timestamp, DecodeError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| invalid(KEY_ISSUED_AT, format!("{n} is not unix seconds"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid(KEY_ISSUED_AT, format!("{s:?} is not unix seconds"))),
        _ => Err(invalid(KEY_ISSUED_AT, "expected unix seconds")),
    }
}

fn decode_kind(value: Option<&Value>) -> Result<CodeKind, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(CodeKind::Legacy),
        Some(Value::String(s)) if s.is_empty() => Ok(CodeKind::Legacy),
        Some(Value::String(s)) => Nonce::new(s.as_str())
            .map(|nonce| CodeKind::Rotating { nonce })
            .map_err(|e| invalid(KEY_NONCE, e.to_string())),
        Some(_) => Err(invalid(KEY_NONCE, "expected a string")),
    }
}

fn decode_signature(value: &Value) -> Result<SignatureDigest, DecodeError> {
    let Value::String(text) = value else {
        return Err(invalid(KEY_SIGNATURE, "expected a hex string"));
    };
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(digits).map_err(|e| invalid(KEY_SIGNATURE, e.to_string()))?;
    SignatureDigest::try_from(bytes.as_slice()).map_err(|_| {
        invalid(
            KEY_SIGNATURE,
            format!("expected 32 bytes, got {}", bytes.len()),
        )
    })
}
