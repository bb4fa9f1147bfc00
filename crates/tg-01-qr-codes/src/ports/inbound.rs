//! # Inbound Ports (Driving Ports / API)

use crate::domain::codec::encode;
use shared_types::{ScopeId, TicketId, VerificationCode};

/// Minting API for ticket displays.
///
/// Implementations hold the signing secret, so they must only run in a
/// trusted server or edge process.
pub trait CodeIssuanceApi: Send + Sync {
    /// Mints a rotating code stamped with the current time and a fresh nonce.
    fn mint_rotating(&self, ticket_id: TicketId, scope_id: &ScopeId) -> VerificationCode;

    /// Mints a nonce-less legacy code for printed tickets.
    fn mint_static(&self, ticket_id: TicketId, scope_id: &ScopeId) -> VerificationCode;

    /// QR text of a fresh rotating code.
    fn generate_code(&self, ticket_id: TicketId, scope_id: &ScopeId) -> String {
        encode(&self.mint_rotating(ticket_id, scope_id))
    }

    /// QR text of a static code, valid for the legacy policy's window.
    fn generate_static_code(&self, ticket_id: TicketId, scope_id: &ScopeId) -> String {
        encode(&self.mint_static(ticket_id, scope_id))
    }
}
