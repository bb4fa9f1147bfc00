//! # Code Issuance Service
//!
//! Stamps the current time and a nonce, signs with the scope's secret and
//! hands back the code.

use crate::domain::signer::{sign_claims, SigningKeyring};
use crate::ports::inbound::CodeIssuanceApi;
use crate::ports::outbound::NonceSource;
use shared_types::{
    CodeClaims, CodeKind, ScopeId, TicketId, TimeSource, VerificationCode, WireVersion,
};
use std::sync::Arc;
use tracing::debug;

/// Mints signed codes.
pub struct CodeIssuer<C: TimeSource, N: NonceSource> {
    keyring: Arc<SigningKeyring>,
    clock: C,
    nonces: N,
}

impl<C: TimeSource, N: NonceSource> CodeIssuer<C, N> {
    pub fn new(keyring: Arc<SigningKeyring>, clock: C, nonces: N) -> Self {
        Self {
            keyring,
            clock,
            nonces,
        }
    }

    fn mint(&self, ticket_id: TicketId, scope_id: &ScopeId, kind: CodeKind) -> VerificationCode {
        let claims = CodeClaims {
            ticket_id,
            scope_id: scope_id.clone(),
            issued_at: self.clock.now(),
            kind,
        };
        let signature = sign_claims(&claims, &self.keyring);
        debug!(
            ticket_id = %ticket_id,
            scope_id = %scope_id,
            issued_at = claims.issued_at,
            kind = claims.kind.label(),
            "Minted verification code"
        );
        VerificationCode {
            version: WireVersion::CURRENT,
            claims,
            signature,
        }
    }
}

impl<C: TimeSource, N: NonceSource> CodeIssuanceApi for CodeIssuer<C, N> {
    fn mint_rotating(&self, ticket_id: TicketId, scope_id: &ScopeId) -> VerificationCode {
        let nonce = self.nonces.next_nonce();
        self.mint(ticket_id, scope_id, CodeKind::Rotating { nonce })
    }

    fn mint_static(&self, ticket_id: TicketId, scope_id: &ScopeId) -> VerificationCode {
        self.mint(ticket_id, scope_id, CodeKind::Legacy)
    }
}
