//! # Event Bus Adapter
//!
//! Announces minted codes on the shared bus.
//!
//! ```text
//! Ticket display ──generate──→ [QR Codes (1)] ──CodeIssued──→ [Event Bus]
//! ```
//!
//! Only ticket, scope, time and kind are published. The signature and
//! nonce stay with the display.

use crate::domain::codec::encode;
use crate::ports::inbound::CodeIssuanceApi;
use shared_bus::{EventPublisher, GateEvent};
use shared_types::{ScopeId, TicketId, VerificationCode};
use std::sync::Arc;
use tracing::debug;

/// Wires an issuer to the event bus.
pub struct IssuanceBusAdapter<S, P>
where
    S: CodeIssuanceApi,
    P: EventPublisher,
{
    service: Arc<S>,
    publisher: Arc<P>,
}

impl<S, P> IssuanceBusAdapter<S, P>
where
    S: CodeIssuanceApi,
    P: EventPublisher,
{
    pub fn new(service: Arc<S>, publisher: Arc<P>) -> Self {
        Self { service, publisher }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Mints a rotating code, announces it, returns the QR text.
    pub async fn generate_code(&self, ticket_id: TicketId, scope_id: &ScopeId) -> String {
        let code = self.service.mint_rotating(ticket_id, scope_id);
        self.announce(&code).await;
        encode(&code)
    }

    /// Mints a static code, announces it, returns the QR text.
    pub async fn generate_static_code(&self, ticket_id: TicketId, scope_id: &ScopeId) -> String {
        let code = self.service.mint_static(ticket_id, scope_id);
        self.announce(&code).await;
        encode(&code)
    }

    async fn announce(&self, code: &VerificationCode) -> usize {
        let receivers = self
            .publisher
            .publish(GateEvent::CodeIssued {
                ticket_id: code.ticket_id(),
                scope_id: code.scope_id().clone(),
                issued_at: code.issued_at(),
                kind: code.kind().label().to_string(),
            })
            .await;
        debug!(ticket_id = %code.ticket_id(), receivers, "Published CodeIssued");
        receivers
    }
}
