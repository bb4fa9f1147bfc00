//! # Event Bus Adapter
//!
//! Announces ownership transfers so ticket displays can notice that the
//! connected wallet no longer holds a ticket.

use crate::domain::errors::RedemptionError;
use crate::ports::inbound::RedemptionLedger;
use shared_bus::{EventPublisher, GateEvent};
use shared_types::{OwnerRef, ScopeId, TicketId, TicketRedemptionRecord};
use std::sync::Arc;
use tracing::debug;

pub struct LedgerBusAdapter<L, P>
where
    L: RedemptionLedger,
    P: EventPublisher,
{
    ledger: Arc<L>,
    publisher: Arc<P>,
}

impl<L, P> LedgerBusAdapter<L, P>
where
    L: RedemptionLedger,
    P: EventPublisher,
{
    pub fn new(ledger: Arc<L>, publisher: Arc<P>) -> Self {
        Self { ledger, publisher }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Transfers and publishes `TicketTransferred` on success.
    pub async fn transfer_and_publish(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        new_owner: OwnerRef,
    ) -> Result<TicketRedemptionRecord, RedemptionError> {
        let record = self
            .ledger
            .transfer_owner(ticket_id, scope_id, new_owner.clone())
            .await?;
        let receivers = self
            .publisher
            .publish(GateEvent::TicketTransferred {
                ticket_id,
                scope_id: scope_id.clone(),
                new_owner,
            })
            .await;
        debug!(ticket_id = %ticket_id, receivers, "Published TicketTransferred");
        Ok(record)
    }
}
