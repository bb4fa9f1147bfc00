//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::RedemptionReceipt;
use crate::domain::errors::{LedgerError, RedemptionError};
use async_trait::async_trait;
use shared_types::{OwnerRef, ScopeId, TicketId, TicketRedemptionRecord, Timestamp};
use std::sync::Arc;

/// Authoritative redemption state of tickets.
#[async_trait]
pub trait RedemptionLedger: Send + Sync {
    /// Current record of a ticket.
    ///
    /// # Errors
    /// * `LedgerError::NotFound` - no such ticket in this scope
    /// * `LedgerError::Storage` - store failure
    async fn lookup(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
    ) -> Result<TicketRedemptionRecord, LedgerError>;

    /// Atomically flips `is_used` to true.
    ///
    /// Of N concurrent calls for one ticket exactly one returns `Ok`; the
    /// rest get `AlreadyUsed` with the winning time.
    ///
    /// # Errors
    /// * `RedemptionError::AlreadyUsed` - ticket was redeemed before
    /// * `RedemptionError::NotFound` - no such ticket
    /// * `RedemptionError::Storage` - store failure
    async fn mark_used(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        used_at: Timestamp,
    ) -> Result<RedemptionReceipt, RedemptionError>;

    /// Persists a newly issued ticket.
    ///
    /// # Errors
    /// * `LedgerError::DuplicateTicket` - a record already exists
    async fn register_ticket(&self, record: TicketRedemptionRecord) -> Result<(), LedgerError>;

    /// Records a resale or transfer.
    ///
    /// # Errors
    /// * `RedemptionError::AlreadyUsed` - redeemed tickets cannot change hands
    /// * `RedemptionError::NotFound` - no such ticket
    async fn transfer_owner(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        new_owner: OwnerRef,
    ) -> Result<TicketRedemptionRecord, RedemptionError>;
}

#[async_trait]
impl<L: RedemptionLedger + ?Sized> RedemptionLedger for Arc<L> {
    async fn lookup(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
    ) -> Result<TicketRedemptionRecord, LedgerError> {
        (**self).lookup(ticket_id, scope_id).await
    }

    async fn mark_used(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        used_at: Timestamp,
    ) -> Result<RedemptionReceipt, RedemptionError> {
        (**self).mark_used(ticket_id, scope_id, used_at).await
    }

    async fn register_ticket(&self, record: TicketRedemptionRecord) -> Result<(), LedgerError> {
        (**self).register_ticket(record).await
    }

    async fn transfer_owner(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        new_owner: OwnerRef,
    ) -> Result<TicketRedemptionRecord, RedemptionError> {
        (**self).transfer_owner(ticket_id, scope_id, new_owner).await
    }
}
