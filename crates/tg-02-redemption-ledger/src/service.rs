//! # Ledger Client
//!
//! Implements `RedemptionLedger` over any `RecordStore`, translating
//! conditional-write outcomes into redemption outcomes.

use crate::domain::entities::{ConditionalWrite, RedemptionReceipt};
use crate::domain::errors::{LedgerError, RedemptionError};
use crate::ports::inbound::RedemptionLedger;
use crate::ports::outbound::RecordStore;
use async_trait::async_trait;
use shared_types::{LedgerKey, OwnerRef, ScopeId, TicketId, TicketRedemptionRecord, Timestamp};
use tracing::{debug, info, warn};

pub struct LedgerClient<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> LedgerClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: RecordStore> RedemptionLedger for LedgerClient<S> {
    async fn lookup(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
    ) -> Result<TicketRedemptionRecord, LedgerError> {
        let key = LedgerKey::new(ticket_id, scope_id.clone());
        match self.store.fetch(&key).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                debug!(key = %key, "Ledger lookup found no record");
                Err(LedgerError::NotFound(key))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Ledger lookup failed");
                Err(e.into())
            }
        }
    }

    async fn mark_used(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        used_at: Timestamp,
    ) -> Result<RedemptionReceipt, RedemptionError> {
        let key = LedgerKey::new(ticket_id, scope_id.clone());
        let outcome = self.store.conditional_mark_used(&key, used_at).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redemption write failed");
            RedemptionError::from(e)
        })?;

        match outcome {
            ConditionalWrite::Applied(record) => {
                info!(key = %key, used_at, "Ticket redeemed");
                Ok(RedemptionReceipt::from_record(record, used_at))
            }
            ConditionalWrite::Rejected(current) => {
                warn!(
                    key = %key,
                    first_used_at = ?current.used_at,
                    "Redemption refused, ticket already used"
                );
                Err(RedemptionError::AlreadyUsed {
                    used_at: current.used_at,
                })
            }
            ConditionalWrite::Missing => Err(RedemptionError::NotFound(key)),
        }
    }

    async fn register_ticket(&self, record: TicketRedemptionRecord) -> Result<(), LedgerError> {
        let key = record.key();
        match self.store.insert(record).await? {
            ConditionalWrite::Applied(_) => {
                debug!(key = %key, "Ticket registered");
                Ok(())
            }
            ConditionalWrite::Rejected(_) | ConditionalWrite::Missing => {
                Err(LedgerError::DuplicateTicket(key))
            }
        }
    }

    async fn transfer_owner(
        &self,
        ticket_id: TicketId,
        scope_id: &ScopeId,
        new_owner: OwnerRef,
    ) -> Result<TicketRedemptionRecord, RedemptionError> {
        let key = LedgerKey::new(ticket_id, scope_id.clone());
        match self.store.update_owner(&key, new_owner).await? {
            ConditionalWrite::Applied(record) => {
                info!(key = %key, owner = ?record.owner_ref, "Ticket transferred");
                Ok(record)
            }
            ConditionalWrite::Rejected(current) => Err(RedemptionError::AlreadyUsed {
                used_at: current.used_at,
            }),
            ConditionalWrite::Missing => Err(RedemptionError::NotFound(key)),
        }
    }
}
