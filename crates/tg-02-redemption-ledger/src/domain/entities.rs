//! # Ledger Entities

use shared_types::{OwnerRef, ScopeId, TicketId, TicketRedemptionRecord, Timestamp};

/// Outcome of a conditional store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalWrite {
    /// The condition held; carries the record as written.
    Applied(TicketRedemptionRecord),
    /// The condition failed; carries the record as it currently is.
    Rejected(TicketRedemptionRecord),
    /// No record under the key.
    Missing,
}

/// Proof of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionReceipt {
    pub ticket_id: TicketId,
    pub scope_id: ScopeId,
    pub used_at: Timestamp,
    pub owner_ref: Option<OwnerRef>,
}

impl RedemptionReceipt {
    /// Receipt for a record that was just marked used.
    ///
    /// Falls back to `requested_at` if the store did not echo a time.
    #[must_use]
    pub fn from_record(record: TicketRedemptionRecord, requested_at: Timestamp) -> Self {
        Self {
            ticket_id: record.ticket_id,
            scope_id: record.scope_id,
            used_at: record.used_at.unwrap_or(requested_at),
            owner_ref: record.owner_ref,
        }
    }
}
