//! # Outbound Ports (Driven Ports / SPI)
//!
//! Production: a remote table or `RocksDbRecordStore`.
//! Testing: `InMemoryRecordStore`.

use crate::domain::entities::ConditionalWrite;
use crate::domain::errors::StoreError;
use async_trait::async_trait;
use shared_types::{LedgerKey, OwnerRef, TicketRedemptionRecord, Timestamp};
use std::sync::Arc;

/// Durable record store with per-key conditional writes.
///
/// ## Atomicity
///
/// `insert`, `conditional_mark_used` and `update_owner` must each be
/// linearizable per key: the condition check and the write happen as one
/// step, as with `UPDATE … WHERE is_used = false`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch(&self, key: &LedgerKey) -> Result<Option<TicketRedemptionRecord>, StoreError>;

    /// Insert if absent. `Rejected` carries the existing record.
    async fn insert(&self, record: TicketRedemptionRecord) -> Result<ConditionalWrite, StoreError>;

    /// Set `is_used = true, used_at` where `is_used = false`.
    async fn conditional_mark_used(
        &self,
        key: &LedgerKey,
        used_at: Timestamp,
    ) -> Result<ConditionalWrite, StoreError>;

    /// Set `owner_ref` where `is_used = false`.
    async fn update_owner(
        &self,
        key: &LedgerKey,
        owner: OwnerRef,
    ) -> Result<ConditionalWrite, StoreError>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn fetch(&self, key: &LedgerKey) -> Result<Option<TicketRedemptionRecord>, StoreError> {
        (**self).fetch(key).await
    }

    async fn insert(&self, record: TicketRedemptionRecord) -> Result<ConditionalWrite, StoreError> {
        (**self).insert(record).await
    }

    async fn conditional_mark_used(
        &self,
        key: &LedgerKey,
        used_at: Timestamp,
    ) -> Result<ConditionalWrite, StoreError> {
        (**self).conditional_mark_used(key, used_at).await
    }

    async fn update_owner(
        &self,
        key: &LedgerKey,
        owner: OwnerRef,
    ) -> Result<ConditionalWrite, StoreError> {
        (**self).update_owner(key, owner).await
    }
}
