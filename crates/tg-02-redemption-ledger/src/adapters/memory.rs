//! # In-Memory Record Store
//!
//! Single-process store for tests and demo deployments. Conditional writes
//! run under the map's write lock, which makes them linearizable.

use crate::domain::entities::ConditionalWrite;
use crate::domain::errors::StoreError;
use crate::domain::rules;
use crate::ports::outbound::RecordStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{LedgerKey, OwnerRef, TicketRedemptionRecord, Timestamp};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<LedgerKey, TicketRedemptionRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = TicketRedemptionRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn update<F>(&self, key: &LedgerKey, apply: F) -> ConditionalWrite
    where
        F: FnOnce(&mut TicketRedemptionRecord) -> ConditionalWrite,
    {
        let mut records = self.records.write();
        match records.get_mut(key) {
            Some(record) => apply(record),
            None => ConditionalWrite::Missing,
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch(&self, key: &LedgerKey) -> Result<Option<TicketRedemptionRecord>, StoreError> {
        Ok(self.records.read().get(key).cloned())
    }

    async fn insert(&self, record: TicketRedemptionRecord) -> Result<ConditionalWrite, StoreError> {
        let mut records = self.records.write();
        let key = record.key();
        if let Some(existing) = records.get(&key) {
            return Ok(ConditionalWrite::Rejected(existing.clone()));
        }
        records.insert(key, record.clone());
        Ok(ConditionalWrite::Applied(record))
    }

    async fn conditional_mark_used(
        &self,
        key: &LedgerKey,
        used_at: Timestamp,
    ) -> Result<ConditionalWrite, StoreError> {
        Ok(self.update(key, |record| rules::mark_used(record, used_at)))
    }

    async fn update_owner(
        &self,
        key: &LedgerKey,
        owner: OwnerRef,
    ) -> Result<ConditionalWrite, StoreError> {
        Ok(self.update(key, |record| rules::change_owner(record, owner)))
    }
}
