//! # RocksDB Record Store
//!
//! Durable local ledger for door deployments that cannot reach a remote
//! store. Records are bincode-encoded under `scope:ticket` keys.
//!
//! RocksDB has no conditional put, so every read-modify-write runs under
//! one store-wide mutex. Plain reads do not take it.

use crate::domain::entities::ConditionalWrite;
use crate::domain::errors::StoreError;
use crate::domain::rules;
use crate::ports::outbound::RecordStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use rocksdb::{Options, WriteOptions, DB};
use shared_types::{LedgerKey, OwnerRef, TicketRedemptionRecord, Timestamp};
use std::path::Path;

/// RocksDB tuning for the ledger.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 32MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// fsync after each write (default: true)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/ledger".to_string(),
            block_cache_size: 32 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Small buffers, no fsync.
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

pub struct RocksDbRecordStore {
    db: DB,
    write_lock: Mutex<()>,
    config: RocksDbConfig,
}

impl RocksDbRecordStore {
    /// Opens or creates the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| StoreError::Io(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
            config,
        })
    }

    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }

    fn read(&self, key: &LedgerKey) -> Result<Option<TicketRedemptionRecord>, StoreError> {
        let Some(bytes) = self
            .db
            .get(key.storage_key())
            .map_err(|e| StoreError::Io(format!("RocksDB get failed: {e}")))?
        else {
            return Ok(None);
        };
        bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn write(&self, record: &TicketRedemptionRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(|e| StoreError::Corrupt {
            key: record.key().to_string(),
            message: e.to_string(),
        })?;
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .put_opt(record.key().storage_key(), bytes, &write_opts)
            .map_err(|e| StoreError::Io(format!("RocksDB put failed: {e}")))
    }

    fn update<F>(&self, key: &LedgerKey, apply: F) -> Result<ConditionalWrite, StoreError>
    where
        F: FnOnce(&mut TicketRedemptionRecord) -> ConditionalWrite,
    {
        let _guard = self.write_lock.lock();
        let Some(mut record) = self.read(key)? else {
            return Ok(ConditionalWrite::Missing);
        };
        let outcome = apply(&mut record);
        if let ConditionalWrite::Applied(ref written) = outcome {
            self.write(written)?;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RecordStore for RocksDbRecordStore {
    async fn fetch(&self, key: &LedgerKey) -> Result<Option<TicketRedemptionRecord>, StoreError> {
        self.read(key)
    }

    async fn insert(&self, record: TicketRedemptionRecord) -> Result<ConditionalWrite, StoreError> {
        let _guard = self.write_lock.lock();
        if let Some(existing) = self.read(&record.key())? {
            return Ok(ConditionalWrite::Rejected(existing));
        }
        self.write(&record)?;
        Ok(ConditionalWrite::Applied(record))
    }

    async fn conditional_mark_used(
        &self,
        key: &LedgerKey,
        used_at: Timestamp,
    ) -> Result<ConditionalWrite, StoreError> {
        self.update(key, |record| rules::mark_used(record, used_at))
    }

    async fn update_owner(
        &self,
        key: &LedgerKey,
        owner: OwnerRef,
    ) -> Result<ConditionalWrite, StoreError> {
        self.update(key, |record| rules::change_owner(record, owner))
    }
}
