use crate::domain::account::{Account, AccountNumber};
use crate::domain::ports::{LedgerStore, PendingWrites};
use crate::domain::transaction::{RecordId, TransactionRecord};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch, WriteOptions};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing account states.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing the transaction log.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family for bookkeeping values such as the record id counter.
pub const CF_META: &str = "meta";

const NEXT_RECORD_ID: &[u8] = b"next_record_id";

/// A persistent ledger store backed by RocksDB.
///
/// Accounts and transaction records live in separate Column Families, keyed by
/// big-endian numbers so iteration follows account number and record id order.
/// Every commit is a single `WriteBatch` that also carries the bumped record
/// id counter, so a crash never leaves a balance without its record.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBLedgerStore {
    db: Arc<DB>,
    // Serializes writers and caches the next record id.
    writer: Arc<Mutex<RecordId>>,
    sync_writes: bool,
}

impl RocksDBLedgerStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    /// * `sync_writes` - Whether each commit waits for the WAL to reach disk.
    pub fn open<P: AsRef<Path>>(path: P, sync_writes: bool) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ACCOUNTS, CF_TRANSACTIONS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        let next_record_id = match db.get_cf(cf(&db, CF_META)?, NEXT_RECORD_ID)? {
            Some(bytes) => decode_id(&bytes)?,
            None => 1,
        };

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(next_record_id)),
            sync_writes,
        })
    }

    /// Runs a synchronous RocksDB call on the blocking pool, so WAL syncs and
    /// the writer lock never stall the async workers.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(RocksDBLedgerStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| LedgerError::storage(format!("RocksDB task failed: {}", e)))?
    }

    fn write_options(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts
    }

    fn lock_writer(&self) -> Result<std::sync::MutexGuard<'_, RecordId>> {
        self.writer
            .lock()
            .map_err(|_| LedgerError::storage("Writer lock poisoned"))
    }

    fn read<T: DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(cf(&self.db, family)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_all<T: DeserializeOwned>(&self, family: &str) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf(&self.db, family)?, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn initialize_sync(&self) -> Result<()> {
        let next_record_id = self.lock_writer()?;
        let meta = cf(&self.db, CF_META)?;
        if self.db.get_cf(meta, NEXT_RECORD_ID)?.is_none() {
            self.db.put_cf_opt(
                meta,
                NEXT_RECORD_ID,
                next_record_id.to_be_bytes(),
                &self.write_options(),
            )?;
        }
        Ok(())
    }

    fn open_account_sync(&self, account: Account) -> Result<()> {
        let _writer = self.lock_writer()?;
        let key = account.account_number.to_be_bytes();
        let accounts = cf(&self.db, CF_ACCOUNTS)?;
        if self.db.get_pinned_cf(accounts, key)?.is_some() {
            return Err(LedgerError::DuplicateAccount(account.account_number));
        }
        let value = serde_json::to_vec(&account)?;
        self.db.put_cf_opt(accounts, key, value, &self.write_options())?;
        Ok(())
    }

    fn commit_sync(&self, writes: PendingWrites) -> Result<Vec<TransactionRecord>> {
        let mut next_record_id = self.lock_writer()?;
        let mut batch = WriteBatch::default();

        let accounts = cf(&self.db, CF_ACCOUNTS)?;
        for (account_number, balance) in writes.balances() {
            let mut account: Account = self
                .read(CF_ACCOUNTS, &account_number.to_be_bytes())?
                .ok_or(LedgerError::AccountNotFound(account_number))?;
            account.balance = balance;
            batch.put_cf(accounts, account_number.to_be_bytes(), serde_json::to_vec(&account)?);
        }

        let transactions = cf(&self.db, CF_TRANSACTIONS)?;
        let created_at = Utc::now();
        let mut id = *next_record_id;
        let mut committed = Vec::with_capacity(writes.records().len());
        for record in writes.into_records() {
            let record = record.into_record(id, created_at);
            batch.put_cf(transactions, id.to_be_bytes(), serde_json::to_vec(&record)?);
            committed.push(record);
            id += 1;
        }
        batch.put_cf(cf(&self.db, CF_META)?, NEXT_RECORD_ID, id.to_be_bytes());

        self.db.write_opt(&batch, &self.write_options())?;
        // Only advance the counter once the batch is on disk.
        *next_record_id = id;

        tracing::debug!(records = committed.len(), next_record_id = id, "RocksDB batch committed");
        Ok(committed)
    }
}

fn cf<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| LedgerError::storage(format!("Column family {} not found", name)))
}

fn decode_id(bytes: &[u8]) -> Result<RecordId> {
    let bytes: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LedgerError::storage("Corrupt record id counter"))?;
    Ok(RecordId::from_be_bytes(bytes))
}

#[async_trait]
impl LedgerStore for RocksDBLedgerStore {
    async fn initialize(&self) -> Result<()> {
        self.blocking(|store| store.initialize_sync()).await
    }

    async fn open_account(&self, account: Account) -> Result<()> {
        self.blocking(move |store| store.open_account_sync(account)).await
    }

    async fn get_account(&self, account: AccountNumber) -> Result<Option<Account>> {
        self.blocking(move |store| store.read(CF_ACCOUNTS, &account.to_be_bytes()))
            .await
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        self.blocking(|store| store.read_all(CF_ACCOUNTS)).await
    }

    async fn transactions(&self) -> Result<Vec<TransactionRecord>> {
        self.blocking(|store| store.read_all(CF_TRANSACTIONS)).await
    }

    async fn commit(&self, writes: PendingWrites) -> Result<Vec<TransactionRecord>> {
        self.blocking(move |store| store.commit_sync(writes)).await
    }
}
