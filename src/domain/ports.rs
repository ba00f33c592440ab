use super::account::{Account, AccountNumber, Balance};
use super::transaction::{NewTransaction, RecordId, TransactionRecord};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Writes staged by one unit of work, applied by [`LedgerStore::commit`]
/// all together or not at all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PendingWrites {
    balances: BTreeMap<AccountNumber, Balance>,
    records: Vec<NewTransaction>,
}

impl PendingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a new balance. A later call for the same account replaces it.
    pub fn update_balance(&mut self, account: AccountNumber, balance: Balance) {
        self.balances.insert(account, balance);
    }

    pub fn append_transaction(&mut self, record: NewTransaction) {
        self.records.push(record);
    }

    pub fn staged_balance(&self, account: AccountNumber) -> Option<Balance> {
        self.balances.get(&account).copied()
    }

    pub fn balances(&self) -> impl Iterator<Item = (AccountNumber, Balance)> + '_ {
        self.balances.iter().map(|(account, balance)| (*account, *balance))
    }

    pub fn records(&self) -> &[NewTransaction] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NewTransaction> {
        self.records
    }
}

/// Durable storage for accounts and their transaction history.
///
/// Record ids and timestamps are assigned by the implementation inside
/// `commit`, so callers never pick them. Every write must be durable when the
/// call returns.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Creates whatever the medium needs if it is absent. Idempotent.
    async fn initialize(&self) -> Result<()>;

    async fn open_account(&self, account: Account) -> Result<()>;

    async fn get_account(&self, account: AccountNumber) -> Result<Option<Account>>;

    /// All accounts, ordered by account number.
    async fn accounts(&self) -> Result<Vec<Account>>;

    /// All committed records, ordered by id.
    async fn transactions(&self) -> Result<Vec<TransactionRecord>>;

    /// Atomically applies staged writes and returns the committed records in
    /// staging order. Fails with `AccountNotFound` if a staged balance targets
    /// an unknown account, in which case nothing is written.
    async fn commit(&self, writes: PendingWrites) -> Result<Vec<TransactionRecord>>;

    async fn update_balance(&self, account: AccountNumber, balance: Balance) -> Result<()> {
        let mut writes = PendingWrites::new();
        writes.update_balance(account, balance);
        self.commit(writes).await?;
        Ok(())
    }

    async fn append_transaction(&self, record: NewTransaction) -> Result<RecordId> {
        let mut writes = PendingWrites::new();
        writes.append_transaction(record);
        self.commit(writes)
            .await?
            .first()
            .map(|record| record.id)
            .ok_or_else(|| LedgerError::storage("Commit returned no record"))
    }
}

/// Store handle shared by the repository, the recorder and the engine.
pub type SharedLedgerStore = Arc<dyn LedgerStore>;
