use crate::domain::account::{Account, AccountNumber};
use crate::domain::ports::{LedgerStore, PendingWrites};
use crate::domain::transaction::{RecordId, TransactionRecord};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct LedgerState {
    accounts: BTreeMap<AccountNumber, Account>,
    transactions: Vec<TransactionRecord>,
    next_record_id: RecordId,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            accounts: BTreeMap::new(),
            transactions: Vec::new(),
            next_record_id: 1,
        }
    }
}

/// A thread-safe in-memory ledger store.
///
/// Accounts and records live behind one `Arc<RwLock<_>>`; a commit holds the
/// write lock for its whole batch, which is what makes it atomic. Nothing
/// survives the process, so this is meant for tests and dry runs.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn open_account(&self, account: Account) -> Result<()> {
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&account.account_number) {
            return Err(LedgerError::DuplicateAccount(account.account_number));
        }
        state.accounts.insert(account.account_number, account);
        Ok(())
    }

    async fn get_account(&self, account: AccountNumber) -> Result<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&account).cloned())
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.values().cloned().collect())
    }

    async fn transactions(&self) -> Result<Vec<TransactionRecord>> {
        let state = self.state.read().await;
        Ok(state.transactions.clone())
    }

    async fn commit(&self, writes: PendingWrites) -> Result<Vec<TransactionRecord>> {
        let mut state = self.state.write().await;

        // Validate every target before touching anything.
        if let Some((missing, _)) = writes
            .balances()
            .find(|(account, _)| !state.accounts.contains_key(account))
        {
            return Err(LedgerError::AccountNotFound(missing));
        }

        for (account, balance) in writes.balances() {
            if let Some(entry) = state.accounts.get_mut(&account) {
                entry.balance = balance;
            }
        }

        let created_at = Utc::now();
        let mut committed = Vec::with_capacity(writes.records().len());
        for record in writes.into_records() {
            let id = state.next_record_id;
            state.next_record_id += 1;
            let record = record.into_record(id, created_at);
            state.transactions.push(record.clone());
            committed.push(record);
        }

        Ok(committed)
    }
}
