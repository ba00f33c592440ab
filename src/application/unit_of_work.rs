use super::locks::{AccountGuard, AccountLocks};
use crate::domain::account::{Account, AccountNumber, Balance};
use crate::domain::ports::{PendingWrites, SharedLedgerStore};
use crate::domain::transaction::{NewTransaction, TransactionRecord};
use crate::error::{LedgerError, Result};

/// A scoped ledger transaction.
///
/// Holds the critical sections of the accounts it was opened for and buffers
/// every write. `commit` hands the buffer to the store in one atomic call;
/// any other way out (an early `?`, `rollback`, a panic) drops the buffer
/// unapplied. The account locks are released in every case when the unit is
/// dropped.
pub struct UnitOfWork {
    store: SharedLedgerStore,
    accounts: Vec<AccountNumber>,
    writes: PendingWrites,
    committed: bool,
    _guards: Vec<AccountGuard>,
}

impl UnitOfWork {
    /// Opens a unit over `accounts`, waiting for their critical sections.
    pub async fn begin(
        store: SharedLedgerStore,
        locks: &AccountLocks,
        accounts: &[AccountNumber],
    ) -> Self {
        let guards = locks.acquire(accounts).await;
        tracing::trace!(?accounts, "Unit of work started");
        Self {
            store,
            accounts: accounts.to_vec(),
            writes: PendingWrites::new(),
            committed: false,
            _guards: guards,
        }
    }

    /// Reads an account as this unit sees it, staged balance included.
    pub async fn account(&self, account_number: AccountNumber) -> Result<Account> {
        debug_assert!(
            self.accounts.contains(&account_number),
            "account {} read outside its critical section",
            account_number
        );
        let mut account = self
            .store
            .get_account(account_number)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_number))?;
        if let Some(balance) = self.writes.staged_balance(account_number) {
            account.balance = balance;
        }
        Ok(account)
    }

    pub fn update_balance(&mut self, account_number: AccountNumber, balance: Balance) {
        self.writes.update_balance(account_number, balance);
    }

    pub fn append_transaction(&mut self, record: NewTransaction) {
        self.writes.append_transaction(record);
    }

    /// Applies every staged write atomically and returns the committed records.
    pub async fn commit(mut self) -> Result<Vec<TransactionRecord>> {
        let writes = std::mem::take(&mut self.writes);
        let records = self.store.commit(writes).await?;
        self.committed = true;
        Ok(records)
    }

    /// Discards staged writes and releases the locks.
    pub fn rollback(self) {}
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(accounts = ?self.accounts, "Unit of work rolled back");
        }
    }
}
