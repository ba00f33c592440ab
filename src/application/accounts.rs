use super::unit_of_work::UnitOfWork;
use crate::domain::account::{Account, AccountNumber, Amount, Balance};
use crate::domain::ports::SharedLedgerStore;
use crate::error::{LedgerError, Result};

/// Typed access to account state.
///
/// `credit` and `debit` stage their result in a [`UnitOfWork`]; the unit must
/// hold the account's critical section, which makes the funds check and the
/// balance write a single step for concurrent callers.
pub struct AccountRepository {
    store: SharedLedgerStore,
}

impl AccountRepository {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self { store }
    }

    pub async fn open(&self, account: Account) -> Result<()> {
        self.store.open_account(account).await
    }

    pub async fn get(&self, account_number: AccountNumber) -> Result<Account> {
        self.store
            .get_account(account_number)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_number))
    }

    pub async fn all(&self) -> Result<Vec<Account>> {
        self.store.accounts().await
    }

    /// Stages `balance + amount` and returns the new balance.
    pub async fn credit(
        &self,
        uow: &mut UnitOfWork,
        account_number: AccountNumber,
        amount: Amount,
    ) -> Result<Balance> {
        let mut account = uow.account(account_number).await?;
        account.credit(amount)?;
        uow.update_balance(account_number, account.balance);
        Ok(account.balance)
    }

    /// Stages `balance - amount` and returns the new balance, or fails with
    /// `InsufficientFunds` without staging anything.
    pub async fn debit(
        &self,
        uow: &mut UnitOfWork,
        account_number: AccountNumber,
        amount: Amount,
    ) -> Result<Balance> {
        let mut account = uow.account(account_number).await?;
        account.debit(amount)?;
        uow.update_balance(account_number, account.balance);
        Ok(account.balance)
    }
}
