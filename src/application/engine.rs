use super::accounts::AccountRepository;
use super::audit::{self, Discrepancy};
use super::locks::AccountLocks;
use super::recorder::TransactionRecorder;
use super::unit_of_work::UnitOfWork;
use crate::domain::account::{Account, AccountNumber, Amount, Balance};
use crate::domain::ports::SharedLedgerStore;
use crate::domain::transaction::{TransactionKind, TransactionRecord};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// A balance-changing request, as selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Deposit {
        account: AccountNumber,
        amount: Decimal,
    },
    Withdraw {
        account: AccountNumber,
        amount: Decimal,
    },
    Transfer {
        sender: AccountNumber,
        receiver: AccountNumber,
        amount: Decimal,
    },
}

/// The transaction engine.
///
/// Every operation runs as one [`UnitOfWork`]: it locks the accounts it
/// touches, checks preconditions, stages the balance changes together with
/// exactly one audit record and commits. A rejected operation leaves neither
/// a balance change nor a record behind. The returned `TransactionRecord` is
/// the committed audit entry.
///
/// The engine is `Send + Sync`; share it behind an `Arc` to serve concurrent
/// callers. The account locks belong to the engine, not to the store, so build
/// exactly one engine per store: two engines over the same store do not
/// serialize against each other.
pub struct LedgerEngine {
    store: SharedLedgerStore,
    accounts: AccountRepository,
    recorder: TransactionRecorder,
    locks: AccountLocks,
}

impl LedgerEngine {
    /// Creates a new `LedgerEngine` over an initialized store.
    pub fn new(store: SharedLedgerStore) -> Self {
        Self {
            accounts: AccountRepository::new(store.clone()),
            recorder: TransactionRecorder::new(store.clone()),
            locks: AccountLocks::new(),
            store,
        }
    }

    /// Opens an account. No transaction record is written for the opening
    /// balance.
    pub async fn open_account(
        &self,
        account_number: AccountNumber,
        pin: u32,
        name: &str,
        opening_balance: Decimal,
    ) -> Result<Account> {
        let account = Account::new(account_number, pin, name, Balance::new(opening_balance)?);
        self.accounts.open(account.clone()).await?;
        tracing::info!(account = account_number, balance = %opening_balance, "Account opened");
        Ok(account)
    }

    /// Dispatches an [`Operation`] to the matching method.
    pub async fn execute(&self, operation: Operation) -> Result<TransactionRecord> {
        match operation {
            Operation::Deposit { account, amount } => self.deposit(account, amount).await,
            Operation::Withdraw { account, amount } => self.withdraw(account, amount).await,
            Operation::Transfer {
                sender,
                receiver,
                amount,
            } => self.transfer(sender, receiver, amount).await,
        }
    }

    pub async fn deposit(
        &self,
        account: AccountNumber,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let amount = Amount::new(amount)?;

        let mut uow = self.begin(&[account]).await;
        let balance = self.accounts.credit(&mut uow, account, amount).await?;
        self.recorder
            .record(&mut uow, TransactionKind::Deposit, None, Some(account), amount)?;
        let record = single(uow.commit().await?)?;

        tracing::info!(record = record.id, account, %amount, %balance, "Deposit committed");
        Ok(record)
    }

    pub async fn withdraw(
        &self,
        account: AccountNumber,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let amount = Amount::new(amount)?;

        let mut uow = self.begin(&[account]).await;
        let balance = self
            .accounts
            .debit(&mut uow, account, amount)
            .await
            .inspect_err(|e| tracing::debug!(account, %amount, error = %e, "Withdrawal rejected"))?;
        self.recorder
            .record(&mut uow, TransactionKind::Withdraw, Some(account), None, amount)?;
        let record = single(uow.commit().await?)?;

        tracing::info!(record = record.id, account, %amount, %balance, "Withdrawal committed");
        Ok(record)
    }

    pub async fn transfer(
        &self,
        sender: AccountNumber,
        receiver: AccountNumber,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let amount = Amount::new(amount)?;
        if sender == receiver {
            return Err(LedgerError::SameAccountTransfer(sender));
        }

        let mut uow = self.begin(&[sender, receiver]).await;
        // Both parties must exist before the funds check.
        uow.account(sender).await?;
        uow.account(receiver).await?;

        self.accounts
            .debit(&mut uow, sender, amount)
            .await
            .inspect_err(|e| tracing::debug!(sender, receiver, %amount, error = %e, "Transfer rejected"))?;
        self.accounts.credit(&mut uow, receiver, amount).await?;
        self.recorder.record(
            &mut uow,
            TransactionKind::Transfer,
            Some(sender),
            Some(receiver),
            amount,
        )?;
        let record = single(uow.commit().await?)?;

        tracing::info!(record = record.id, sender, receiver, %amount, "Transfer committed");
        Ok(record)
    }

    pub async fn account(&self, account: AccountNumber) -> Result<Account> {
        self.accounts.get(account).await
    }

    pub async fn balance(&self, account: AccountNumber) -> Result<Balance> {
        Ok(self.accounts.get(account).await?.balance)
    }

    /// All accounts, ordered by account number.
    pub async fn accounts(&self) -> Result<Vec<Account>> {
        self.accounts.all().await
    }

    /// The full transaction log, oldest first.
    pub async fn history(&self) -> Result<Vec<TransactionRecord>> {
        self.recorder.history().await
    }

    /// Replays the transaction log against every account and reports drift.
    pub async fn reconcile(&self) -> Result<Vec<Discrepancy>> {
        audit::reconcile(self.store.as_ref()).await
    }

    async fn begin(&self, accounts: &[AccountNumber]) -> UnitOfWork {
        UnitOfWork::begin(self.store.clone(), &self.locks, accounts).await
    }
}

fn single(records: Vec<TransactionRecord>) -> Result<TransactionRecord> {
    records
        .into_iter()
        .next()
        .ok_or_else(|| LedgerError::storage("Commit returned no record"))
}
