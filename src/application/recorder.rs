use super::unit_of_work::UnitOfWork;
use crate::domain::account::{AccountNumber, Amount};
use crate::domain::ports::SharedLedgerStore;
use crate::domain::transaction::{NewTransaction, TransactionKind, TransactionRecord};
use crate::error::Result;

/// Append-only writer of the audit log.
///
/// Records are staged in a [`UnitOfWork`] and receive their id and timestamp
/// from the store when the unit commits. Nothing here updates or removes a
/// committed record.
pub struct TransactionRecorder {
    store: SharedLedgerStore,
}

impl TransactionRecorder {
    pub fn new(store: SharedLedgerStore) -> Self {
        Self { store }
    }

    /// Validates the sender/receiver shape for `kind` and stages the record.
    /// The record id is assigned by the store and returned from
    /// [`UnitOfWork::commit`].
    pub fn record(
        &self,
        uow: &mut UnitOfWork,
        kind: TransactionKind,
        sender: Option<AccountNumber>,
        receiver: Option<AccountNumber>,
        amount: Amount,
    ) -> Result<()> {
        let record = NewTransaction::new(kind, sender, receiver, amount)?;
        uow.append_transaction(record);
        Ok(())
    }

    /// Every committed record, oldest first.
    pub async fn history(&self) -> Result<Vec<TransactionRecord>> {
        self.store.transactions().await
    }
}
