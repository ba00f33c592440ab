use super::account::{AccountNumber, Amount};
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the store when a record is committed.
pub type RecordId = u64;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Transfer,
}

/// An audit entry that has not been committed yet.
///
/// Construction checks that the sender/receiver pair fits the kind:
/// deposits only have a receiver, withdrawals only a sender, and transfers
/// have two distinct parties.
#[derive(Debug, PartialEq, Clone)]
pub struct NewTransaction {
    kind: TransactionKind,
    sender: Option<AccountNumber>,
    receiver: Option<AccountNumber>,
    amount: Amount,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        sender: Option<AccountNumber>,
        receiver: Option<AccountNumber>,
        amount: Amount,
    ) -> Result<Self> {
        let valid = match (kind, sender, receiver) {
            (TransactionKind::Deposit, None, Some(_)) => true,
            (TransactionKind::Withdraw, Some(_), None) => true,
            (TransactionKind::Transfer, Some(from), Some(to)) => from != to,
            _ => false,
        };
        if !valid {
            return Err(LedgerError::InvalidRecordShape(kind));
        }
        Ok(Self {
            kind,
            sender,
            receiver,
            amount,
        })
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn sender(&self) -> Option<AccountNumber> {
        self.sender
    }

    pub fn receiver(&self) -> Option<AccountNumber> {
        self.receiver
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Stamps the entry with its store-assigned id and creation time.
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            id,
            sender_account_number: self.sender,
            receiver_account_number: self.receiver,
            amount: self.amount,
            kind: self.kind,
            created_at,
        }
    }
}

/// An immutable, committed audit entry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub id: RecordId,
    pub sender_account_number: Option<AccountNumber>,
    pub receiver_account_number: Option<AccountNumber>,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}
