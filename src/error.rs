use crate::domain::account::AccountNumber;
use crate::domain::transaction::TransactionKind;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure modes of the ledger.
///
/// Validation failures (`InvalidAmount` through `InvalidRecordShape`) never
/// leave a partial mutation behind. `StorageError` aborts the current unit of
/// work; nothing it staged is applied.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountNumber,
        balance: Decimal,
        requested: Decimal,
    },
    #[error("Cannot transfer from account {0} to itself")]
    SameAccountTransfer(AccountNumber),
    #[error("Account {0} already exists")]
    DuplicateAccount(AccountNumber),
    #[error("{0:?} record has an invalid sender/receiver combination")]
    InvalidRecordShape(TransactionKind),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Storage error: {0}")]
    StorageError(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

/// Fieldless view of [`LedgerError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    AccountNotFound,
    InsufficientFunds,
    SameAccountTransfer,
    DuplicateAccount,
    InvalidRecordShape,
    Storage,
    Input,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            LedgerError::AccountNotFound(_) => ErrorKind::AccountNotFound,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::SameAccountTransfer(_) => ErrorKind::SameAccountTransfer,
            LedgerError::DuplicateAccount(_) => ErrorKind::DuplicateAccount,
            LedgerError::InvalidRecordShape(_) => ErrorKind::InvalidRecordShape,
            LedgerError::StorageError(_) => ErrorKind::Storage,
            LedgerError::InvalidOperation(_)
            | LedgerError::CsvError(_)
            | LedgerError::IoError(_)
            | LedgerError::ConfigError(_) => ErrorKind::Input,
        }
    }

    pub(crate) fn storage(message: impl Into<String>) -> Self {
        LedgerError::StorageError(Box::new(std::io::Error::other(message.into())))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::StorageError(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::StorageError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
