use crate::application::engine::Operation;
use crate::domain::account::AccountNumber;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Open,
    Deposit,
    Withdraw,
    Transfer,
}

/// One CSV line as written by the user. Which columns are required depends on
/// `type`; see [`Request::try_from`].
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRow {
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub account: AccountNumber,
    #[serde(default)]
    pub counterparty: Option<AccountNumber>,
    // Parsed from the text itself so no digit or scale goes through a float.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pin: Option<u32>,
}

/// A fully parsed request, ready for the engine.
#[derive(Debug, PartialEq, Clone)]
pub enum Request {
    Open {
        account: AccountNumber,
        pin: u32,
        name: String,
        opening_balance: Decimal,
    },
    Apply(Operation),
}

impl TryFrom<OperationRow> for Request {
    type Error = LedgerError;

    fn try_from(row: OperationRow) -> Result<Self> {
        let amount = row
            .amount
            .ok_or_else(|| missing(row.kind, "amount"))?;
        let account = row.account;

        let request = match row.kind {
            OperationType::Open => Request::Open {
                account,
                pin: row.pin.ok_or_else(|| missing(row.kind, "pin"))?,
                name: row
                    .name
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| missing(row.kind, "name"))?,
                opening_balance: amount,
            },
            OperationType::Deposit => Request::Apply(Operation::Deposit { account, amount }),
            OperationType::Withdraw => Request::Apply(Operation::Withdraw { account, amount }),
            OperationType::Transfer => Request::Apply(Operation::Transfer {
                sender: account,
                receiver: row
                    .counterparty
                    .ok_or_else(|| missing(row.kind, "counterparty"))?,
                amount,
            }),
        };
        Ok(request)
    }
}

fn missing(kind: OperationType, field: &str) -> LedgerError {
    LedgerError::InvalidOperation(format!("{:?} requires {}", kind, field).to_lowercase())
}

/// Reads ledger requests from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing optional columns may be left out.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and validates rows.
    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.reader.into_deserialize().map(|row| {
            let row: OperationRow = row?;
            Request::try_from(row)
        })
    }
}
