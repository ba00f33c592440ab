use crate::domain::account::{Account, AccountNumber};
use crate::domain::transaction::{RecordId, TransactionKind, TransactionRecord};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AccountRow<'a> {
    account: AccountNumber,
    name: &'a str,
    balance: Decimal,
}

#[derive(Serialize)]
struct HistoryRow {
    id: RecordId,
    #[serde(rename = "type")]
    kind: TransactionKind,
    sender: Option<AccountNumber>,
    receiver: Option<AccountNumber>,
    amount: Decimal,
    created_at: String,
}

/// Writes ledger state as CSV. The PIN is never written.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes `account,name,balance` rows in the given order.
    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<()> {
        for account in accounts {
            self.writer.serialize(AccountRow {
                account: account.account_number,
                name: &account.name,
                balance: account.balance.value(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes `id,type,sender,receiver,amount,created_at` rows.
    pub fn write_history(&mut self, records: &[TransactionRecord]) -> Result<()> {
        for record in records {
            self.writer.serialize(HistoryRow {
                id: record.id,
                kind: record.kind,
                sender: record.sender_account_number,
                receiver: record.receiver_account_number,
                amount: record.amount.value(),
                created_at: record.created_at.to_rfc3339(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
