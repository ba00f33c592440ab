//! Ledger reconciliation.
//!
//! Replays the transaction log on top of each account's opening balance and
//! compares the result with the stored balance. Run after reopening a
//! persistent store to detect states a crash or an external writer may have
//! left behind.

use crate::domain::account::AccountNumber;
use crate::domain::ports::LedgerStore;
use crate::domain::transaction::RecordId;
use crate::error::Result;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    /// The stored balance differs from opening balance plus recorded movements.
    BalanceMismatch {
        account: AccountNumber,
        expected: Decimal,
        actual: Decimal,
    },
    /// A record references an account that does not exist.
    DanglingRecord {
        record: RecordId,
        account: AccountNumber,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::BalanceMismatch {
                account,
                expected,
                actual,
            } => write!(
                f,
                "account {} has balance {} but its history adds up to {}",
                account, actual, expected
            ),
            Discrepancy::DanglingRecord { record, account } => {
                write!(f, "record {} references unknown account {}", record, account)
            }
        }
    }
}

pub async fn reconcile(store: &dyn LedgerStore) -> Result<Vec<Discrepancy>> {
    let accounts = store.accounts().await?;
    let records = store.transactions().await?;

    let mut expected: BTreeMap<AccountNumber, Decimal> = accounts
        .iter()
        .map(|account| (account.account_number, account.opening_balance.value()))
        .collect();

    let mut discrepancies = Vec::new();
    for record in &records {
        let amount = record.amount.value();
        let movements = [
            (record.sender_account_number, -amount),
            (record.receiver_account_number, amount),
        ];
        for (party, delta) in movements {
            let Some(account) = party else { continue };
            match expected.get_mut(&account) {
                Some(total) => *total += delta,
                None => discrepancies.push(Discrepancy::DanglingRecord {
                    record: record.id,
                    account,
                }),
            }
        }
    }

    for account in &accounts {
        let Some(&expected) = expected.get(&account.account_number) else {
            continue;
        };
        let actual = account.balance.value();
        if expected != actual {
            discrepancies.push(Discrepancy::BalanceMismatch {
                account: account.account_number,
                expected,
                actual,
            });
        }
    }

    tracing::debug!(
        accounts = accounts.len(),
        records = records.len(),
        discrepancies = discrepancies.len(),
        "Ledger reconciled"
    );
    Ok(discrepancies)
}
