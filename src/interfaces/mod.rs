//! Thin collaborator layer between the outside world and the engine.

pub mod csv;

use crate::error::LedgerError;

/// Human-readable text for a rejected request.
pub fn user_message(error: &LedgerError) -> String {
    match error {
        LedgerError::InvalidAmount(amount) => {
            format!("Invalid amount {}. Please enter a positive number.", amount)
        }
        LedgerError::AccountNotFound(account) => format!("Account {} does not exist.", account),
        LedgerError::InsufficientFunds {
            account, balance, ..
        } => format!(
            "Insufficient balance in account {} (available: {}).",
            account, balance
        ),
        LedgerError::SameAccountTransfer(_) => {
            "Cannot transfer money to the same account.".to_string()
        }
        LedgerError::DuplicateAccount(account) => {
            format!("Account {} is already open.", account)
        }
        other => other.to_string(),
    }
}
