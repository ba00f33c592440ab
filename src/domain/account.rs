use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an account.
pub type AccountNumber = u32;

/// A non-negative monetary value held by an account.
///
/// Wraps `rust_decimal::Decimal` so balances never go through binary floating
/// point. The constructor and `Deserialize` both reject negative values, so a
/// `Balance` in hand is always `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Balance(Decimal);

/// A strictly positive amount moved by a deposit, withdrawal or transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Balance after adding `amount`. Fails only on decimal overflow.
    pub fn credited(self, amount: Amount) -> Result<Self> {
        self.0
            .checked_add(amount.0)
            .map(Self)
            .ok_or(LedgerError::InvalidAmount(amount.0))
    }

    /// Balance after removing `amount`, or `None` if that would overdraw.
    pub fn debited(self, amount: Amount) -> Option<Self> {
        if amount.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - amount.0))
        }
    }
}

impl TryFrom<Decimal> for Balance {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A customer account.
///
/// `balance` only changes through the engine. `opening_balance` is the value
/// the account was opened with and never changes; reconciliation replays the
/// transaction log on top of it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub account_number: AccountNumber,
    /// Stored as given. Not hashed or verified anywhere in the ledger.
    pub pin: u32,
    pub name: String,
    pub balance: Balance,
    pub opening_balance: Balance,
}

impl Account {
    pub fn new(
        account_number: AccountNumber,
        pin: u32,
        name: impl Into<String>,
        opening_balance: Balance,
    ) -> Self {
        Self {
            account_number,
            pin,
            name: name.into(),
            balance: opening_balance,
            opening_balance,
        }
    }

    /// Adds funds to the balance.
    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.credited(amount)?;
        Ok(())
    }

    /// Removes funds from the balance if sufficient, leaving it untouched otherwise.
    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        match self.balance.debited(amount) {
            Some(balance) => {
                self.balance = balance;
                Ok(())
            }
            None => Err(LedgerError::InsufficientFunds {
                account: self.account_number,
                balance: self.balance.value(),
                requested: amount.value(),
            }),
        }
    }
}
