// 💳 Account Entity - holder, number and balance
//
// "The balance only moves through deposit, withdraw and transfer"
//
// Rules:
// - Amounts must be strictly positive
// - A withdrawal or transfer may never take more than the balance
// - A rejected operation leaves every account untouched
// - The opening balance is taken as given, it is never validated

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BankError, BankResult, Operation};

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// A named, numbered record of monetary balance
///
/// Identity: UUID assigned at creation (never changes)
/// Values: holder name and account number as entered, balance as mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity (UUID v4)
    pub id: String,

    /// When the account was opened in this session
    pub opened_at: DateTime<Utc>,

    holder_name: String,
    account_number: String,
    balance: Decimal,
}

impl Account {
    /// Open a new account. The initial balance is stored as-is.
    pub fn new(
        holder_name: impl Into<String>,
        account_number: impl Into<String>,
        initial_balance: Decimal,
    ) -> Self {
        Account {
            id: uuid::Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            holder_name: holder_name.into(),
            account_number: account_number.into(),
            balance: initial_balance,
        }
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// True when `amount` is positive and no larger than the balance
    pub fn can_cover(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount <= self.balance
    }

    /// True when `amount` is positive and adding it cannot overflow
    pub fn can_accept(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && self.balance.checked_add(amount).is_some()
    }

    /// Add a positive amount to the balance
    pub fn deposit(&mut self, amount: Decimal) -> BankResult<Receipt> {
        let balance = match self.balance.checked_add(amount) {
            Some(balance) if amount > Decimal::ZERO => balance,
            _ => {
                return Err(BankError::InvalidAmount {
                    operation: Operation::Deposit,
                    amount,
                })
            }
        };

        self.balance = balance;
        Ok(Receipt::single(Operation::Deposit, amount, self))
    }

    /// Take a positive amount out, never more than the balance
    pub fn withdraw(&mut self, amount: Decimal) -> BankResult<Receipt> {
        if !self.can_cover(amount) {
            return Err(BankError::InvalidAmount {
                operation: Operation::Withdrawal,
                amount,
            });
        }

        self.balance -= amount;
        Ok(Receipt::single(Operation::Withdrawal, amount, self))
    }

    /// Withdraw from `self`, then deposit into `target`.
    ///
    /// The amount is checked against both sides before either is touched, so
    /// a rejected transfer is a no-op for both accounts. The two steps are not
    /// atomic; that is only sound with a single thread of control.
    pub fn transfer(&mut self, target: &mut Account, amount: Decimal) -> BankResult<Receipt> {
        if !self.can_cover(amount) || !target.can_accept(amount) {
            return Err(BankError::InvalidAmount {
                operation: Operation::Transfer,
                amount,
            });
        }

        self.withdraw(amount)?;
        target.deposit(amount)?;

        Ok(Receipt {
            operation: Operation::Transfer,
            amount,
            account_number: self.account_number.clone(),
            balance: self.balance,
            counterparty: Some(Counterparty {
                account_number: target.account_number.clone(),
                balance: target.balance,
            }),
        })
    }
}

// ============================================================================
// RECEIPT
// ============================================================================

/// The other side of a transfer, as it stood after the deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    pub account_number: String,
    pub balance: Decimal,
}

/// Result of a successful deposit, withdrawal or transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub operation: Operation,
    pub amount: Decimal,

    /// Account the operation was invoked on (the source for transfers)
    pub account_number: String,

    /// Balance of that account after the operation
    pub balance: Decimal,

    pub counterparty: Option<Counterparty>,
}

impl Receipt {
    /// Last line of the console message, e.g. for a one-line status bar
    pub fn summary(&self) -> String {
        let message = self.to_string();
        message.lines().last().unwrap_or_default().to_string()
    }

    fn single(operation: Operation, amount: Decimal, account: &Account) -> Self {
        Receipt {
            operation,
            amount,
            account_number: account.account_number.clone(),
            balance: account.balance,
            counterparty: None,
        }
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Operation::Deposit => {
                write!(f, "Deposited {}. New balance: {}", self.amount, self.balance)
            }
            Operation::Withdrawal => {
                write!(f, "Withdrew {}. New balance: {}", self.amount, self.balance)
            }
            Operation::Transfer => {
                let (target, target_balance) = match &self.counterparty {
                    Some(c) => (c.account_number.as_str(), c.balance),
                    None => (self.account_number.as_str(), self.balance),
                };
                writeln!(f, "Withdrew {}. New balance: {}", self.amount, self.balance)?;
                writeln!(f, "Deposited {}. New balance: {}", self.amount, target_balance)?;
                write!(f, "Transferred {} to account {}", self.amount, target)
            }
        }
    }
}

/// Parse a user-typed amount. Surrounding whitespace is ignored.
///
/// Example: " 12.50 " → Some(12.50), "twelve" → None
pub fn parse_amount(input: &str) -> Option<Decimal> {
    input.trim().parse::<Decimal>().ok()
}
