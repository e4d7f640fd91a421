// Domain errors for the account model
//
// Every variant is a recoverable, reportable result. Nothing here is fatal:
// the shell prints the message and goes back to the menu.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mutating operation an amount was rejected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Deposit,
    Withdrawal,
    Transfer,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Deposit => "deposit",
            Operation::Withdrawal => "withdrawal",
            Operation::Transfer => "transfer",
        }
    }
}

/// Which side of a request failed to resolve to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The single account of a deposit, withdrawal or lookup
    Holder,

    /// The paying side of a transfer
    Source,

    /// The receiving side of a transfer
    Recipient,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    /// Non-positive amount, or more than the account holds
    #[error("{}", rejection_message(.operation))]
    InvalidAmount { operation: Operation, amount: Decimal },

    /// Lookup by account number found nothing
    #[error("{}", not_found_message(.party))]
    AccountNotFound { party: Party, number: String },

    /// Only raised when the directory enforces unique numbers
    #[error("Account number {0} is already in use.")]
    DuplicateAccountNumber(String),
}

fn rejection_message(operation: &Operation) -> &'static str {
    match operation {
        Operation::Deposit => "Invalid deposit amount.",
        Operation::Withdrawal => "Invalid withdrawal amount or insufficient funds.",
        Operation::Transfer => "Transfer failed due to insufficient funds or invalid amount.",
    }
}

fn not_found_message(party: &Party) -> &'static str {
    match party {
        Party::Holder => "Account not found.",
        Party::Source => "Your account not found.",
        Party::Recipient => "Recipient account not found.",
    }
}

impl BankError {
    pub fn not_found(party: Party, number: &str) -> Self {
        BankError::AccountNotFound {
            party,
            number: number.to_string(),
        }
    }
}

pub type BankResult<T> = Result<T, BankError>;
