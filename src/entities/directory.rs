// 📒 Account Directory - every account opened during the session
//
// Accounts are kept in creation order and looked up by account number with a
// linear scan. Nothing is ever removed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::account::{Account, Counterparty, Receipt};
use crate::error::{BankError, BankResult, Operation, Party};

// ============================================================================
// NUMBER POLICY
// ============================================================================

/// Whether `create` enforces unique account numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberPolicy {
    /// Duplicates are appended; lookups return the first match
    #[default]
    Permissive,

    /// A number already in the directory is rejected
    Unique,
}

// ============================================================================
// ACCOUNT DIRECTORY
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountDirectory {
    policy: NumberPolicy,
    accounts: Vec<Account>,
}

impl AccountDirectory {
    /// Empty directory with the permissive number policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: NumberPolicy) -> Self {
        AccountDirectory {
            policy,
            accounts: Vec::new(),
        }
    }

    pub fn policy(&self) -> NumberPolicy {
        self.policy
    }

    /// Open an account and append it.
    ///
    /// The initial balance is not validated. Under `NumberPolicy::Unique` a
    /// number that is already present fails with `DuplicateAccountNumber`.
    pub fn create(
        &mut self,
        holder_name: impl Into<String>,
        account_number: impl Into<String>,
        initial_balance: Decimal,
    ) -> BankResult<&Account> {
        let account_number = account_number.into();

        if self.policy == NumberPolicy::Unique && self.position(&account_number).is_some() {
            debug!(account_number = %account_number, "rejected duplicate account number");
            return Err(BankError::DuplicateAccountNumber(account_number));
        }

        let account = Account::new(holder_name, account_number, initial_balance);
        info!(
            account_number = %account.account_number(),
            balance = %account.balance(),
            "account created"
        );

        self.accounts.push(account);
        let index = self.accounts.len() - 1;
        Ok(&self.accounts[index])
    }

    /// First account (in creation order) with this number
    pub fn find_by_number(&self, account_number: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.account_number() == account_number)
    }

    pub fn find_by_number_mut(&mut self, account_number: &str) -> Option<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.account_number() == account_number)
    }

    /// Lookup that reports a miss as `AccountNotFound`
    pub fn require(&self, account_number: &str, party: Party) -> BankResult<&Account> {
        self.find_by_number(account_number)
            .ok_or_else(|| BankError::not_found(party, account_number))
    }

    fn position(&self, account_number: &str) -> Option<usize> {
        self.accounts
            .iter()
            .position(|a| a.account_number() == account_number)
    }

    fn require_position(&self, account_number: &str, party: Party) -> BankResult<usize> {
        self.position(account_number)
            .ok_or_else(|| BankError::not_found(party, account_number))
    }

    pub fn deposit(&mut self, account_number: &str, amount: Decimal) -> BankResult<Receipt> {
        let account = self
            .find_by_number_mut(account_number)
            .ok_or_else(|| BankError::not_found(Party::Holder, account_number))?;

        log_outcome(account.deposit(amount))
    }

    pub fn withdraw(&mut self, account_number: &str, amount: Decimal) -> BankResult<Receipt> {
        let account = self
            .find_by_number_mut(account_number)
            .ok_or_else(|| BankError::not_found(Party::Holder, account_number))?;

        log_outcome(account.withdraw(amount))
    }

    /// Move `amount` from one account to another, both looked up by number.
    ///
    /// The source is resolved first, then the recipient, then the amount is
    /// checked. When both numbers resolve to the same account the transfer
    /// succeeds without changing the balance.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Decimal) -> BankResult<Receipt> {
        let source = self.require_position(from, Party::Source)?;
        let target = self.require_position(to, Party::Recipient)?;

        if source == target {
            return log_outcome(self.transfer_to_self(source, amount));
        }

        let (source, target) = if source < target {
            let (left, right) = self.accounts.split_at_mut(target);
            (&mut left[source], &mut right[0])
        } else {
            let (left, right) = self.accounts.split_at_mut(source);
            (&mut right[0], &mut left[target])
        };

        log_outcome(source.transfer(target, amount))
    }

    // Withdraw then deposit on one record nets out to nothing
    fn transfer_to_self(&self, index: usize, amount: Decimal) -> BankResult<Receipt> {
        let account = &self.accounts[index];
        if !account.can_cover(amount) {
            return Err(BankError::InvalidAmount {
                operation: Operation::Transfer,
                amount,
            });
        }

        Ok(Receipt {
            operation: Operation::Transfer,
            amount,
            account_number: account.account_number().to_string(),
            balance: account.balance(),
            counterparty: Some(Counterparty {
                account_number: account.account_number().to_string(),
                balance: account.balance(),
            }),
        })
    }

    /// All accounts in creation order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, index: usize) -> Option<&Account> {
        self.accounts.get(index)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of every balance in the directory, saturating at the Decimal range
    pub fn total_balance(&self) -> Decimal {
        self.accounts
            .iter()
            .fold(Decimal::ZERO, |total, a| total.saturating_add(a.balance()))
    }
}

fn log_outcome(outcome: BankResult<Receipt>) -> BankResult<Receipt> {
    match &outcome {
        Ok(receipt) => info!(
            operation = receipt.operation.as_str(),
            account_number = %receipt.account_number,
            amount = %receipt.amount,
            balance = %receipt.balance,
            "operation applied"
        ),
        Err(err) => debug!(error = %err, "operation rejected"),
    }
    outcome
}
