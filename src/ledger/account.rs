use crate::error::{Error, Result};
use crate::ledger::payment::PaymentRecord;
use serde::{Deserialize, Serialize};

/// Account aggregate: token balance, lifetime spend, and payment history.
///
/// Invariants:
/// - Balance never becomes negative
/// - `total_spent` equals the sum of amounts in `payments`
/// - Payment records are append-only, in chronological order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Spendable token units held by the account
    pub balance: u64,

    /// Cumulative token units spent on services (monotone non-decreasing)
    pub total_spent: u64,

    /// One record per successful service payment, oldest first
    pub payments: Vec<PaymentRecord>,
}

impl Account {
    /// Create a new account with zero balance and no history
    pub fn new() -> Self {
        Account::default()
    }

    /// Create an account with initial balance
    pub fn with_balance(balance: u64) -> Self {
        Account {
            balance,
            ..Account::default()
        }
    }

    /// Add to balance (token purchase or owner distribution)
    ///
    /// Returns the new balance
    pub fn add_balance(&mut self, amount: u64) -> u64 {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }

    /// Spend tokens on a service: debit balance, credit `total_spent`,
    /// append one payment record.
    ///
    /// Fails without touching any field when the balance is insufficient,
    /// keeping the spend all-or-nothing.
    pub fn spend(
        &mut self,
        payer: &str,
        service: &str,
        amount: u64,
        timestamp: i64,
    ) -> Result<&PaymentRecord> {
        if !self.has_sufficient_balance(amount) {
            return Err(Error::InsufficientBalance {
                available: self.balance,
                requested: amount,
            });
        }
        // Checked before any field moves: a pinned total_spent would no
        // longer equal the history sum
        let total_spent = self.total_spent.checked_add(amount).ok_or_else(|| {
            Error::InvalidTransaction("Total spent overflow".to_string())
        })?;
        self.balance -= amount;
        self.total_spent = total_spent;
        self.payments
            .push(PaymentRecord::new(payer, service, amount, timestamp));
        Ok(self.payments.last().expect("record just pushed"))
    }

    /// Check if account has sufficient balance
    pub fn has_sufficient_balance(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn total_spent(&self) -> u64 {
        self.total_spent
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }
}
