pub mod account;
pub mod apply;
pub mod event;
pub mod hook;
pub mod payment;

pub use account::Account;
pub use apply::apply;
pub use event::Event;
pub use hook::{LedgerHook, NoOpHook, RecordingHook, SharedRecordingHook};
pub use payment::PaymentRecord;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed exchange rate: token units received per unit of base currency.
pub const TOKENS_PER_CURRENCY_UNIT: u64 = 1000;

/// Token metadata, fixed at compile time.
pub const TOKEN_NAME: &str = "Campus Pay Token";
pub const TOKEN_SYMBOL: &str = "CPT";
pub const TOKEN_DECIMALS: u8 = 0;

/// Core domain state: all accounts plus the owner and the accumulated
/// currency balance.
///
/// State is fully reconstructible by replaying requests from genesis.
/// All state transitions are deterministic and side-effect free.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ledger {
    /// All accounts indexed by account address/identifier
    pub accounts: HashMap<String, Account>,

    /// The single privileged identity, set at genesis and never reassigned
    pub owner: String,

    /// Base currency accumulated from token purchases, awaiting withdrawal
    pub currency_balance: u64,
}

impl Ledger {
    /// Create genesis state: no accounts, zero currency, fixed owner
    pub fn new(owner: String) -> Self {
        Ledger {
            accounts: HashMap::new(),
            owner,
            currency_balance: 0,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn currency_balance(&self) -> u64 {
        self.currency_balance
    }

    /// Get or create an account (returns mutable reference)
    ///
    /// Accounts are created lazily with zero values on first interaction;
    /// an unseen address is indistinguishable from one that never transacted.
    pub fn get_or_create_account(&mut self, address: &str) -> &mut Account {
        self.accounts.entry(address.to_string()).or_default()
    }

    /// Get account (returns Option)
    pub fn get_account(&self, address: &str) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Token balance for an account; zero for unseen addresses
    pub fn balance_of(&self, address: &str) -> u64 {
        self.get_account(address).map_or(0, |a| a.balance())
    }

    /// Lifetime spend for an account; zero for unseen addresses
    pub fn total_spent_by(&self, address: &str) -> u64 {
        self.get_account(address).map_or(0, |a| a.total_spent())
    }

    /// Number of payment records for an account
    pub fn payment_count(&self, address: &str) -> usize {
        self.get_account(address).map_or(0, |a| a.payments().len())
    }

    /// Payment record at `index` (insertion order)
    pub fn payment_history_entry(&self, address: &str, index: usize) -> Result<&PaymentRecord> {
        let len = self.payment_count(address);
        self.get_account(address)
            .and_then(|a| a.payments().get(index))
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// The most recent `n` payment records, oldest first.
    ///
    /// The surrounding application only ever displays the last few entries;
    /// retention itself is unbounded.
    pub fn recent_payments(&self, address: &str, n: usize) -> &[PaymentRecord] {
        match self.get_account(address) {
            Some(a) => {
                let payments = a.payments();
                let start = payments.len().saturating_sub(n);
                &payments[start..]
            }
            None => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }
}
