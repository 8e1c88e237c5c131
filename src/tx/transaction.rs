use serde::{Deserialize, Serialize};

/// Ledger operation kinds.
///
/// The caller identity lives on the enclosing [`Request`]; the variants carry
/// only operation payloads. `BuyTokens` and `PayForService` act on the
/// caller's own account, `DistributeTokens` and `WithdrawCurrency` are
/// owner-only administration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transaction {
    /// Exchange base currency for token units at the fixed rate
    BuyTokens {
        token_amount: u64,
        currency_sent: u64,
    },

    /// Spend token units on a named campus service
    PayForService { service: String, amount: u64 },

    /// Owner-only: credit tokens to an account without payment
    DistributeTokens { to: String, amount: u64 },

    /// Owner-only: sweep the accumulated currency balance to the owner
    WithdrawCurrency,
}

/// An authenticated request: caller identity, submission timestamp, operation.
///
/// The timestamp is fixed at submission so replaying the operation log
/// reproduces payment records byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    /// Opaque caller address/identity
    pub caller: String,

    /// Unix timestamp recorded when the request was accepted
    pub timestamp: i64,

    /// The operation to perform
    pub kind: Transaction,
}

impl Request {
    pub fn new(caller: String, timestamp: i64, kind: Transaction) -> Self {
        Request {
            caller,
            timestamp,
            kind,
        }
    }
}
