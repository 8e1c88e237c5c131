use serde::{Deserialize, Serialize};

/// Observable ledger events, published after a request is applied.
///
/// Consumed by the UI layer to refresh displayed balances and history
/// without re-querying every field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    TokensPurchased {
        buyer: String,
        amount: u64,
        timestamp: i64,
    },
    PaymentMade {
        payer: String,
        service: String,
        amount: u64,
        timestamp: i64,
    },
    TokensDistributed {
        to: String,
        amount: u64,
        timestamp: i64,
    },
    CurrencyWithdrawn {
        to: String,
        amount: u64,
        timestamp: i64,
    },
}
