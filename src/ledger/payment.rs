use crate::sha256_digest;
use serde::{Deserialize, Serialize};

/// One successful service payment. Immutable once appended to an account's
/// history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentRecord {
    /// Campus service paid for (e.g., "Laundry", "Food Court")
    pub service: String,

    /// Token units spent
    pub amount: u64,

    /// Unix timestamp when the payment was accepted
    pub timestamp: i64,

    /// Stable reference for receipts: hex SHA-256 over the payment fields
    pub receipt: String,
}

impl PaymentRecord {
    pub fn new(payer: &str, service: &str, amount: u64, timestamp: i64) -> Self {
        let receipt = compute_receipt(payer, service, amount, timestamp);
        PaymentRecord {
            service: service.to_string(),
            amount,
            timestamp,
            receipt,
        }
    }
}

/// Hex SHA-256 digest binding payer, service, amount, and timestamp.
///
/// Fields are length-delimited so distinct payments cannot collide by
/// concatenation.
pub fn compute_receipt(payer: &str, service: &str, amount: u64, timestamp: i64) -> String {
    let mut data = Vec::new();
    data.extend_from_slice(&(payer.len() as u64).to_le_bytes());
    data.extend_from_slice(payer.as_bytes());
    data.extend_from_slice(&(service.len() as u64).to_le_bytes());
    data.extend_from_slice(service.as_bytes());
    data.extend_from_slice(&amount.to_le_bytes());
    data.extend_from_slice(&timestamp.to_le_bytes());
    hex::encode(sha256_digest(&data))
}
