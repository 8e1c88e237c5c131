use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient payment: sent {sent}, required {required}")]
    InsufficientPayment { sent: u64, required: u64 },

    #[error("Insufficient token balance: have {available}, need {requested}")]
    InsufficientBalance { available: u64, requested: u64 },

    #[error("Unauthorized: {caller} is not the ledger owner")]
    Unauthorized { caller: String },

    #[error("Payment index {index} out of range: account has {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Currency transfer failed: {0}")]
    TransferFailed(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("State error: {0}")]
    StateError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
