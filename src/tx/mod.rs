pub mod transaction;
pub mod validation;

pub use transaction::{Request, Transaction};
pub use validation::{
    required_currency, validate, validate_buy_tokens, validate_distribute_tokens,
    validate_pay_for_service, validate_withdraw_currency,
};
