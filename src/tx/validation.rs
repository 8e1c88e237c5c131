use crate::error::{Error, Result};
use crate::ledger::{Ledger, TOKENS_PER_CURRENCY_UNIT};
use crate::tx::{Request, Transaction};

/// Currency required to buy `token_amount` tokens at the fixed rate.
///
/// Rounds up: any fractional remainder costs one whole currency unit.
/// Excess currency sent beyond this amount is retained by the ledger,
/// not refunded.
pub fn required_currency(token_amount: u64) -> u64 {
    token_amount.div_ceil(TOKENS_PER_CURRENCY_UNIT)
}

/// Validate a request against the current ledger state.
///
/// Returns the required currency amount for `BuyTokens` requests (for
/// display in dry runs), `None` for everything else. Validation never
/// mutates state; a request that passes here applies cleanly.
pub fn validate(ledger: &Ledger, req: &Request) -> Result<Option<u64>> {
    match &req.kind {
        Transaction::BuyTokens { .. } => validate_buy_tokens(ledger, req).map(Some),
        Transaction::PayForService { .. } => {
            validate_pay_for_service(ledger, req)?;
            Ok(None)
        }
        Transaction::DistributeTokens { .. } => {
            validate_distribute_tokens(ledger, req)?;
            Ok(None)
        }
        Transaction::WithdrawCurrency => {
            validate_withdraw_currency(ledger, req)?;
            Ok(None)
        }
    }
}

pub fn validate_buy_tokens(ledger: &Ledger, req: &Request) -> Result<u64> {
    let Transaction::BuyTokens {
        token_amount,
        currency_sent,
    } = &req.kind
    else {
        return Err(Error::InvalidTransaction(
            "Expected BuyTokens transaction".to_string(),
        ));
    };

    if *token_amount == 0 {
        return Err(Error::InvalidTransaction(
            "Token amount must be greater than zero".to_string(),
        ));
    }

    let required = required_currency(*token_amount);
    if *currency_sent < required {
        return Err(Error::InsufficientPayment {
            sent: *currency_sent,
            required,
        });
    }

    ledger
        .currency_balance()
        .checked_add(*currency_sent)
        .ok_or_else(|| {
            Error::InvalidTransaction("Currency balance overflow".to_string())
        })?;
    ledger
        .balance_of(&req.caller)
        .checked_add(*token_amount)
        .ok_or_else(|| Error::InvalidTransaction("Token balance overflow".to_string()))?;

    Ok(required)
}

pub fn validate_pay_for_service(ledger: &Ledger, req: &Request) -> Result<()> {
    let Transaction::PayForService { service, amount } = &req.kind else {
        return Err(Error::InvalidTransaction(
            "Expected PayForService transaction".to_string(),
        ));
    };

    if *amount == 0 {
        return Err(Error::InvalidTransaction(
            "Payment amount must be greater than zero".to_string(),
        ));
    }

    if service.trim().is_empty() {
        return Err(Error::InvalidTransaction(
            "Service name must not be empty".to_string(),
        ));
    }

    let sufficient = ledger
        .get_account(&req.caller)
        .is_some_and(|a| a.has_sufficient_balance(*amount));
    if !sufficient {
        return Err(Error::InsufficientBalance {
            available: ledger.balance_of(&req.caller),
            requested: *amount,
        });
    }

    ledger
        .total_spent_by(&req.caller)
        .checked_add(*amount)
        .ok_or_else(|| Error::InvalidTransaction("Total spent overflow".to_string()))?;

    Ok(())
}

pub fn validate_distribute_tokens(ledger: &Ledger, req: &Request) -> Result<()> {
    let Transaction::DistributeTokens { to, amount } = &req.kind else {
        return Err(Error::InvalidTransaction(
            "Expected DistributeTokens transaction".to_string(),
        ));
    };

    if req.caller != ledger.owner() {
        return Err(Error::Unauthorized {
            caller: req.caller.clone(),
        });
    }

    if *amount == 0 {
        return Err(Error::InvalidTransaction(
            "Distribution amount must be greater than zero".to_string(),
        ));
    }

    ledger.balance_of(to).checked_add(*amount).ok_or_else(|| {
        Error::InvalidTransaction("Token balance overflow".to_string())
    })?;

    Ok(())
}

pub fn validate_withdraw_currency(ledger: &Ledger, req: &Request) -> Result<()> {
    let Transaction::WithdrawCurrency = &req.kind else {
        return Err(Error::InvalidTransaction(
            "Expected WithdrawCurrency transaction".to_string(),
        ));
    };

    if req.caller != ledger.owner() {
        return Err(Error::Unauthorized {
            caller: req.caller.clone(),
        });
    }

    Ok(())
}
