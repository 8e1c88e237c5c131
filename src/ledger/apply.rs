use crate::error::Result;
use crate::ledger::Ledger;
use crate::tx::validation::validate;
use crate::tx::{Request, Transaction};

/// Apply a request to the ledger, producing the successor state.
///
/// Validation runs first against the untouched input state; the input is
/// cloned only after it passes, so a rejected request provably leaves no
/// partial mutation behind. Deterministic: replaying the same request log
/// from genesis reproduces the same ledger.
pub fn apply(ledger: &Ledger, req: &Request) -> Result<Ledger> {
    validate(ledger, req)?;
    let mut next = ledger.clone();
    match &req.kind {
        Transaction::BuyTokens {
            token_amount,
            currency_sent,
        } => {
            apply_buy_tokens(&mut next, &req.caller, *token_amount, *currency_sent);
        }
        Transaction::PayForService { service, amount } => {
            apply_pay_for_service(&mut next, &req.caller, service, *amount, req.timestamp)?;
        }
        Transaction::DistributeTokens { to, amount } => {
            apply_distribute_tokens(&mut next, to, *amount);
        }
        Transaction::WithdrawCurrency => {
            apply_withdraw_currency(&mut next);
        }
    }

    Ok(next)
}

fn apply_buy_tokens(ledger: &mut Ledger, buyer: &str, token_amount: u64, currency_sent: u64) {
    // The full amount sent is retained; excess over the required price is
    // not refunded. Reference behavior, preserved deliberately.
    let account = ledger.get_or_create_account(buyer);
    account.add_balance(token_amount);
    ledger.currency_balance = ledger.currency_balance.saturating_add(currency_sent);
}

fn apply_pay_for_service(
    ledger: &mut Ledger,
    payer: &str,
    service: &str,
    amount: u64,
    timestamp: i64,
) -> Result<()> {
    let account = ledger.get_or_create_account(payer);
    account.spend(payer, service, amount, timestamp)?;
    Ok(())
}

fn apply_distribute_tokens(ledger: &mut Ledger, to: &str, amount: u64) {
    let account = ledger.get_or_create_account(to);
    account.add_balance(amount);
}

fn apply_withdraw_currency(ledger: &mut Ledger) {
    ledger.currency_balance = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn genesis() -> Ledger {
        Ledger::new("owner".to_string())
    }

    fn buy(caller: &str, token_amount: u64, currency_sent: u64) -> Request {
        Request::new(
            caller.to_string(),
            100,
            Transaction::BuyTokens {
                token_amount,
                currency_sent,
            },
        )
    }

    fn pay(caller: &str, service: &str, amount: u64) -> Request {
        Request::new(
            caller.to_string(),
            200,
            Transaction::PayForService {
                service: service.to_string(),
                amount,
            },
        )
    }

    #[test]
    fn test_apply_buy_tokens() {
        let state = genesis();
        let state = apply(&state, &buy("alice", 100, 1)).unwrap();

        assert_eq!(state.balance_of("alice"), 100);
        assert_eq!(state.currency_balance(), 1);
    }

    #[test]
    fn test_apply_buy_retains_excess() {
        let state = genesis();
        let state = apply(&state, &buy("alice", 100, 5)).unwrap();

        assert_eq!(state.balance_of("alice"), 100);
        assert_eq!(state.currency_balance(), 5); // Full amount kept, no refund
    }

    #[test]
    fn test_apply_buy_insufficient_payment() {
        let state = genesis();
        let result = apply(&state, &buy("alice", 2500, 2));
        assert!(matches!(result, Err(Error::InsufficientPayment { .. })));
    }

    #[test]
    fn test_apply_pay_for_service() {
        let state = genesis();
        let state = apply(&state, &buy("alice", 100, 1)).unwrap();
        let state = apply(&state, &pay("alice", "Laundry", 10)).unwrap();

        assert_eq!(state.balance_of("alice"), 90);
        assert_eq!(state.total_spent_by("alice"), 10);
        assert_eq!(state.payment_count("alice"), 1);
        let record = state.payment_history_entry("alice", 0).unwrap();
        assert_eq!(record.service, "Laundry");
        assert_eq!(record.amount, 10);
        assert_eq!(record.timestamp, 200);
    }

    #[test]
    fn test_apply_pay_insufficient_balance_state_unchanged() {
        let state = genesis();
        let state = apply(&state, &buy("alice", 20, 1)).unwrap();

        let result = apply(&state, &pay("alice", "Food Court", 25));
        assert!(matches!(result, Err(Error::InsufficientBalance { .. })));

        // Input state untouched
        assert_eq!(state.balance_of("alice"), 20);
        assert_eq!(state.total_spent_by("alice"), 0);
        assert_eq!(state.payment_count("alice"), 0);
    }

    #[test]
    fn test_apply_distribute_tokens_owner_only() {
        let state = genesis();

        let unauthorized = Request::new(
            "alice".to_string(),
            0,
            Transaction::DistributeTokens {
                to: "bob".to_string(),
                amount: 50,
            },
        );
        let result = apply(&state, &unauthorized);
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        assert_eq!(state.balance_of("bob"), 0);

        let authorized = Request::new(
            "owner".to_string(),
            0,
            Transaction::DistributeTokens {
                to: "bob".to_string(),
                amount: 50,
            },
        );
        let state = apply(&state, &authorized).unwrap();
        assert_eq!(state.balance_of("bob"), 50);
    }

    #[test]
    fn test_apply_withdraw_currency() {
        let state = genesis();
        let state = apply(&state, &buy("alice", 100, 1)).unwrap();
        assert_eq!(state.currency_balance(), 1);

        let withdraw = Request::new("owner".to_string(), 0, Transaction::WithdrawCurrency);
        let state = apply(&state, &withdraw).unwrap();
        assert_eq!(state.currency_balance(), 0);
    }

    #[test]
    fn test_apply_withdraw_non_owner_rejected() {
        let state = genesis();
        let state = apply(&state, &buy("alice", 100, 1)).unwrap();

        let withdraw = Request::new("alice".to_string(), 0, Transaction::WithdrawCurrency);
        let result = apply(&state, &withdraw);
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        assert_eq!(state.currency_balance(), 1);
    }

    #[test]
    fn test_apply_end_to_end_flow() {
        // Buy 100, then pay Laundry 10, Printing 5, Food Court 25.
        let mut state = genesis();
        state = apply(&state, &buy("alice", 100, 1)).unwrap();
        state = apply(&state, &pay("alice", "Laundry", 10)).unwrap();
        state = apply(&state, &pay("alice", "Printing", 5)).unwrap();
        state = apply(&state, &pay("alice", "Food Court", 25)).unwrap();

        assert_eq!(state.balance_of("alice"), 60);
        assert_eq!(state.total_spent_by("alice"), 40);
        assert_eq!(state.payment_count("alice"), 3);
        assert_eq!(
            state.payment_history_entry("alice", 0).unwrap().service,
            "Laundry"
        );
        assert_eq!(
            state.payment_history_entry("alice", 1).unwrap().service,
            "Printing"
        );
        assert_eq!(
            state.payment_history_entry("alice", 2).unwrap().service,
            "Food Court"
        );
    }
}
