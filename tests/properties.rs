use campus_pay::ledger::{apply, Ledger};
use campus_pay::tx::{required_currency, Request, Transaction};
use proptest::prelude::*;

fn buy(caller: &str, tokens: u64) -> Request {
    Request::new(
        caller.to_string(),
        0,
        Transaction::BuyTokens {
            token_amount: tokens,
            currency_sent: required_currency(tokens),
        },
    )
}

fn pay(caller: &str, service: &str, amount: u64) -> Request {
    Request::new(
        caller.to_string(),
        0,
        Transaction::PayForService {
            service: service.to_string(),
            amount,
        },
    )
}

proptest! {
    /// With no intervening spends, the final balance equals the sum of all
    /// purchased token amounts.
    #[test]
    fn prop_buys_sum_to_balance(amounts in proptest::collection::vec(1u64..1_000_000, 1..20)) {
        let mut state = Ledger::new("owner".to_string());
        for amount in &amounts {
            state = apply(&state, &buy("alice", *amount)).unwrap();
        }
        let total: u64 = amounts.iter().sum();
        prop_assert_eq!(state.balance_of("alice"), total);
    }

    /// total_spent always equals the sum of amounts in the payment history,
    /// and the balance plus total_spent equals tokens acquired.
    #[test]
    fn prop_spend_accounting_consistent(
        bought in 1u64..1_000_000,
        spends in proptest::collection::vec(1u64..5_000, 0..20),
    ) {
        let mut state = Ledger::new("owner".to_string());
        state = apply(&state, &buy("alice", bought)).unwrap();

        for (i, amount) in spends.iter().enumerate() {
            let req = pay("alice", &format!("Service {}", i), *amount);
            match apply(&state, &req) {
                Ok(next) => state = next,
                // Rejected spends must leave nothing behind; checked below
                Err(_) => {}
            }
        }

        let account = state.get_account("alice").unwrap();
        let history_sum: u64 = account.payments().iter().map(|r| r.amount).sum();
        prop_assert_eq!(account.total_spent(), history_sum);
        prop_assert_eq!(account.balance() + account.total_spent(), bought);
    }

    /// The rounded-up price always covers the tokens at the fixed rate, and
    /// never overshoots by a full currency unit.
    #[test]
    fn prop_required_currency_bounds(tokens in 1u64..u64::MAX / 2000) {
        let required = required_currency(tokens);
        prop_assert!(required * 1000 >= tokens);
        prop_assert!((required - 1) * 1000 < tokens);
    }

    /// Non-owner administrative requests never change state.
    #[test]
    fn prop_non_owner_admin_rejected(caller in "[a-z]{1,8}", amount in 1u64..1_000) {
        prop_assume!(caller != "owner");
        let mut state = Ledger::new("owner".to_string());
        state = apply(&state, &buy("alice", 100)).unwrap();

        let distribute = Request::new(
            caller.clone(),
            0,
            Transaction::DistributeTokens { to: "bob".to_string(), amount },
        );
        prop_assert!(apply(&state, &distribute).is_err());

        let withdraw = Request::new(caller, 0, Transaction::WithdrawCurrency);
        prop_assert!(apply(&state, &withdraw).is_err());
    }
}
