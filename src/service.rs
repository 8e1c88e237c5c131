//! Single-writer service wrapper around the ledger.
//!
//! All mutating calls funnel through one mutex: lock, validate, apply,
//! persist, publish. Concurrent callers therefore never observe or produce
//! interleaved partial updates. The currency sink runs while the lock is
//! held and before the debit is committed, so a failed delivery leaves the
//! currency balance untouched.

use crate::error::{Error, Result};
use crate::ledger::{apply, Ledger, LedgerHook, NoOpHook, PaymentRecord};
use crate::logger::Logger;
use crate::storage::Storage;
use crate::tx::{Request, Transaction};
use std::sync::Mutex;

/// External delivery mechanism for withdrawn base currency.
///
/// The one place the ledger touches a possibly-failing external resource.
/// Implementations must be idempotence-safe from the caller's perspective:
/// the service only commits the debit after `transfer` returns `Ok`.
pub trait CurrencySink {
    fn transfer(&mut self, to: &str, amount: u64) -> Result<()>;
}

/// Sink that always delivers. Stands in for the real payout channel in the
/// CLI and in tests that don't exercise transfer failure.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl CurrencySink for NullSink {
    fn transfer(&mut self, _to: &str, _amount: u64) -> Result<()> {
        Ok(())
    }
}

struct Inner<S: Storage> {
    ledger: Ledger,
    last_op_id: u64,
    storage: S,
    sink: Box<dyn CurrencySink + Send>,
    hook: Box<dyn LedgerHook + Send>,
}

/// The ledger as a single logical actor: one mutex, one writer at a time.
pub struct LedgerService<S: Storage> {
    inner: Mutex<Inner<S>>,
}

impl<S: Storage> LedgerService<S> {
    /// Open the service over existing storage, or start from genesis.
    ///
    /// A snapshot (if present) is loaded and any operations logged after it
    /// are replayed; with no snapshot the whole log is replayed over genesis.
    pub fn open(owner: String, storage: S) -> Result<Self> {
        let (mut ledger, mut last_op_id) = match storage.load_ledger()? {
            Some((ledger, last_op_id)) => (ledger, last_op_id),
            None => (Ledger::new(owner), 0),
        };

        let tail = storage.load_ops_from(last_op_id)?;
        for req in tail {
            ledger = apply(&ledger, &req)?;
            last_op_id += 1;
        }

        Ok(LedgerService {
            inner: Mutex::new(Inner {
                ledger,
                last_op_id,
                storage,
                sink: Box::new(NullSink),
                hook: Box::new(NoOpHook),
            }),
        })
    }

    /// Replace the currency sink (builder style, before serving requests)
    pub fn with_sink(self, sink: Box<dyn CurrencySink + Send>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.sink = sink;
        }
        self
    }

    /// Replace the event hook (builder style, before serving requests)
    pub fn with_hook(self, hook: Box<dyn LedgerHook + Send>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.hook = hook;
        }
        self
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner<S>>> {
        self.inner
            .lock()
            .map_err(|_| Error::StateError("Ledger lock poisoned".to_string()))
    }

    /// Purchase tokens at the fixed exchange rate
    pub fn buy_tokens(&self, caller: &str, token_amount: u64, currency_sent: u64) -> Result<()> {
        let mut inner = self.lock()?;
        let req = Request::new(
            caller.to_string(),
            crate::current_timestamp(),
            Transaction::BuyTokens {
                token_amount,
                currency_sent,
            },
        );
        Self::commit(&mut inner, &req)?;
        inner
            .hook
            .on_tokens_purchased(caller, token_amount, req.timestamp);
        Ok(())
    }

    /// Pay for a named campus service; returns the appended record
    pub fn pay_for_service(
        &self,
        caller: &str,
        service: &str,
        amount: u64,
    ) -> Result<PaymentRecord> {
        let mut inner = self.lock()?;
        let req = Request::new(
            caller.to_string(),
            crate::current_timestamp(),
            Transaction::PayForService {
                service: service.to_string(),
                amount,
            },
        );
        Self::commit(&mut inner, &req)?;
        inner
            .hook
            .on_payment_made(caller, service, amount, req.timestamp);

        let count = inner.ledger.payment_count(caller);
        let record = inner.ledger.payment_history_entry(caller, count - 1)?;
        Ok(record.clone())
    }

    /// Owner-only: credit tokens to an account without payment
    pub fn distribute_tokens(&self, caller: &str, to: &str, amount: u64) -> Result<()> {
        let mut inner = self.lock()?;
        let req = Request::new(
            caller.to_string(),
            crate::current_timestamp(),
            Transaction::DistributeTokens {
                to: to.to_string(),
                amount,
            },
        );
        Self::commit(&mut inner, &req)?;
        inner.hook.on_tokens_distributed(to, amount, req.timestamp);
        Ok(())
    }

    /// Owner-only: sweep the accumulated currency balance to the owner.
    ///
    /// Delivery runs before the debit is committed; a sink failure aborts
    /// the whole operation with `TransferFailed` and the balance unchanged.
    /// Returns the amount delivered.
    pub fn withdraw_currency(&self, caller: &str) -> Result<u64> {
        let mut inner = self.lock()?;
        let req = Request::new(
            caller.to_string(),
            crate::current_timestamp(),
            Transaction::WithdrawCurrency,
        );

        // Authorization first, so a non-owner cannot trigger a transfer
        crate::tx::validate(&inner.ledger, &req)?;

        let amount = inner.ledger.currency_balance();
        let owner = inner.ledger.owner().to_string();
        if let Err(e) = inner.sink.transfer(&owner, amount) {
            Logger::warn(&format!(
                "Currency delivery failed, balance unchanged: {}",
                e
            ));
            return Err(e);
        }

        Self::commit(&mut inner, &req)?;
        inner.hook.on_currency_withdrawn(&owner, amount, req.timestamp);
        Ok(amount)
    }

    /// Validate + apply + log + snapshot under the held lock.
    fn commit(inner: &mut Inner<S>, req: &Request) -> Result<()> {
        let next = apply(&inner.ledger, req)?;
        inner.storage.append_op(req)?;
        let next_id = inner.last_op_id + 1;
        inner.storage.persist_ledger(&next, next_id)?;
        inner.ledger = next;
        inner.last_op_id = next_id;
        Logger::debug(&format!(
            "Committed op {} from {}",
            next_id, req.caller
        ));
        Ok(())
    }

    pub fn balance_of(&self, account: &str) -> Result<u64> {
        Ok(self.lock()?.ledger.balance_of(account))
    }

    pub fn total_spent_by(&self, account: &str) -> Result<u64> {
        Ok(self.lock()?.ledger.total_spent_by(account))
    }

    pub fn payment_count(&self, account: &str) -> Result<usize> {
        Ok(self.lock()?.ledger.payment_count(account))
    }

    pub fn payment_history_entry(&self, account: &str, index: usize) -> Result<PaymentRecord> {
        let inner = self.lock()?;
        inner
            .ledger
            .payment_history_entry(account, index)
            .map(Clone::clone)
    }

    pub fn recent_payments(&self, account: &str, n: usize) -> Result<Vec<PaymentRecord>> {
        Ok(self.lock()?.ledger.recent_payments(account, n).to_vec())
    }

    pub fn currency_balance(&self) -> Result<u64> {
        Ok(self.lock()?.ledger.currency_balance())
    }

    pub fn owner(&self) -> Result<String> {
        Ok(self.lock()?.ledger.owner().to_string())
    }

    /// Clone of the full ledger state, for display layers
    pub fn snapshot(&self) -> Result<Ledger> {
        Ok(self.lock()?.ledger.clone())
    }
}
