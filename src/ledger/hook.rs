//! Hook: injectable observer for ledger events.
//!
//! The service publishes one event per successfully applied request. Hooks
//! run after the state transition is committed and cannot block it.

use crate::ledger::Event;

/// Trait-based observer for applied ledger operations.
///
/// All methods default to no-ops so implementors only handle the events
/// they care about.
pub trait LedgerHook {
    /// Called after a token purchase is committed.
    fn on_tokens_purchased(&mut self, _buyer: &str, _amount: u64, _timestamp: i64) {}

    /// Called after a service payment is committed.
    fn on_payment_made(&mut self, _payer: &str, _service: &str, _amount: u64, _timestamp: i64) {}

    /// Called after an owner distribution is committed.
    fn on_tokens_distributed(&mut self, _to: &str, _amount: u64, _timestamp: i64) {}

    /// Called after a currency withdrawal is committed.
    fn on_currency_withdrawn(&mut self, _to: &str, _amount: u64, _timestamp: i64) {}
}

/// No-op hook: default when no observer is attached.
#[derive(Debug, Clone, Default)]
pub struct NoOpHook;

impl LedgerHook for NoOpHook {}

/// Hook that records every event in order. Used by tests and by UI glue
/// that drains events between renders.
#[derive(Debug, Clone, Default)]
pub struct RecordingHook {
    pub events: Vec<Event>,
}

impl RecordingHook {
    pub fn new() -> Self {
        RecordingHook::default()
    }

    /// Drain all recorded events, oldest first
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl LedgerHook for RecordingHook {
    fn on_tokens_purchased(&mut self, buyer: &str, amount: u64, timestamp: i64) {
        self.events.push(Event::TokensPurchased {
            buyer: buyer.to_string(),
            amount,
            timestamp,
        });
    }

    fn on_payment_made(&mut self, payer: &str, service: &str, amount: u64, timestamp: i64) {
        self.events.push(Event::PaymentMade {
            payer: payer.to_string(),
            service: service.to_string(),
            amount,
            timestamp,
        });
    }

    fn on_tokens_distributed(&mut self, to: &str, amount: u64, timestamp: i64) {
        self.events.push(Event::TokensDistributed {
            to: to.to_string(),
            amount,
            timestamp,
        });
    }

    fn on_currency_withdrawn(&mut self, to: &str, amount: u64, timestamp: i64) {
        self.events.push(Event::CurrencyWithdrawn {
            to: to.to_string(),
            amount,
            timestamp,
        });
    }
}

/// Clonable handle over a [`RecordingHook`], for callers that need to read
/// events back after handing the hook to the service.
#[derive(Debug, Clone, Default)]
pub struct SharedRecordingHook {
    inner: std::sync::Arc<std::sync::Mutex<RecordingHook>>,
}

impl SharedRecordingHook {
    pub fn new() -> Self {
        SharedRecordingHook::default()
    }

    /// Drain all recorded events, oldest first
    pub fn take_events(&self) -> Vec<Event> {
        match self.inner.lock() {
            Ok(mut hook) => hook.take_events(),
            Err(_) => Vec::new(),
        }
    }
}

impl LedgerHook for SharedRecordingHook {
    fn on_tokens_purchased(&mut self, buyer: &str, amount: u64, timestamp: i64) {
        if let Ok(mut hook) = self.inner.lock() {
            hook.on_tokens_purchased(buyer, amount, timestamp);
        }
    }

    fn on_payment_made(&mut self, payer: &str, service: &str, amount: u64, timestamp: i64) {
        if let Ok(mut hook) = self.inner.lock() {
            hook.on_payment_made(payer, service, amount, timestamp);
        }
    }

    fn on_tokens_distributed(&mut self, to: &str, amount: u64, timestamp: i64) {
        if let Ok(mut hook) = self.inner.lock() {
            hook.on_tokens_distributed(to, amount, timestamp);
        }
    }

    fn on_currency_withdrawn(&mut self, to: &str, amount: u64, timestamp: i64) {
        if let Ok(mut hook) = self.inner.lock() {
            hook.on_currency_withdrawn(to, amount, timestamp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_hook_collects_in_order() {
        let mut hook = RecordingHook::new();
        hook.on_tokens_purchased("alice", 100, 1);
        hook.on_payment_made("alice", "Laundry", 10, 2);

        let events = hook.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::TokensPurchased { .. }));
        assert!(matches!(events[1], Event::PaymentMade { .. }));
        assert!(hook.events.is_empty());
    }
}
