use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Externally owned player balance. Persistence is the implementor's concern.
pub trait BalanceStore {
    fn balance(&self) -> f64;
    fn credit(&mut self, amount: f64);
    fn debit(&mut self, amount: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryBalance {
    amount: f64,
}

impl MemoryBalance {
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }
}

impl BalanceStore for MemoryBalance {
    fn balance(&self) -> f64 {
        self.amount
    }

    fn credit(&mut self, amount: f64) {
        self.amount += amount;
    }

    fn debit(&mut self, amount: f64) {
        self.amount -= amount;
    }
}

impl<T: BalanceStore + ?Sized> BalanceStore for Box<T> {
    fn balance(&self) -> f64 {
        (**self).balance()
    }

    fn credit(&mut self, amount: f64) {
        (**self).credit(amount)
    }

    fn debit(&mut self, amount: f64) {
        (**self).debit(amount)
    }
}

/// Pull-based bet amount. Read at the moment a bet is registered or a reveal is scored.
pub trait BetSource {
    fn current_bet(&self) -> f64;
}

impl BetSource for f64 {
    fn current_bet(&self) -> f64 {
        *self
    }
}

/// Cloneable bet handle; any clone may change the value between rounds.
#[derive(Debug, Clone)]
pub struct SharedBet(Arc<AtomicU64>);

impl SharedBet {
    pub fn new(amount: f64) -> Self {
        Self(Arc::new(AtomicU64::new(amount.to_bits())))
    }

    pub fn set(&self, amount: f64) {
        self.0.store(amount.to_bits(), Ordering::Relaxed);
    }
}

impl BetSource for SharedBet {
    fn current_bet(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_bet_changes_are_seen_by_every_clone() {
        let bet = SharedBet::new(1.0);
        let reader = bet.clone();
        assert_eq!(reader.current_bet(), 1.0);
        bet.set(2.5);
        assert_eq!(reader.current_bet(), 2.5);
    }

    #[test]
    fn memory_balance_credits_and_debits() {
        let mut balance = MemoryBalance::new(10.0);
        balance.debit(1.5);
        balance.credit(0.75);
        assert_eq!(balance.balance(), 9.25);
    }
}
