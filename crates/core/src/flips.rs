use crate::{BalanceStore, Event, EventBus, RewardLedger};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FlipPhase {
    #[default]
    Idle,
    RoundActive,
    RoundSettling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlipUse {
    /// No chance was left; nothing changed.
    Ignored,
    Used { remaining: u32 },
    /// The last chance was spent and the round paid out `payout`.
    Settled { payout: f64 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlipChances {
    remaining: u32,
    phase: FlipPhase,
}

impl FlipChances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> FlipPhase {
        self.phase
    }

    pub fn start_round(&mut self, selected: u32, ledger: &mut RewardLedger, events: &mut EventBus) {
        ledger.reset_rewards(events);
        self.remaining = selected;
        self.phase = FlipPhase::RoundActive;
        self.emit_text(events);
    }

    /// `is_animating` comes from the presentation layer; no reveal runs while it is set.
    pub fn can_flip(&self, is_animating: bool) -> bool {
        self.remaining > 0 && !is_animating
    }

    pub fn use_flip_chance(
        &mut self,
        ledger: &mut RewardLedger,
        balance: &mut dyn BalanceStore,
        events: &mut EventBus,
    ) -> FlipUse {
        if self.remaining == 0 {
            warn!("flip chance used with none remaining, ignored");
            return FlipUse::Ignored;
        }
        self.remaining -= 1;
        self.emit_text(events);
        if self.remaining > 0 {
            return FlipUse::Used {
                remaining: self.remaining,
            };
        }
        self.phase = FlipPhase::RoundSettling;
        info!("all flips used, settling round");
        let payout = ledger.calculate_rewards(balance, events);
        FlipUse::Settled { payout }
    }

    /// Bonus chances; a settling round becomes active again.
    pub fn add_extra_flips(&mut self, amount: u32, events: &mut EventBus) {
        self.remaining = self.remaining.saturating_add(amount);
        if self.phase == FlipPhase::RoundSettling && self.remaining > 0 {
            self.phase = FlipPhase::RoundActive;
        }
        info!(amount, remaining = self.remaining, "bonus flips added");
        self.emit_text(events);
    }

    pub fn flip_text(&self) -> String {
        if self.remaining > 0 {
            format!("Flips Left: {}", self.remaining)
        } else {
            "Flips Over".to_string()
        }
    }

    fn emit_text(&self, events: &mut EventBus) {
        events.push(Event::FlipText {
            text: self.flip_text(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CycleTiming, MemoryBalance, RewardRule};

    fn fixtures() -> (FlipChances, RewardLedger, MemoryBalance, EventBus) {
        (
            FlipChances::new(),
            RewardLedger::new(RewardRule::default(), CycleTiming::default()),
            MemoryBalance::new(100.0),
            EventBus::default(),
        )
    }

    #[test]
    fn bonus_mid_round_delays_single_settlement() {
        let (mut flips, mut ledger, mut balance, mut events) = fixtures();
        flips.start_round(5, &mut ledger, &mut events);
        let mut settlements = Vec::new();
        for call in 1..=9 {
            let used = flips.use_flip_chance(&mut ledger, &mut balance, &mut events);
            if matches!(used, FlipUse::Settled { .. }) {
                settlements.push(call);
            }
            if call == 3 {
                flips.add_extra_flips(2, &mut events);
            }
        }
        assert_eq!(settlements, vec![7]);
        assert_eq!(flips.remaining(), 0);
        assert_eq!(flips.phase(), FlipPhase::RoundSettling);
    }

    #[test]
    fn spent_round_ignores_further_use() {
        let (mut flips, mut ledger, mut balance, mut events) = fixtures();
        flips.start_round(1, &mut ledger, &mut events);
        assert!(matches!(
            flips.use_flip_chance(&mut ledger, &mut balance, &mut events),
            FlipUse::Settled { .. }
        ));
        assert_eq!(
            flips.use_flip_chance(&mut ledger, &mut balance, &mut events),
            FlipUse::Ignored
        );
        assert_eq!(flips.remaining(), 0);
    }

    #[test]
    fn bonus_reopens_a_settling_round() {
        let (mut flips, mut ledger, mut balance, mut events) = fixtures();
        flips.start_round(1, &mut ledger, &mut events);
        flips.use_flip_chance(&mut ledger, &mut balance, &mut events);
        assert_eq!(flips.phase(), FlipPhase::RoundSettling);
        flips.add_extra_flips(2, &mut events);
        assert_eq!(flips.phase(), FlipPhase::RoundActive);
        assert!(flips.can_flip(false));
    }

    #[test]
    fn animation_gate_blocks_flipping() {
        let (mut flips, mut ledger, _, mut events) = fixtures();
        assert!(!flips.can_flip(false));
        flips.start_round(2, &mut ledger, &mut events);
        assert!(flips.can_flip(false));
        assert!(!flips.can_flip(true));
    }

    #[test]
    fn flip_text_tracks_remaining() {
        let (mut flips, mut ledger, mut balance, mut events) = fixtures();
        flips.start_round(2, &mut ledger, &mut events);
        assert_eq!(flips.flip_text(), "Flips Left: 2");
        flips.use_flip_chance(&mut ledger, &mut balance, &mut events);
        flips.use_flip_chance(&mut ledger, &mut balance, &mut events);
        assert_eq!(flips.flip_text(), "Flips Over");
        let last_text = events
            .drain()
            .filter_map(|event| match event {
                Event::FlipText { text } => Some(text),
                _ => None,
            })
            .last();
        assert_eq!(last_text.as_deref(), Some("Flips Over"));
    }
}
