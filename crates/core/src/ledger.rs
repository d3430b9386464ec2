use crate::{
    BalanceStore, Card, CancelToken, CycleStatus, CycleTiming, Event, EventBus, FlipChances,
    HandState, PresentationCycle, RewardRule,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MISS_MESSAGE: &str = "No Match!";
pub const MISS_AMOUNT: &str = "MISS";
pub const ROUND_REWARD_MESSAGE: &str = "Round Reward";

/// One line of the hit log, in display form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HitEntry {
    pub message: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum RevealOutcome {
    Joker { bonus_flips: u32, reward: f64 },
    Hit { matches: usize, per_match: f64, reward: f64 },
    Miss,
}

impl RevealOutcome {
    pub fn reward(&self) -> f64 {
        match self {
            RevealOutcome::Joker { reward, .. } | RevealOutcome::Hit { reward, .. } => *reward,
            RevealOutcome::Miss => 0.0,
        }
    }

    pub fn is_hit(&self) -> bool {
        !matches!(self, RevealOutcome::Miss)
    }
}

#[derive(Debug)]
pub struct RewardLedger {
    rules: RewardRule,
    timing: CycleTiming,
    total_reward: f64,
    credited: f64,
    hits: Vec<HitEntry>,
    cycle: Option<PresentationCycle>,
}

impl RewardLedger {
    pub fn new(rules: RewardRule, timing: CycleTiming) -> Self {
        Self {
            rules,
            timing,
            total_reward: 0.0,
            credited: 0.0,
            hits: Vec::new(),
            cycle: None,
        }
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Reward earned this round that no settlement has paid out yet.
    pub fn uncredited_reward(&self) -> f64 {
        self.total_reward - self.credited
    }

    pub fn hits(&self) -> &[HitEntry] {
        &self.hits
    }

    pub fn cycle_active(&self) -> bool {
        self.cycle
            .as_ref()
            .is_some_and(|cycle| cycle.status() == CycleStatus::Running)
    }

    pub fn cycle_token(&self) -> Option<CancelToken> {
        self.cycle.as_ref().map(PresentationCycle::cancel_token)
    }

    /// Score one revealed card against the hand. Returns `None` when the hand is not dealt yet.
    pub fn on_reveal(
        &mut self,
        card: &Card,
        hand: &HandState,
        base_bet: f64,
        flips: &mut FlipChances,
        events: &mut EventBus,
    ) -> Option<RevealOutcome> {
        let Some(hand) = hand.ready() else {
            warn!(card = %card.name(), "hand data not ready, reveal ignored");
            return None;
        };

        if card.is_joker {
            let bonus = self.rules.joker_bonus_flips;
            flips.add_extra_flips(bonus, events);
            self.total_reward += base_bet;
            let entry = HitEntry {
                message: format!("JOKER! +{bonus} Flips"),
                amount: format!("$ {}", format_money(base_bet)),
            };
            info!(bonus, reward = base_bet, "joker revealed");
            self.log_hit(entry, events);
            return Some(RevealOutcome::Joker {
                bonus_flips: bonus,
                reward: base_bet,
            });
        }

        let matches = hand.match_count(card.rank);
        if matches == 0 {
            debug!(card = %card.name(), tier = ?card.payout_tier, "miss");
            events.reward_text(MISS_MESSAGE, MISS_AMOUNT);
            return Some(RevealOutcome::Miss);
        }

        let multiplier = self.rules.multiplier(card.payout_tier).unwrap_or(0.0);
        let per_match = base_bet * multiplier;
        let reward = per_match * matches as f64;
        self.total_reward += reward;

        let message = if matches > 1 {
            format!("HIT! {} of {} ×{matches} Matches", card.rank, card.suit)
        } else {
            format!("HIT! {} of {} ×{matches}", card.rank, card.suit)
        };
        let amount = format!(
            "${} × {matches} = ${}",
            format_money(per_match),
            format_money(reward)
        );
        info!(%message, %amount, "hit");
        self.log_hit(HitEntry { message, amount }, events);
        Some(RevealOutcome::Hit {
            matches,
            per_match,
            reward,
        })
    }

    fn log_hit(&mut self, entry: HitEntry, events: &mut EventBus) {
        events.reward_text(entry.message.clone(), entry.amount.clone());
        self.hits.push(entry);
    }

    /// Credit the round total and start the presentation cycle.
    ///
    /// A round reopened by bonus flips settles again; only the part of the total
    /// not yet credited is paid, so the balance never sees the same reward twice.
    pub fn calculate_rewards(
        &mut self,
        balance: &mut dyn BalanceStore,
        events: &mut EventBus,
    ) -> f64 {
        let payout = self.total_reward - self.credited;
        self.credited = self.total_reward;
        info!(total = self.total_reward, payout, "round settled");
        self.add_reward_to_balance(payout, balance, events);
        events.push(Event::RoundSettled {
            total_reward: self.total_reward,
            balance: balance.balance(),
        });

        self.stop_cycle();
        self.cycle = Some(PresentationCycle::start(
            self.timing,
            self.total_reward,
            self.hits.clone(),
        ));
        payout
    }

    pub fn add_reward_to_balance(
        &self,
        reward: f64,
        balance: &mut dyn BalanceStore,
        events: &mut EventBus,
    ) {
        balance.credit(reward);
        events.push(Event::BalanceChanged {
            balance: balance.balance(),
        });
        events.reward_text(ROUND_REWARD_MESSAGE, format!("+${}", format_money(reward)));
    }

    pub fn advance_cycle(&mut self, elapsed: Duration, events: &mut EventBus) -> CycleStatus {
        match self.cycle.as_mut() {
            Some(cycle) => cycle.advance(elapsed, events),
            None => CycleStatus::Stopped,
        }
    }

    pub fn stop_cycle(&mut self) {
        if let Some(mut cycle) = self.cycle.take() {
            cycle.stop();
        }
    }

    /// Clear the round. Must run before the next round's first reveal.
    pub fn reset_rewards(&mut self, events: &mut EventBus) {
        self.stop_cycle();
        self.total_reward = 0.0;
        self.credited = 0.0;
        self.hits.clear();
        events.reward_text("", "");
        debug!("rewards reset");
    }
}

pub fn format_money(value: f64) -> String {
    format!("{value:.2}")
}
