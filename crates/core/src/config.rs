use crate::PayoutTier;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Whether hit statistics survive across rounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatsScope {
    #[default]
    Round,
    Process,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    #[default]
    Uniform,
    Biased,
}

/// How a flipped slot decides which card it shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrawPolicy {
    #[default]
    Weighted,
    TableOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RtpRule {
    pub target_rtp: f64,
    pub stats_scope: StatsScope,
}

impl Default for RtpRule {
    fn default() -> Self {
        Self {
            target_rtp: 70.0,
            stats_scope: StatsScope::Round,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardRule {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub joker_bonus_flips: u32,
}

impl Default for RewardRule {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 0.75,
            high: 1.25,
            joker_bonus_flips: 2,
        }
    }
}

impl RewardRule {
    /// Multiplier for a tier. Jokers pay a flat bonus and special cards pay nothing here.
    pub fn multiplier(&self, tier: PayoutTier) -> Option<f64> {
        match tier {
            PayoutTier::Low => Some(self.low),
            PayoutTier::Medium => Some(self.medium),
            PayoutTier::High => Some(self.high),
            PayoutTier::Special | PayoutTier::Joker => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRule {
    pub min_hand_cards: u32,
    pub max_hand_cards: u32,
    pub table_cards_per_hand: u32,
    pub base_bet: f64,
    pub starting_balance: f64,
    pub shuffle: ShuffleMode,
    pub draw: DrawPolicy,
}

impl Default for RoundRule {
    fn default() -> Self {
        Self {
            min_hand_cards: 2,
            max_hand_cards: 5,
            table_cards_per_hand: 8,
            base_bet: 1.0,
            starting_balance: 5000.0,
            shuffle: ShuffleMode::Uniform,
            draw: DrawPolicy::Weighted,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CycleTiming {
    pub delay_before_total_ms: u64,
    pub delay_after_total_ms: u64,
    pub cycle_speed_ms: u64,
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            delay_before_total_ms: 2000,
            delay_after_total_ms: 1000,
            cycle_speed_ms: 500,
        }
    }
}

impl CycleTiming {
    pub fn delay_before_total(&self) -> Duration {
        Duration::from_millis(self.delay_before_total_ms)
    }

    pub fn delay_after_total(&self) -> Duration {
        Duration::from_millis(self.delay_after_total_ms)
    }

    pub fn cycle_speed(&self) -> Duration {
        Duration::from_millis(self.cycle_speed_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rtp: RtpRule,
    pub rewards: RewardRule,
    pub round: RoundRule,
    pub presentation: CycleTiming,
}

impl GameConfig {
    /// Clamp out-of-range values so draw-time code can rely on them.
    pub fn validated(mut self) -> Self {
        let target = self.rtp.target_rtp;
        let clamped = if target.is_nan() { 0.0 } else { target.clamp(0.0, 100.0) };
        if clamped != target {
            warn!(requested = target, applied = clamped, "target rtp out of range, clamped");
        }
        self.rtp.target_rtp = clamped;

        let round = &mut self.round;
        round.min_hand_cards = round.min_hand_cards.max(1);
        if round.max_hand_cards < round.min_hand_cards {
            warn!(
                min = round.min_hand_cards,
                max = round.max_hand_cards,
                "max hand cards below min, raised to min"
            );
            round.max_hand_cards = round.min_hand_cards;
        }
        if !(round.base_bet.is_finite() && round.base_bet >= 0.0) {
            warn!(base_bet = round.base_bet, "invalid base bet, reset to 0");
            round.base_bet = 0.0;
        }
        self
    }

    pub fn table_cards_for(&self, hand_cards: u32) -> usize {
        hand_cards as usize * self.round.table_cards_per_hand as usize
    }

    pub fn hand_size_allowed(&self, hand_cards: u32) -> bool {
        (self.round.min_hand_cards..=self.round.max_hand_cards).contains(&hand_cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_rtp_clamped_at_configuration_time() {
        let mut config = GameConfig::default();
        config.rtp.target_rtp = 180.0;
        assert_eq!(config.validated().rtp.target_rtp, 100.0);

        let mut config = GameConfig::default();
        config.rtp.target_rtp = -5.0;
        assert_eq!(config.validated().rtp.target_rtp, 0.0);

        let mut config = GameConfig::default();
        config.rtp.target_rtp = f64::NAN;
        assert_eq!(config.validated().rtp.target_rtp, 0.0);
    }

    #[test]
    fn hand_limits_are_ordered() {
        let mut config = GameConfig::default();
        config.round.min_hand_cards = 0;
        config.round.max_hand_cards = 0;
        let config = config.validated();
        assert_eq!(config.round.min_hand_cards, 1);
        assert_eq!(config.round.max_hand_cards, 1);
    }

    #[test]
    fn multiplier_table_matches_defaults() {
        let rules = RewardRule::default();
        assert_eq!(rules.multiplier(PayoutTier::Low), Some(0.5));
        assert_eq!(rules.multiplier(PayoutTier::Medium), Some(0.75));
        assert_eq!(rules.multiplier(PayoutTier::High), Some(1.25));
        assert_eq!(rules.multiplier(PayoutTier::Joker), None);
        assert_eq!(rules.multiplier(PayoutTier::Special), None);
    }

    #[test]
    fn table_size_scales_with_hand() {
        let config = GameConfig::default();
        assert_eq!(config.table_cards_for(3), 24);
        assert!(config.hand_size_allowed(2));
        assert!(config.hand_size_allowed(5));
        assert!(!config.hand_size_allowed(6));
    }
}
