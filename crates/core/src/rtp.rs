//! Rank-biased draw engine and return-to-player bookkeeping.
//!
//! Two independent statistics live here. The hit rate counts how often a drawn
//! card matches a hand rank and is what `target_rtp` steers per draw. The
//! monetary RTP is earned over wagered and only moves through
//! [`RtpEngine::register_bet`] and [`RtpEngine::register_win`].

use crate::{Card, HandRanks, RngState, RtpRule, StatsScope};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    #[error("no card available")]
    NoCardAvailable,
    #[error("card {0} is not in the draw pool")]
    NotInPool(u32),
}

/// Read-only snapshot of both statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RtpStats {
    pub target_rtp: f64,
    pub total_flips: u64,
    pub total_hits: u64,
    pub actual_hit_rate: f64,
    pub total_bet: f64,
    pub total_earned: f64,
    pub current_rtp: f64,
}

#[derive(Debug, Clone)]
pub struct RtpEngine {
    target_rtp: f64,
    scope: StatsScope,
    pool: Vec<Card>,
    hand_ranks: HandRanks,
    total_flips: u64,
    total_hits: u64,
    total_bet: f64,
    total_earned: f64,
}

impl RtpEngine {
    pub fn new(rule: &RtpRule) -> Self {
        let mut engine = Self {
            target_rtp: 0.0,
            scope: rule.stats_scope,
            pool: Vec::new(),
            hand_ranks: HandRanks::default(),
            total_flips: 0,
            total_hits: 0,
            total_bet: 0.0,
            total_earned: 0.0,
        };
        engine.set_target_rtp(rule.target_rtp);
        engine
    }

    /// Clamped into `[0, 100]`; draws rely on that range.
    pub fn set_target_rtp(&mut self, value: f64) {
        self.target_rtp = if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) };
    }

    pub fn target_rtp(&self) -> f64 {
        self.target_rtp
    }

    /// Snapshot the draw pool and hand ranks for a new round.
    pub fn initialize(&mut self, deck: &[Card], hand_ranks: HandRanks) {
        self.pool = deck.to_vec();
        self.hand_ranks = hand_ranks;
        if self.scope == StatsScope::Round {
            self.total_flips = 0;
            self.total_hits = 0;
        }
    }

    pub fn remaining(&self) -> &[Card] {
        &self.pool
    }

    pub fn draw_next(&mut self, rng: &mut RngState) -> Result<Card, DrawError> {
        if self.pool.is_empty() {
            return Err(DrawError::NoCardAvailable);
        }
        let roll = rng.roll_percent();
        let favour_match = roll < self.target_rtp && !self.hand_ranks.is_empty();

        let mut index = None;
        if favour_match {
            index = pick_where(&self.pool, rng, |card| self.hand_ranks.contains(card.rank));
        }
        let index = match index {
            Some(index) => index,
            None => pick_where(&self.pool, rng, |card| !self.hand_ranks.contains(card.rank))
                .unwrap_or_else(|| rng.index(self.pool.len())),
        };

        let card = self.pool.remove(index);
        self.record(card);
        debug!(
            roll,
            favour_match,
            card = %card.name(),
            remaining = self.pool.len(),
            "rtp draw"
        );
        Ok(card)
    }

    /// Remove a specific card chosen by the caller, counting it like a draw.
    pub fn take(&mut self, card_id: u32) -> Result<Card, DrawError> {
        if self.pool.is_empty() {
            return Err(DrawError::NoCardAvailable);
        }
        let index = self
            .pool
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(DrawError::NotInPool(card_id))?;
        let card = self.pool.remove(index);
        self.record(card);
        Ok(card)
    }

    fn record(&mut self, card: Card) {
        self.total_flips += 1;
        if self.hand_ranks.contains(card.rank) {
            self.total_hits += 1;
        }
    }

    /// Negative or non-finite amounts are ignored so both totals only grow.
    pub fn register_bet(&mut self, amount: f64) {
        if usable_amount(amount) {
            self.total_bet += amount;
        } else {
            warn!(amount, "bet not registered");
        }
    }

    pub fn register_win(&mut self, amount: f64) {
        if usable_amount(amount) {
            self.total_earned += amount;
        } else {
            warn!(amount, "win not registered");
        }
    }

    pub fn total_flips(&self) -> u64 {
        self.total_flips
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn actual_hit_rate(&self) -> f64 {
        if self.total_flips == 0 {
            0.0
        } else {
            self.total_hits as f64 * 100.0 / self.total_flips as f64
        }
    }

    pub fn total_bet(&self) -> f64 {
        self.total_bet
    }

    pub fn total_earned(&self) -> f64 {
        self.total_earned
    }

    pub fn current_rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            self.total_earned * 100.0 / self.total_bet
        } else {
            0.0
        }
    }

    pub fn stats(&self) -> RtpStats {
        RtpStats {
            target_rtp: self.target_rtp,
            total_flips: self.total_flips,
            total_hits: self.total_hits,
            actual_hit_rate: self.actual_hit_rate(),
            total_bet: self.total_bet,
            total_earned: self.total_earned,
            current_rtp: self.current_rtp(),
        }
    }
}

fn usable_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

fn pick_where<F>(pool: &[Card], rng: &mut RngState, keep: F) -> Option<usize>
where
    F: Fn(&Card) -> bool,
{
    let candidates: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, card)| keep(card))
        .map(|(index, _)| index)
        .collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.index(candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, Rank, Suit};

    fn engine(target: f64) -> RtpEngine {
        RtpEngine::new(&RtpRule {
            target_rtp: target,
            stats_scope: StatsScope::Round,
        })
    }

    fn ranks(list: &[Rank]) -> HandRanks {
        let cards: Vec<Card> = list
            .iter()
            .enumerate()
            .map(|(i, rank)| Card::new(1000 + i as u32, Suit::Hearts, *rank))
            .collect();
        HandRanks::from_cards(&cards)
    }

    #[test]
    fn full_target_always_hits_while_matches_remain() {
        let deck = Catalog::standard(0).cards;
        let mut rtp = engine(100.0);
        rtp.initialize(&deck, ranks(&[Rank::Seven]));
        let mut rng = RngState::from_seed(5);
        for _ in 0..4 {
            let card = rtp.draw_next(&mut rng).expect("draw");
            assert_eq!(card.rank, Rank::Seven);
        }
        let card = rtp.draw_next(&mut rng).expect("draw");
        assert_ne!(card.rank, Rank::Seven);
        assert_eq!(rtp.total_hits(), 4);
        assert_eq!(rtp.total_flips(), 5);
        assert_eq!(rtp.actual_hit_rate(), 80.0);
    }

    #[test]
    fn zero_target_never_hits_while_misses_remain() {
        let deck = Catalog::standard(0).cards;
        let mut rtp = engine(0.0);
        rtp.initialize(&deck, ranks(&[Rank::Ace, Rank::King]));
        let mut rng = RngState::from_seed(9);
        for _ in 0..44 {
            let card = rtp.draw_next(&mut rng).expect("draw");
            assert!(card.rank != Rank::Ace && card.rank != Rank::King);
        }
        // only matching cards remain; fallback still yields a card
        let card = rtp.draw_next(&mut rng).expect("draw");
        assert!(card.rank == Rank::Ace || card.rank == Rank::King);
        assert_eq!(rtp.total_hits(), 1);
    }

    #[test]
    fn empty_hand_draws_uniformly_without_hits() {
        let deck = Catalog::standard(2).cards;
        let mut rtp = engine(100.0);
        rtp.initialize(&deck, HandRanks::default());
        let mut rng = RngState::from_seed(2);
        for _ in 0..10 {
            rtp.draw_next(&mut rng).expect("draw");
        }
        assert_eq!(rtp.total_hits(), 0);
        assert_eq!(rtp.actual_hit_rate(), 0.0);
    }

    #[test]
    fn draining_the_pool_then_failing() {
        let deck: Vec<Card> = Catalog::standard(1).cards.into_iter().take(7).collect();
        let mut rtp = engine(70.0);
        rtp.initialize(&deck, ranks(&[Rank::Ace]));
        let mut rng = RngState::from_seed(11);
        let mut drawn = Vec::new();
        for _ in 0..7 {
            drawn.push(rtp.draw_next(&mut rng).expect("draw").id);
        }
        drawn.sort_unstable();
        drawn.dedup();
        assert_eq!(drawn.len(), 7);
        assert!(rtp.remaining().is_empty());
        assert_eq!(rtp.draw_next(&mut rng), Err(DrawError::NoCardAvailable));
        assert_eq!(rtp.total_flips(), 7);
    }

    #[test]
    fn flips_split_into_hits_and_misses() {
        let deck = Catalog::default().cards;
        let mut rtp = engine(55.0);
        let hand = ranks(&[Rank::Two, Rank::Nine, Rank::Queen]);
        rtp.initialize(&deck, hand.clone());
        let mut rng = RngState::from_seed(21);
        let mut misses = 0;
        for _ in 0..30 {
            let card = rtp.draw_next(&mut rng).expect("draw");
            if !hand.contains(card.rank) {
                misses += 1;
            }
            let rate = rtp.actual_hit_rate();
            assert!((0.0..=100.0).contains(&rate));
        }
        assert_eq!(rtp.total_flips(), rtp.total_hits() + misses);
    }

    #[test]
    fn take_removes_named_card_and_counts_it() {
        let deck = Catalog::standard(0).cards;
        let target = deck[6];
        let mut rtp = engine(50.0);
        rtp.initialize(&deck, ranks(&[target.rank]));
        assert_eq!(rtp.take(target.id), Ok(target));
        assert_eq!(rtp.take(target.id), Err(DrawError::NotInPool(target.id)));
        assert_eq!(rtp.total_hits(), 1);
        assert_eq!(rtp.remaining().len(), 51);
    }

    #[test]
    fn monetary_rtp_is_independent_of_hit_rate() {
        let mut rtp = engine(70.0);
        assert_eq!(rtp.current_rtp(), 0.0);
        rtp.register_win(3.0);
        assert_eq!(rtp.current_rtp(), 0.0);
        rtp.register_bet(4.0);
        assert_eq!(rtp.current_rtp(), 75.0);
        rtp.register_bet(2.0);
        rtp.register_win(1.5);
        assert_eq!(rtp.current_rtp(), 75.0);
        assert_eq!(rtp.actual_hit_rate(), 0.0);
        assert_eq!(rtp.stats().total_flips, 0);
    }

    #[test]
    fn process_scope_keeps_counters_across_rounds() {
        let deck = Catalog::standard(0).cards;
        let mut rtp = RtpEngine::new(&RtpRule {
            target_rtp: 100.0,
            stats_scope: StatsScope::Process,
        });
        let mut rng = RngState::from_seed(4);
        rtp.initialize(&deck, ranks(&[Rank::Five]));
        rtp.draw_next(&mut rng).expect("draw");
        rtp.initialize(&deck, ranks(&[Rank::Five]));
        rtp.draw_next(&mut rng).expect("draw");
        assert_eq!(rtp.total_flips(), 2);

        let mut round = engine(100.0);
        round.initialize(&deck, ranks(&[Rank::Five]));
        round.draw_next(&mut rng).expect("draw");
        round.initialize(&deck, ranks(&[Rank::Five]));
        assert_eq!(round.total_flips(), 0);
        assert_eq!(round.actual_hit_rate(), 0.0);
    }

    #[test]
    fn unusable_amounts_leave_totals_untouched() {
        let mut rtp = engine(70.0);
        rtp.register_bet(2.0);
        rtp.register_win(1.0);
        rtp.register_bet(-5.0);
        rtp.register_bet(f64::NAN);
        rtp.register_win(f64::INFINITY);
        rtp.register_win(-1.0);
        assert_eq!(rtp.total_bet(), 2.0);
        assert_eq!(rtp.total_earned(), 1.0);
        assert_eq!(rtp.current_rtp(), 50.0);
    }

    #[test]
    fn target_is_clamped_when_set() {
        let mut rtp = engine(150.0);
        assert_eq!(rtp.target_rtp(), 100.0);
        rtp.set_target_rtp(-1.0);
        assert_eq!(rtp.target_rtp(), 0.0);
    }
}
