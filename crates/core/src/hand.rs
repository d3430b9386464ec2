use crate::{Card, Rank};
use std::collections::BTreeSet;

/// Distinct ranks held by the player for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandRanks(BTreeSet<Rank>);

impl HandRanks {
    pub fn from_cards(cards: &[Card]) -> Self {
        Self(cards.iter().map(|card| card.rank).collect())
    }

    pub fn contains(&self, rank: Rank) -> bool {
        self.0.contains(&rank)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// The player's hand once dealing has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerHand {
    cards: Vec<Card>,
    ranks: HandRanks,
}

impl PlayerHand {
    pub fn new(cards: Vec<Card>) -> Self {
        let ranks = HandRanks::from_cards(&cards);
        Self { cards, ranks }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn ranks(&self) -> &HandRanks {
        &self.ranks
    }

    /// Hand cards sharing `rank`; duplicates each count.
    pub fn match_count(&self, rank: Rank) -> usize {
        self.cards.iter().filter(|card| card.rank == rank).count()
    }
}

/// Reveals are only scored against a hand that has finished dealing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HandState {
    #[default]
    NotReady,
    Ready(PlayerHand),
}

impl HandState {
    pub fn ready(&self) -> Option<&PlayerHand> {
        match self {
            HandState::Ready(hand) => Some(hand),
            HandState::NotReady => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, HandState::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Suit;

    #[test]
    fn duplicate_ranks_collapse_in_set_but_count_for_matches() {
        let hand = PlayerHand::new(vec![
            Card::new(1, Suit::Clubs, Rank::Seven),
            Card::new(2, Suit::Diamonds, Rank::Seven),
            Card::new(3, Suit::Hearts, Rank::Queen),
        ]);
        assert_eq!(hand.ranks().len(), 2);
        assert_eq!(hand.match_count(Rank::Seven), 2);
        assert_eq!(hand.match_count(Rank::Queen), 1);
        assert_eq!(hand.match_count(Rank::Two), 0);
    }

    #[test]
    fn not_ready_exposes_no_hand() {
        let state = HandState::NotReady;
        assert!(state.ready().is_none());
        assert!(!state.is_ready());
    }
}
