use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
    Joker,
}

impl Suit {
    pub const STANDARD: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Joker,
}

impl Rank {
    pub const STANDARD: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Ordinal in the range 1 (Ace) to 14 (Joker).
    pub fn ordinal(self) -> u8 {
        match self {
            Rank::Ace => 1,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Joker => 14,
        }
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            1..=13 => Some(Self::STANDARD[usize::from(value - 1)]),
            14 => Some(Rank::Joker),
            _ => None,
        }
    }

    pub fn payout_tier(self) -> PayoutTier {
        match self {
            Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => PayoutTier::Low,
            Rank::Seven | Rank::Eight | Rank::Nine | Rank::Ten => PayoutTier::Medium,
            Rank::Jack | Rank::Queen | Rank::King | Rank::Ace => PayoutTier::High,
            Rank::Joker => PayoutTier::Joker,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PayoutTier {
    Low,
    Medium,
    High,
    /// No rank maps here; kept so tier tables can name it. Pays nothing.
    Special,
    Joker,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    /// Catalog index; distinguishes otherwise identical cards such as jokers.
    pub id: u32,
    pub suit: Suit,
    pub rank: Rank,
    pub payout_tier: PayoutTier,
    pub is_joker: bool,
}

impl Card {
    pub fn new(id: u32, suit: Suit, rank: Rank) -> Self {
        let is_joker = rank == Rank::Joker;
        Self {
            id,
            suit: if is_joker { Suit::Joker } else { suit },
            rank,
            payout_tier: rank.payout_tier(),
            is_joker,
        }
    }

    pub fn joker(id: u32) -> Self {
        Self::new(id, Suit::Joker, Rank::Joker)
    }

    pub fn name(&self) -> String {
        if self.is_joker {
            "Joker".to_string()
        } else {
            format!("{} of {}", self.rank, self.suit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_follow_rank() {
        assert_eq!(Card::new(0, Suit::Hearts, Rank::Two).payout_tier, PayoutTier::Low);
        assert_eq!(Card::new(0, Suit::Hearts, Rank::Six).payout_tier, PayoutTier::Low);
        assert_eq!(Card::new(0, Suit::Clubs, Rank::Seven).payout_tier, PayoutTier::Medium);
        assert_eq!(Card::new(0, Suit::Clubs, Rank::Ten).payout_tier, PayoutTier::Medium);
        assert_eq!(Card::new(0, Suit::Spades, Rank::Ace).payout_tier, PayoutTier::High);
        assert_eq!(Card::new(0, Suit::Spades, Rank::King).payout_tier, PayoutTier::High);
    }

    #[test]
    fn joker_rank_forces_joker_fields() {
        let card = Card::new(7, Suit::Hearts, Rank::Joker);
        assert!(card.is_joker);
        assert_eq!(card.suit, Suit::Joker);
        assert_eq!(card.payout_tier, PayoutTier::Joker);
        assert_eq!(card.name(), "Joker");
    }

    #[test]
    fn ordinals_roundtrip_through_lookup() {
        for value in 1..=14u8 {
            let rank = Rank::from_ordinal(value).expect("rank");
            assert_eq!(rank.ordinal(), value);
        }
        assert_eq!(Rank::from_ordinal(0), None);
        assert_eq!(Rank::from_ordinal(15), None);
    }

    #[test]
    fn names_read_naturally() {
        assert_eq!(Card::new(1, Suit::Spades, Rank::Seven).name(), "Seven of Spades");
    }
}
