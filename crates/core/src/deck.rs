use crate::{biased_shuffle, Card, Rank, RngState, Suit};
use serde::{Deserialize, Serialize};

/// Read-only list of every card a round can use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub cards: Vec<Card>,
}

impl Catalog {
    pub fn standard(jokers: u32) -> Self {
        let mut cards = Vec::with_capacity(52 + jokers as usize);
        let mut next_id = 0u32;
        for suit in Suit::STANDARD {
            for rank in Rank::STANDARD {
                cards.push(Card::new(next_id, suit, rank));
                next_id += 1;
            }
        }
        for _ in 0..jokers {
            cards.push(Card::joker(next_id));
            next_id += 1;
        }
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard(2)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            cards: catalog.cards.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn shuffle(&mut self, rng: &mut RngState) {
        rng.shuffle(&mut self.cards);
    }

    pub fn biased_shuffle(&mut self, target_rtp: f64, rng: &mut RngState) {
        biased_shuffle(&mut self.cards, target_rtp, rng);
    }

    /// Deal up to `count` cards for the player hand, skipping jokers.
    pub fn deal_hand(&mut self, count: usize) -> Vec<Card> {
        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(pos) = self.cards.iter().position(|card| !card.is_joker) else {
                break;
            };
            cards.push(self.cards.remove(pos));
        }
        cards
    }

    /// Lay up to `count` cards from the front of the deck.
    pub fn deal_table(&mut self, count: usize) -> Vec<Card> {
        let count = count.min(self.cards.len());
        self.cards.drain(..count).collect()
    }
}
