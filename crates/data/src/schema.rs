use serde::{Deserialize, Serialize};

pub use flipcard_core::{
    BalanceStore, Card, Catalog, CycleTiming, DrawPolicy, GameConfig, Rank, RewardRule, RoundRule,
    RtpRule, ShuffleMode, StatsScope, Suit,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDef {
    pub suit: Suit,
    pub rank: Rank,
}

/// `cards.json` either lists every card or asks for the standard deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogFile {
    Standard { jokers: u32 },
    Cards(Vec<CardDef>),
}
