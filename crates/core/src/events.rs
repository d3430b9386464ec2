use crate::Card;
use serde::{Deserialize, Serialize};

/// Everything the surrounding application needs to render a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RoundStarted {
        hand_cards: usize,
        table_cards: usize,
        bet: f64,
        balance: f64,
    },
    CardRevealed { slot: usize, card: Card },
    RewardText { message: String, amount: String },
    FlipText { text: String },
    BalanceChanged { balance: f64 },
    RoundSettled { total_reward: f64, balance: f64 },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn reward_text(&mut self, message: impl Into<String>, amount: impl Into<String>) {
        self.push(Event::RewardText {
            message: message.into(),
            amount: amount.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
