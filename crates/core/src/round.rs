use crate::{
    BalanceStore, BetSource, Card, Catalog, CycleStatus, Deck, DrawError, DrawPolicy, Event,
    EventBus, FlipChances, FlipUse, GameConfig, HandRanks, HandState, PlayerHand, RevealOutcome,
    RewardLedger, RngState, RtpEngine, RtpStats, ShuffleMode,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RoundError {
    #[error("hand size {requested} outside {min}..={max}")]
    InvalidHandSize { requested: u32, min: u32, max: u32 },
    #[error("bet {bet} is not a usable amount")]
    InvalidBet { bet: f64 },
    #[error("not enough balance to play: have {balance:.2}, need {bet:.2}")]
    InsufficientBalance { balance: f64, bet: f64 },
    #[error("cards are still being dealt")]
    Animating,
    #[error(transparent)]
    Draw(#[from] DrawError),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSlot {
    pub card: Card,
    pub face_up: bool,
}

/// What a successful flip did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal {
    pub slot: usize,
    pub card: Card,
    pub outcome: Option<RevealOutcome>,
    pub flip: FlipUse,
}

/// One player's table: deck, hand, hidden cards and every engine component,
/// wired together with the balance and bet collaborators it was given.
#[derive(Debug)]
pub struct FlipTable<B, S> {
    config: GameConfig,
    catalog: Catalog,
    rng: RngState,
    deck: Deck,
    hand: HandState,
    table: Vec<TableSlot>,
    rtp: RtpEngine,
    ledger: RewardLedger,
    flips: FlipChances,
    balance: B,
    bet: S,
    animating: bool,
    round_bet: f64,
    events: EventBus,
}

impl<B: BalanceStore, S: BetSource> FlipTable<B, S> {
    pub fn new(config: GameConfig, catalog: Catalog, balance: B, bet: S, rng: RngState) -> Self {
        let config = config.validated();
        let rtp = RtpEngine::new(&config.rtp);
        let ledger = RewardLedger::new(config.rewards.clone(), config.presentation);
        Self {
            config,
            catalog,
            rng,
            deck: Deck::default(),
            hand: HandState::NotReady,
            table: Vec::new(),
            rtp,
            ledger,
            flips: FlipChances::new(),
            balance,
            bet,
            animating: false,
            round_bet: 0.0,
            events: EventBus::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn hand(&self) -> &HandState {
        &self.hand
    }

    pub fn table(&self) -> &[TableSlot] {
        &self.table
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn flips(&self) -> &FlipChances {
        &self.flips
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    pub fn rtp(&self) -> &RtpEngine {
        &self.rtp
    }

    pub fn stats(&self) -> RtpStats {
        self.rtp.stats()
    }

    pub fn current_balance(&self) -> f64 {
        self.balance.balance()
    }

    pub fn bet(&self) -> &S {
        &self.bet
    }

    pub fn current_bet(&self) -> f64 {
        self.bet.current_bet()
    }

    pub fn set_target_rtp(&mut self, value: f64) {
        self.rtp.set_target_rtp(value);
        self.config.rtp.target_rtp = self.rtp.target_rtp();
    }

    /// Gate owned by the presentation layer. Reveals are refused while set.
    pub fn set_animating(&mut self, value: bool) {
        self.animating = value;
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn can_flip(&self) -> bool {
        self.flips.can_flip(self.animating)
    }

    pub fn face_down_slots(&self) -> Vec<usize> {
        self.table
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.face_up)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain().collect()
    }

    pub fn start_round(&mut self, selected: u32) -> Result<(), RoundError> {
        if self.animating {
            return Err(RoundError::Animating);
        }
        if !self.config.hand_size_allowed(selected) {
            return Err(RoundError::InvalidHandSize {
                requested: selected,
                min: self.config.round.min_hand_cards,
                max: self.config.round.max_hand_cards,
            });
        }
        let bet = self.bet.current_bet();
        if !bet.is_finite() || bet < 0.0 {
            warn!(bet, "bet source returned an unusable amount");
            return Err(RoundError::InvalidBet { bet });
        }
        let balance = self.balance.balance();
        if balance < bet {
            warn!(balance, bet, "not enough balance to play");
            return Err(RoundError::InsufficientBalance { balance, bet });
        }

        self.animating = true;
        self.balance.debit(bet);
        self.events.push(Event::BalanceChanged {
            balance: self.balance.balance(),
        });
        self.rtp.register_bet(bet);
        self.round_bet = bet;
        self.flips.start_round(selected, &mut self.ledger, &mut self.events);
        self.hand = HandState::NotReady;

        self.deck = Deck::from_catalog(&self.catalog);
        match self.config.round.shuffle {
            ShuffleMode::Uniform => self.deck.shuffle(&mut self.rng),
            ShuffleMode::Biased => self.deck.biased_shuffle(self.rtp.target_rtp(), &mut self.rng),
        }
        let hand_cards = self.deck.deal_hand(selected as usize);
        if hand_cards.len() < selected as usize {
            warn!(
                requested = selected,
                dealt = hand_cards.len(),
                "catalog ran out of non-joker cards for the hand"
            );
        }
        let table_cards = self.deck.deal_table(self.config.table_cards_for(selected));
        self.rtp.initialize(&table_cards, HandRanks::from_cards(&hand_cards));
        self.table = table_cards
            .into_iter()
            .map(|card| TableSlot {
                card,
                face_up: false,
            })
            .collect();
        self.events.push(Event::RoundStarted {
            hand_cards: hand_cards.len(),
            table_cards: self.table.len(),
            bet,
            balance: self.balance.balance(),
        });
        self.hand = HandState::Ready(PlayerHand::new(hand_cards));
        self.animating = false;
        info!(
            selected,
            bet,
            table = self.table.len(),
            target_rtp = self.rtp.target_rtp(),
            "round started"
        );
        Ok(())
    }

    /// Reveal the card under `slot`.
    ///
    /// Refused flips (no chances, animating, bad or already-open slot) log a
    /// warning and return `Ok(None)`. Running out of hidden cards while chances
    /// remain is reported as [`DrawError::NoCardAvailable`].
    pub fn flip(&mut self, slot: usize) -> Result<Option<Reveal>, RoundError> {
        if !self.can_flip() {
            warn!(
                slot,
                remaining = self.flips.remaining(),
                animating = self.animating,
                "flip not allowed"
            );
            return Ok(None);
        }
        if self.rtp.remaining().is_empty() {
            return Err(DrawError::NoCardAvailable.into());
        }
        match self.table.get(slot) {
            None => {
                warn!(slot, table = self.table.len(), "no such table slot");
                return Ok(None);
            }
            Some(existing) if existing.face_up => {
                warn!(slot, "table slot already revealed");
                return Ok(None);
            }
            Some(_) => {}
        }

        let card = match self.config.round.draw {
            DrawPolicy::Weighted => {
                let card = self.rtp.draw_next(&mut self.rng)?;
                if let Some(from) = self
                    .table
                    .iter()
                    .position(|other| !other.face_up && other.card.id == card.id)
                {
                    self.table.swap(from, slot);
                }
                card
            }
            DrawPolicy::TableOrder => self.rtp.take(self.table[slot].card.id)?,
        };
        self.table[slot].face_up = true;
        self.events.push(Event::CardRevealed { slot, card });

        let mut bet = self.bet.current_bet();
        if !bet.is_finite() || bet < 0.0 {
            warn!(bet, fallback = self.round_bet, "unusable bet at reveal, using the round's bet");
            bet = self.round_bet;
        }
        let outcome =
            self.ledger.on_reveal(&card, &self.hand, bet, &mut self.flips, &mut self.events);
        let flip =
            self.flips.use_flip_chance(&mut self.ledger, &mut self.balance, &mut self.events);
        if let FlipUse::Settled { payout } = flip {
            self.rtp.register_win(payout);
        }
        Ok(Some(Reveal {
            slot,
            card,
            outcome,
            flip,
        }))
    }

    /// Advance the reward presentation clock.
    pub fn tick(&mut self, elapsed: Duration) -> CycleStatus {
        self.ledger.advance_cycle(elapsed, &mut self.events)
    }

    pub fn stop_cycle(&mut self) {
        self.ledger.stop_cycle();
    }
}
