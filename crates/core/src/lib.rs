//! Core flip-game logic. Keep this crate free of IO and platform concerns.

pub mod balance;
pub mod cards;
pub mod config;
pub mod cycle;
pub mod deck;
pub mod events;
pub mod flips;
pub mod hand;
pub mod ledger;
pub mod rng;
pub mod round;
pub mod rtp;
pub mod shuffle;

pub use balance::*;
pub use cards::*;
pub use config::*;
pub use cycle::*;
pub use deck::*;
pub use events::*;
pub use flips::*;
pub use hand::*;
pub use ledger::*;
pub use rng::*;
pub use round::*;
pub use rtp::*;
pub use shuffle::*;
