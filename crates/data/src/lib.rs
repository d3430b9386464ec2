//! Data loading and persistence for the flip game.

pub mod load;
pub mod persistence;
pub mod schema;

pub use load::*;
pub use persistence::*;
pub use schema::*;
