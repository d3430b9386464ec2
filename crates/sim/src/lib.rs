//! Seeded headless simulator that plays many rounds against the core table API.

mod config;
mod error;
mod report;
mod simulator;

pub use config::*;
pub use error::*;
pub use report::*;
pub use simulator::*;
