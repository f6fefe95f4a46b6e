//! Game simulation modules

pub mod input;
pub mod math;
pub mod r#match;
pub mod phase;
pub mod snapshot;
pub mod state;

pub use r#match::{DisconnectPolicy, GameRules, MatchHandle};
