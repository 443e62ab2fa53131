//! # Rating Service Engine
//! This crate holds the vote engine: the only writer of vote state, which
//! applies every vote mutation together with its rating deltas in one unit of
//! work. It also defines the domain error taxonomy surfaced to callers.
pub mod engine;
pub mod errors;

pub use engine::{CastOutcome, RetractOutcome, VoteEngine};
pub use errors::VoteError;
