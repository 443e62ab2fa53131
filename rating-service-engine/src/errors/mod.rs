//! Error types for the rating service engine.
mod vote;

pub use vote::VoteError;
