//! This module defines and re-exports the interfaces for the vote repository.
//! It serves as a central point for accessing traits related to vote storage,
//! rating propagation and target lookup.
mod rating_ledger;
mod repository;
mod target_resolver;
mod vote_store;

pub use rating_ledger::RatingLedger;
pub use repository::{UnitOfWork, VoteRepository};
pub use target_resolver::TargetResolver;
pub use vote_store::VoteStore;
