//! Error types for the rating service repository.
//! Consolidates and re-exports error types related to vote storage operations.
mod vote_repository;

pub use vote_repository::VoteRepositoryError;
