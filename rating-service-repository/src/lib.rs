//! # Rating Service Repository
//! This crate provides the storage interfaces the vote engine works against
//! and their implementations. It includes definitions for errors, the
//! `VoteStore` / `RatingLedger` / `TargetResolver` interfaces grouped into a
//! transactional `UnitOfWork`, a PostgreSQL backend and an in-memory backend.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VoteRepositoryError;
pub use interfaces::{RatingLedger, TargetResolver, UnitOfWork, VoteRepository, VoteStore};
pub use memory::{InMemoryVoteRepository, MemorySnapshot};
pub use postgres::PostgresVoteRepository;
