//! PostgreSQL implementation of the rating service repository.
//!
//! Provides a production-ready PostgreSQL backend for the `VoteRepository`
//! trait with connection pooling and transaction safety.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`; each unit of work owns one
//!   pooled transaction and releases it on commit or drop
//! - Row locks (`FOR UPDATE`) on the target and the vote, always taken in
//!   that order
//! - Conflict detection through `ON CONFLICT DO NOTHING` so a racing insert
//!   does not poison the transaction
//! - Schema managed by `sqlx::migrate!`
//!
//! ## Database Tables
//!
//! - `likes`: one row per (entity_type, entity_id, author_id)
//! - `posts`, `comments`: rated entities with their `rating` counters
//! - `users`: authors with their aggregated `rating` counter
mod rows;
mod unit_of_work;
mod vote_repository;

pub use unit_of_work::PostgresUnitOfWork;
pub use vote_repository::PostgresVoteRepository;
