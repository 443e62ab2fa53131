//! # Rating Service Shared
//! This crate defines the data structures shared across the rating service:
//! vote targets, votes and their kinds, duplicate-vote policies and the
//! arithmetic that turns votes into rating contributions.
pub mod types;
