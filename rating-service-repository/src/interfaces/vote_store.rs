//! This module defines the `VoteStore` trait: pure storage of one vote per
//! (target, voter) pair. No operation here touches a rating counter.
use rating_service_shared::types::{Vote, VoteKey, VoteKind};

use crate::errors::VoteRepositoryError;

/// Durable mapping from a `VoteKey` to the `Vote` stored under it.
///
/// Implementors run every call inside the transaction of the enclosing
/// `UnitOfWork`, so reads observe the unit's own writes.
#[async_trait::async_trait]
pub trait VoteStore: Send {
    /// Looks up the vote stored under `key`.
    ///
    /// Implementations lock the row for the rest of the unit of work when it
    /// exists, so a read-modify-write on one key cannot interleave with
    /// another.
    async fn find(&mut self, key: &VoteKey) -> Result<Option<Vote>, VoteRepositoryError>;

    /// Stores a new vote.
    ///
    /// # Errors
    ///
    /// Returns `VoteRepositoryError::Conflict` if a vote already exists for
    /// the same key.
    async fn insert(&mut self, vote: &Vote) -> Result<(), VoteRepositoryError>;

    /// Changes the kind of an existing vote in place and returns the updated vote.
    ///
    /// # Errors
    ///
    /// Returns `VoteRepositoryError::VoteNotFound` if there is no vote under `key`.
    async fn update_kind(
        &mut self,
        key: &VoteKey,
        kind: VoteKind,
    ) -> Result<Vote, VoteRepositoryError>;

    /// Deletes a vote and returns what was stored.
    ///
    /// # Errors
    ///
    /// Returns `VoteRepositoryError::VoteNotFound` if there is no vote under `key`.
    async fn remove(&mut self, key: &VoteKey) -> Result<Vote, VoteRepositoryError>;
}
