use rating_service_shared::types::{Target, UserId};

use crate::errors::VoteRepositoryError;

/// Applies signed deltas to the denormalized rating counters.
///
/// Deltas are only ever derived from a vote mutation made in the same
/// `UnitOfWork`; the ledger never computes a rating on its own.
#[async_trait::async_trait]
pub trait RatingLedger: Send {
    /// Adds `delta` to a post's or comment's rating and returns the new value.
    ///
    /// Fails with `TargetNotFound` if the entity no longer exists.
    async fn adjust_entity_rating(
        &mut self,
        target: Target,
        delta: i64,
    ) -> Result<i64, VoteRepositoryError>;

    /// Adds `delta` to a user's rating and returns the new value.
    ///
    /// Fails with `UserNotFound` if the user no longer exists.
    async fn adjust_author_rating(
        &mut self,
        author_id: UserId,
        delta: i64,
    ) -> Result<i64, VoteRepositoryError>;
}
