//! This module defines the transactional entry points of the repository:
//! `UnitOfWork`, which groups vote storage, rating propagation and target
//! lookup behind one transaction, and `VoteRepository`, which opens units of
//! work and serves the read-only queries.
use futures::stream::BoxStream;
use rating_service_shared::types::{ReconcileReport, Target, TargetInfo, UserId, Vote, VoteKey};

use crate::errors::VoteRepositoryError;
use crate::interfaces::{RatingLedger, TargetResolver, VoteStore};

/// One atomic unit of vote mutation.
///
/// Every write made through the unit becomes visible together on `commit`.
/// Dropping the unit without committing discards all of them.
#[async_trait::async_trait]
pub trait UnitOfWork: VoteStore + RatingLedger + TargetResolver {
    /// Makes every write of this unit durable and visible at once.
    async fn commit(self: Box<Self>) -> Result<(), VoteRepositoryError>;
}

/// A trait that defines the interface for interacting with the vote data repository.
///
/// Implementors hand out `UnitOfWork`s for mutations and answer reads
/// against committed state.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Opens a new unit of work.
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn UnitOfWork>)` - A unit holding its own transaction
    /// * `Err(VoteRepositoryError)` - If no transaction could be started
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, VoteRepositoryError>;

    /// Reads the committed vote stored under `key`, without locking.
    async fn find_vote(&self, key: &VoteKey) -> Result<Option<Vote>, VoteRepositoryError>;

    /// Lazily lists the committed votes on `target`, oldest first.
    ///
    /// The stream is finite and cannot be restarted; a new call observes
    /// whatever has been committed in between.
    fn list_by_target(&self, target: Target) -> BoxStream<'_, Result<Vote, VoteRepositoryError>>;

    /// Reads a target's author and committed rating.
    async fn resolve_target(&self, target: Target) -> Result<Option<TargetInfo>, VoteRepositoryError>;

    /// Reads a user's committed rating.
    async fn user_rating(&self, user_id: UserId) -> Result<Option<i64>, VoteRepositoryError>;

    /// Recomputes every entity rating from the stored votes and every user
    /// rating from the entities they authored, rewriting counters that drifted.
    async fn reconcile_ratings(&self) -> Result<ReconcileReport, VoteRepositoryError>;
}
