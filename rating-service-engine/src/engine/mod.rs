//! This module defines the `VoteEngine`, which casts and retracts votes and
//! propagates each change onto the target's and the author's rating.
//!
//! Every mutation runs inside one `UnitOfWork`: the target row is resolved
//! (and locked) first, then the vote row is read or written, then both
//! counters are adjusted by the same delta, and only then is the unit
//! committed. Returning early on any error drops the unit, which rolls
//! everything back.
mod outcome;

use std::sync::Arc;

use futures::TryStreamExt;
use rating_service_repository::{RatingLedger, TargetResolver, VoteRepository, VoteStore};
use rating_service_shared::types::{
    DuplicatePolicy, ReconcileReport, Target, UserId, Vote, VoteKey, VoteKind, VotePolicies,
    Voter, rating_delta,
};
use tracing::{debug, error, info, instrument};

use crate::errors::VoteError;

pub use outcome::{CastOutcome, RetractOutcome};

/// `VoteEngine` is the only writer of vote state.
///
/// It holds the repository it opens units of work on and the duplicate-vote
/// policy to apply per target type.
#[derive(Clone)]
pub struct VoteEngine {
    repository: Arc<dyn VoteRepository>,
    policies: VotePolicies,
}

impl VoteEngine {
    /// Creates a new `VoteEngine`.
    ///
    /// # Arguments
    ///
    /// * `repository` - Storage backend for votes and ratings
    /// * `policies` - Duplicate-vote policy per target type, used by `cast`
    pub fn new(repository: Arc<dyn VoteRepository>, policies: VotePolicies) -> Self {
        Self {
            repository,
            policies,
        }
    }

    pub fn policies(&self) -> VotePolicies {
        self.policies
    }

    /// Casts a vote using the policy configured for the target's type.
    pub async fn cast(&self, key: VoteKey, kind: VoteKind) -> Result<CastOutcome, VoteError> {
        let policy = self.policies.for_target(key.target.target_type);
        self.cast_with_policy(key, kind, policy).await
    }

    /// Casts a vote, refusing any repeat vote from the same voter even when
    /// the kind differs.
    pub async fn cast_strict(&self, key: VoteKey, kind: VoteKind) -> Result<CastOutcome, VoteError> {
        self.cast_with_policy(key, kind, DuplicatePolicy::Reject).await
    }

    /// Casts a vote, replacing a stored vote of the other kind. Repeating the
    /// stored kind is still a `DuplicateVote`.
    pub async fn cast_or_replace(
        &self,
        key: VoteKey,
        kind: VoteKind,
    ) -> Result<CastOutcome, VoteError> {
        self.cast_with_policy(key, kind, DuplicatePolicy::Replace).await
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn cast_with_policy(
        &self,
        key: VoteKey,
        kind: VoteKind,
        policy: DuplicatePolicy,
    ) -> Result<CastOutcome, VoteError> {
        let result = match self.try_cast(key, kind, policy).await {
            // The unit of work is gone by now, so this read sees committed state.
            Err(VoteError::Conflict(key)) => match self.repository.find_vote(&key).await {
                Ok(Some(_)) => Err(VoteError::DuplicateVote(key)),
                Ok(None) => Err(VoteError::Conflict(key)),
                Err(err) => Err(err.into()),
            },
            other => other,
        };

        match &result {
            Ok(outcome) => info!(
                previous = ?outcome.previous_kind,
                target_rating = outcome.target_rating,
                author_rating = outcome.author_rating,
                "Vote cast"
            ),
            Err(err) => log_failure(err, "Vote not cast"),
        }
        result
    }

    async fn try_cast(
        &self,
        key: VoteKey,
        kind: VoteKind,
        policy: DuplicatePolicy,
    ) -> Result<CastOutcome, VoteError> {
        let mut uow = self.repository.begin().await?;

        let info = uow
            .resolve(key.target)
            .await?
            .ok_or(VoteError::TargetNotFound(key.target))?;

        let (vote, previous_kind) = match uow.find(&key).await? {
            None => {
                let vote = Vote::new(key, kind);
                uow.insert(&vote).await?;
                (vote, None)
            }
            Some(existing) if existing.kind == kind || policy == DuplicatePolicy::Reject => {
                return Err(VoteError::DuplicateVote(key));
            }
            Some(existing) => {
                let vote = uow.update_kind(&key, kind).await?;
                (vote, Some(existing.kind))
            }
        };

        let delta = rating_delta(previous_kind, Some(kind));
        let target_rating = uow.adjust_entity_rating(key.target, delta).await?;
        let author_rating = uow.adjust_author_rating(info.author_id, delta).await?;
        uow.commit().await?;

        Ok(CastOutcome {
            vote,
            previous_kind,
            target_rating,
            author_rating,
        })
    }

    /// Removes the caller's vote and reverses its contribution.
    ///
    /// # Errors
    ///
    /// * `VoteNotFound` - No vote is stored under `key`; nothing changes
    /// * `TargetNotFound` - The vote exists but its target was deleted
    #[instrument(skip(self), fields(key = %key))]
    pub async fn retract(&self, key: VoteKey) -> Result<RetractOutcome, VoteError> {
        let result = self.try_retract(key).await;

        match &result {
            Ok(outcome) => info!(
                removed = %outcome.removed.kind,
                target_rating = outcome.target_rating,
                author_rating = outcome.author_rating,
                "Vote retracted"
            ),
            Err(err) => log_failure(err, "Vote not retracted"),
        }
        result
    }

    async fn try_retract(&self, key: VoteKey) -> Result<RetractOutcome, VoteError> {
        let mut uow = self.repository.begin().await?;

        // Resolved before touching the vote row to keep the target → vote lock order.
        let info = uow.resolve(key.target).await?;
        let removed = uow.remove(&key).await?;
        let info = info.ok_or(VoteError::TargetNotFound(key.target))?;

        let delta = rating_delta(Some(removed.kind), None);
        let target_rating = uow.adjust_entity_rating(key.target, delta).await?;
        let author_rating = uow.adjust_author_rating(info.author_id, delta).await?;
        uow.commit().await?;

        Ok(RetractOutcome {
            removed,
            target_rating,
            author_rating,
        })
    }

    /// Returns the committed rating of a post or comment.
    pub async fn rating_of(&self, target: Target) -> Result<i64, VoteError> {
        self.repository
            .resolve_target(target)
            .await?
            .map(|info| info.rating)
            .ok_or(VoteError::TargetNotFound(target))
    }

    /// Returns the committed rating of a user as an author.
    pub async fn author_rating_of(&self, user_id: UserId) -> Result<i64, VoteError> {
        self.repository
            .user_rating(user_id)
            .await?
            .ok_or(VoteError::UserNotFound(user_id))
    }

    /// Lists who voted on a target and how, oldest vote first.
    pub async fn voters_of(&self, target: Target) -> Result<Vec<Voter>, VoteError> {
        if self.repository.resolve_target(target).await?.is_none() {
            return Err(VoteError::TargetNotFound(target));
        }

        let voters: Vec<Voter> = self
            .repository
            .list_by_target(target)
            .map_ok(Voter::from)
            .try_collect()
            .await?;
        Ok(voters)
    }

    /// Recomputes all rating counters from the stored votes.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<ReconcileReport, VoteError> {
        let report = self.repository.reconcile_ratings().await.map_err(|err| {
            error!(error = %err, "Rating reconciliation failed");
            VoteError::from(err)
        })?;

        if report.is_clean() {
            info!("Ratings already consistent");
        } else {
            info!(
                entities = report.entities_corrected,
                users = report.users_corrected,
                "Ratings corrected"
            );
        }
        Ok(report)
    }
}

fn log_failure(err: &VoteError, message: &str) {
    if err.is_internal() {
        error!(error = %err, "{message}");
    } else {
        debug!(error = %err, "{message}");
    }
}
