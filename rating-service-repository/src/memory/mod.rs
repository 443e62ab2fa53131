//! In-memory implementation of the vote repository.
//!
//! Used for local runs and tests. A unit of work holds the store's lock for
//! its whole lifetime and writes straight into the shared state, recording
//! the prior value of every row it touches. `commit` discards that undo log;
//! dropping the unit replays it backwards. Units of work are therefore fully
//! serialized and never observable half-applied.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use rating_service_shared::types::{
    ReconcileReport, Target, TargetId, TargetInfo, TargetType, UserId, Vote, VoteKey, VoteKind,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::errors::VoteRepositoryError;
use crate::interfaces::{RatingLedger, TargetResolver, UnitOfWork, VoteRepository, VoteStore};

#[derive(Clone, Copy, Debug)]
struct EntityRecord {
    author_id: UserId,
    rating: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    posts: HashMap<TargetId, EntityRecord>,
    comments: HashMap<TargetId, EntityRecord>,
    users: HashMap<UserId, i64>,
    votes: BTreeMap<VoteKey, Vote>,
}

impl MemoryState {
    fn entities(&self, target_type: TargetType) -> &HashMap<TargetId, EntityRecord> {
        match target_type {
            TargetType::Post => &self.posts,
            TargetType::Comment => &self.comments,
        }
    }

    fn entities_mut(&mut self, target_type: TargetType) -> &mut HashMap<TargetId, EntityRecord> {
        match target_type {
            TargetType::Post => &mut self.posts,
            TargetType::Comment => &mut self.comments,
        }
    }

    fn resolve(&self, target: Target) -> Option<TargetInfo> {
        self.entities(target.target_type)
            .get(&target.id)
            .map(|record| TargetInfo {
                target,
                author_id: record.author_id,
                rating: record.rating,
            })
    }

    fn votes_on(&self, target: Target) -> impl Iterator<Item = &Vote> {
        self.votes
            .range(VoteKey::new(target, UserId::MIN)..=VoteKey::new(target, UserId::MAX))
            .map(|(_, vote)| vote)
    }
}

/// A point-in-time copy of everything the in-memory store holds.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshot {
    pub entities: Vec<TargetInfo>,
    pub users: BTreeMap<UserId, i64>,
    pub votes: Vec<Vote>,
}

/// In-memory vote repository.
///
/// Users, posts and comments are seeded through the `insert_*` methods,
/// standing in for the forum's own registration and authoring flows.
#[derive(Clone, Default)]
pub struct InMemoryVoteRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user_id: UserId) {
        self.state.lock().await.users.entry(user_id).or_insert(0);
    }

    pub async fn remove_user(&self, user_id: UserId) {
        self.state.lock().await.users.remove(&user_id);
    }

    pub async fn insert_post(&self, post_id: TargetId, author_id: UserId) {
        self.insert_entity(Target::post(post_id), author_id).await;
    }

    pub async fn insert_comment(&self, comment_id: TargetId, author_id: UserId) {
        self.insert_entity(Target::comment(comment_id), author_id).await;
    }

    /// Deletes a post or comment without touching its votes, as the forum's
    /// CRUD layer would.
    pub async fn remove_target(&self, target: Target) {
        self.state
            .lock()
            .await
            .entities_mut(target.target_type)
            .remove(&target.id);
    }

    /// Overwrites a stored counter, bypassing the votes. Only useful to
    /// simulate drift before a reconciliation.
    pub async fn force_entity_rating(&self, target: Target, rating: i64) {
        if let Some(record) = self
            .state
            .lock()
            .await
            .entities_mut(target.target_type)
            .get_mut(&target.id)
        {
            record.rating = rating;
        }
    }

    pub async fn snapshot(&self) -> MemorySnapshot {
        let guard = self.state.lock().await;
        let state = &*guard;
        let mut entities: Vec<TargetInfo> = [TargetType::Post, TargetType::Comment]
            .into_iter()
            .flat_map(|target_type| {
                state.entities(target_type).keys().filter_map(move |id| {
                    state.resolve(Target {
                        target_type,
                        id: *id,
                    })
                })
            })
            .collect();
        entities.sort_by_key(|info| info.target);

        MemorySnapshot {
            entities,
            users: state.users.iter().map(|(id, rating)| (*id, *rating)).collect(),
            votes: state.votes.values().cloned().collect(),
        }
    }

    async fn insert_entity(&self, target: Target, author_id: UserId) {
        let mut state = self.state.lock().await;
        state.users.entry(author_id).or_insert(0);
        state
            .entities_mut(target.target_type)
            .insert(target.id, EntityRecord { author_id, rating: 0 });
    }
}

/// Prior value of one row written by a unit of work.
#[derive(Debug)]
enum Undo {
    Vote(VoteKey, Option<Vote>),
    EntityRating(Target, i64),
    UserRating(UserId, i64),
}

/// Unit of work over the in-memory store.
pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    undo: Vec<Undo>,
}

impl InMemoryUnitOfWork {
    fn rollback(&mut self) {
        let state = &mut *self.guard;
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Vote(key, Some(vote)) => {
                    state.votes.insert(key, vote);
                }
                Undo::Vote(key, None) => {
                    state.votes.remove(&key);
                }
                Undo::EntityRating(target, rating) => {
                    if let Some(record) = state.entities_mut(target.target_type).get_mut(&target.id)
                    {
                        record.rating = rating;
                    }
                }
                Undo::UserRating(user_id, rating) => {
                    if let Some(stored) = state.users.get_mut(&user_id) {
                        *stored = rating;
                    }
                }
            }
        }
    }
}

impl Drop for InMemoryUnitOfWork {
    fn drop(&mut self) {
        self.rollback();
    }
}

#[async_trait]
impl VoteStore for InMemoryUnitOfWork {
    async fn find(&mut self, key: &VoteKey) -> Result<Option<Vote>, VoteRepositoryError> {
        Ok(self.guard.votes.get(key).cloned())
    }

    async fn insert(&mut self, vote: &Vote) -> Result<(), VoteRepositoryError> {
        let key = vote.key();
        if self.guard.votes.contains_key(&key) {
            return Err(VoteRepositoryError::Conflict(key));
        }
        self.guard.votes.insert(key, vote.clone());
        self.undo.push(Undo::Vote(key, None));
        Ok(())
    }

    async fn update_kind(
        &mut self,
        key: &VoteKey,
        kind: VoteKind,
    ) -> Result<Vote, VoteRepositoryError> {
        let vote = self
            .guard
            .votes
            .get_mut(key)
            .ok_or(VoteRepositoryError::VoteNotFound(*key))?;
        let previous = vote.clone();
        vote.kind = kind;
        let updated = vote.clone();
        self.undo.push(Undo::Vote(*key, Some(previous)));
        Ok(updated)
    }

    async fn remove(&mut self, key: &VoteKey) -> Result<Vote, VoteRepositoryError> {
        let removed = self
            .guard
            .votes
            .remove(key)
            .ok_or(VoteRepositoryError::VoteNotFound(*key))?;
        self.undo.push(Undo::Vote(*key, Some(removed.clone())));
        Ok(removed)
    }
}

#[async_trait]
impl RatingLedger for InMemoryUnitOfWork {
    async fn adjust_entity_rating(
        &mut self,
        target: Target,
        delta: i64,
    ) -> Result<i64, VoteRepositoryError> {
        let record = self
            .guard
            .entities_mut(target.target_type)
            .get_mut(&target.id)
            .ok_or(VoteRepositoryError::TargetNotFound(target))?;
        let previous = record.rating;
        record.rating += delta;
        let rating = record.rating;
        self.undo.push(Undo::EntityRating(target, previous));
        Ok(rating)
    }

    async fn adjust_author_rating(
        &mut self,
        author_id: UserId,
        delta: i64,
    ) -> Result<i64, VoteRepositoryError> {
        let stored = self
            .guard
            .users
            .get_mut(&author_id)
            .ok_or(VoteRepositoryError::UserNotFound(author_id))?;
        let previous = *stored;
        *stored += delta;
        let rating = *stored;
        self.undo.push(Undo::UserRating(author_id, previous));
        Ok(rating)
    }
}

#[async_trait]
impl TargetResolver for InMemoryUnitOfWork {
    async fn resolve(&mut self, target: Target) -> Result<Option<TargetInfo>, VoteRepositoryError> {
        Ok(self.guard.resolve(target))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), VoteRepositoryError> {
        let mut uow = self;
        uow.undo.clear();
        Ok(())
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, VoteRepositoryError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            undo: Vec::new(),
        }))
    }

    async fn find_vote(&self, key: &VoteKey) -> Result<Option<Vote>, VoteRepositoryError> {
        Ok(self.state.lock().await.votes.get(key).cloned())
    }

    /// The votes are copied out when the stream is first polled, so later
    /// commits are not reflected in an already started stream.
    fn list_by_target(&self, target: Target) -> BoxStream<'_, Result<Vote, VoteRepositoryError>> {
        let state = self.state.clone();
        async_stream::stream! {
            let mut votes: Vec<Vote> = state.lock().await.votes_on(target).cloned().collect();
            votes.sort_by_key(|vote| (vote.created_at, vote.voter_id));
            for vote in votes {
                yield Ok::<Vote, VoteRepositoryError>(vote);
            }
        }
        .boxed()
    }

    async fn resolve_target(&self, target: Target) -> Result<Option<TargetInfo>, VoteRepositoryError> {
        Ok(self.state.lock().await.resolve(target))
    }

    async fn user_rating(&self, user_id: UserId) -> Result<Option<i64>, VoteRepositoryError> {
        Ok(self.state.lock().await.users.get(&user_id).copied())
    }

    async fn reconcile_ratings(&self) -> Result<ReconcileReport, VoteRepositoryError> {
        let mut state = self.state.lock().await;
        let mut report = ReconcileReport::default();

        let mut authored: HashMap<UserId, i64> = HashMap::new();
        for target_type in [TargetType::Post, TargetType::Comment] {
            let ids: Vec<TargetId> = state.entities(target_type).keys().copied().collect();
            for id in ids {
                let target = Target { target_type, id };
                let computed: i64 = state.votes_on(target).map(|vote| vote.kind.contribution()).sum();
                let Some(record) = state.entities_mut(target_type).get_mut(&id) else {
                    continue;
                };
                if record.rating != computed {
                    record.rating = computed;
                    report.entities_corrected += 1;
                }
                *authored.entry(record.author_id).or_insert(0) += computed;
            }
        }

        for (user_id, rating) in state.users.iter_mut() {
            let computed = authored.get(user_id).copied().unwrap_or(0);
            if *rating != computed {
                *rating = computed;
                report.users_corrected += 1;
            }
        }

        Ok(report)
    }
}
