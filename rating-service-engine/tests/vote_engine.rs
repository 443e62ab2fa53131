//! Behavioral tests for the vote engine over the in-memory repository.
//!
//! After every scenario the stored counters are checked against the votes:
//! an entity's rating is the sum of its votes and a user's rating is the sum
//! of the ratings of what they authored.

use std::collections::BTreeMap;
use std::sync::Arc;

use rating_service_engine::{VoteEngine, VoteError};
use rating_service_repository::InMemoryVoteRepository;
use rating_service_shared::types::{
    DuplicatePolicy, Target, VoteKey, VoteKind, VotePolicies,
};

const AUTHOR: i64 = 1;
const ALICE: i64 = 2;
const BOB: i64 = 3;

async fn setup(policies: VotePolicies) -> (VoteEngine, InMemoryVoteRepository) {
    let repository = InMemoryVoteRepository::new();
    for user in [AUTHOR, ALICE, BOB] {
        repository.insert_user(user).await;
    }
    repository.insert_post(1, AUTHOR).await;
    repository.insert_post(2, AUTHOR).await;
    repository.insert_comment(5, AUTHOR).await;

    let engine = VoteEngine::new(Arc::new(repository.clone()), policies);
    (engine, repository)
}

async fn assert_ratings_consistent(repository: &InMemoryVoteRepository) {
    let snapshot = repository.snapshot().await;

    let mut authored: BTreeMap<i64, i64> = BTreeMap::new();
    for entity in &snapshot.entities {
        let sum: i64 = snapshot
            .votes
            .iter()
            .filter(|vote| vote.target == entity.target)
            .map(|vote| vote.kind.contribution())
            .sum();
        assert_eq!(entity.rating, sum, "rating of {} drifted from its votes", entity.target);
        *authored.entry(entity.author_id).or_default() += entity.rating;
    }

    for (user, rating) in &snapshot.users {
        let expected = authored.get(user).copied().unwrap_or(0);
        assert_eq!(*rating, expected, "rating of user#{user} drifted");
    }
}

// ============================================================================
// Cast
// ============================================================================

#[tokio::test]
async fn test_like_raises_post_and_author() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    let post = Target::post(1);

    let outcome = engine
        .cast(VoteKey::new(post, ALICE), VoteKind::Like)
        .await
        .unwrap();

    assert_eq!(outcome.target_rating, 1);
    assert_eq!(outcome.author_rating, 1);
    assert_eq!(outcome.previous_kind, None);
    assert_eq!(engine.rating_of(post).await.unwrap(), 1);
    assert_eq!(engine.author_rating_of(AUTHOR).await.unwrap(), 1);

    let voters = engine.voters_of(post).await.unwrap();
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0].voter_id, ALICE);
    assert_eq!(voters[0].kind, VoteKind::Like);

    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_strict_post_refuses_second_vote() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    let key = VoteKey::new(Target::post(1), ALICE);

    engine.cast(key, VoteKind::Like).await.unwrap();
    let err = engine.cast(key, VoteKind::Dislike).await.unwrap_err();

    assert!(matches!(err, VoteError::DuplicateVote(k) if k == key));
    assert_eq!(engine.rating_of(key.target).await.unwrap(), 1);
    assert_eq!(engine.author_rating_of(AUTHOR).await.unwrap(), 1);
    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_comment_vote_is_replaced() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    let key = VoteKey::new(Target::comment(5), ALICE);

    let first = engine.cast(key, VoteKind::Like).await.unwrap();
    assert_eq!(first.target_rating, 1);

    let second = engine.cast(key, VoteKind::Dislike).await.unwrap();
    assert_eq!(second.previous_kind, Some(VoteKind::Like));
    assert_eq!(second.vote.kind, VoteKind::Dislike);
    assert_eq!(second.target_rating, -1);
    assert_eq!(second.author_rating, first.author_rating - 2);

    let voters = engine.voters_of(key.target).await.unwrap();
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0].kind, VoteKind::Dislike);
    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_repeating_same_kind_is_duplicate_under_replace() {
    let (engine, repository) = setup(VotePolicies::uniform(DuplicatePolicy::Replace)).await;
    let key = VoteKey::new(Target::post(1), ALICE);

    engine.cast_or_replace(key, VoteKind::Dislike).await.unwrap();
    let err = engine.cast_or_replace(key, VoteKind::Dislike).await.unwrap_err();

    assert!(matches!(err, VoteError::DuplicateVote(_)));
    assert_eq!(engine.rating_of(key.target).await.unwrap(), -1);
    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_named_operations_ignore_configured_policy() {
    let (engine, _repository) = setup(VotePolicies::uniform(DuplicatePolicy::Replace)).await;
    let key = VoteKey::new(Target::comment(5), ALICE);

    engine.cast(key, VoteKind::Like).await.unwrap();
    assert!(matches!(
        engine.cast_strict(key, VoteKind::Dislike).await,
        Err(VoteError::DuplicateVote(_))
    ));
    assert!(engine.cast(key, VoteKind::Dislike).await.is_ok());
}

#[tokio::test]
async fn test_cast_on_missing_target() {
    let (engine, repository) = setup(VotePolicies::default()).await;

    let err = engine
        .cast(VoteKey::new(Target::post(404), ALICE), VoteKind::Like)
        .await
        .unwrap_err();

    assert!(matches!(err, VoteError::TargetNotFound(t) if t == Target::post(404)));
    assert!(repository.snapshot().await.votes.is_empty());
}

#[tokio::test]
async fn test_cast_after_target_deleted() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    repository.remove_target(Target::comment(5)).await;

    let err = engine
        .cast(VoteKey::new(Target::comment(5), ALICE), VoteKind::Like)
        .await
        .unwrap_err();

    assert!(matches!(err, VoteError::TargetNotFound(_)));
}

#[tokio::test]
async fn test_self_vote_is_allowed() {
    let (engine, repository) = setup(VotePolicies::default()).await;

    let outcome = engine
        .cast(VoteKey::new(Target::post(2), AUTHOR), VoteKind::Like)
        .await
        .unwrap();

    assert_eq!(outcome.author_rating, 1);
    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_failed_author_update_rolls_back_everything() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    repository.remove_user(AUTHOR).await;
    let key = VoteKey::new(Target::post(1), ALICE);

    let err = engine.cast(key, VoteKind::Like).await.unwrap_err();

    assert!(err.is_internal());
    let snapshot = repository.snapshot().await;
    assert!(snapshot.votes.is_empty());
    assert!(snapshot.entities.iter().all(|entity| entity.rating == 0));
}

// ============================================================================
// Retract
// ============================================================================

#[tokio::test]
async fn test_retract_restores_ratings() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    let key = VoteKey::new(Target::post(1), ALICE);
    let before = engine.author_rating_of(AUTHOR).await.unwrap();

    engine.cast(key, VoteKind::Like).await.unwrap();
    let outcome = engine.retract(key).await.unwrap();

    assert_eq!(outcome.removed.kind, VoteKind::Like);
    assert_eq!(outcome.target_rating, 0);
    assert_eq!(outcome.author_rating, before);
    assert!(engine.voters_of(key.target).await.unwrap().is_empty());

    let err = engine.retract(key).await.unwrap_err();
    assert!(matches!(err, VoteError::VoteNotFound(k) if k == key));
    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_retract_dislike_adds_back() {
    let (engine, _repository) = setup(VotePolicies::default()).await;
    let key = VoteKey::new(Target::comment(5), BOB);

    engine.cast(key, VoteKind::Dislike).await.unwrap();
    let outcome = engine.retract(key).await.unwrap();

    assert_eq!(outcome.target_rating, 0);
    assert_eq!(outcome.author_rating, 0);
}

#[tokio::test]
async fn test_retract_without_vote_never_mutates() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    engine
        .cast(VoteKey::new(Target::post(1), BOB), VoteKind::Dislike)
        .await
        .unwrap();
    let before = repository.snapshot().await;

    for _ in 0..3 {
        let err = engine
            .retract(VoteKey::new(Target::post(1), ALICE))
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::VoteNotFound(_)));
    }

    let after = repository.snapshot().await;
    assert_eq!(before.users, after.users);
    assert_eq!(before.votes, after.votes);
    assert_eq!(
        before.entities.iter().map(|e| e.rating).collect::<Vec<_>>(),
        after.entities.iter().map(|e| e.rating).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_retract_on_deleted_target() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    let key = VoteKey::new(Target::post(2), ALICE);
    engine.cast(key, VoteKind::Like).await.unwrap();
    repository.remove_target(key.target).await;

    assert!(matches!(
        engine.retract(key).await,
        Err(VoteError::TargetNotFound(_))
    ));
    assert!(matches!(
        engine.retract(VoteKey::new(key.target, BOB)).await,
        Err(VoteError::VoteNotFound(_))
    ));
    assert_eq!(repository.snapshot().await.votes.len(), 1);
}

// ============================================================================
// Sequences and reconciliation
// ============================================================================

#[tokio::test]
async fn test_mixed_sequence_keeps_invariants() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    let post = Target::post(1);
    let comment = Target::comment(5);

    engine.cast(VoteKey::new(post, ALICE), VoteKind::Like).await.unwrap();
    engine.cast(VoteKey::new(post, BOB), VoteKind::Like).await.unwrap();
    engine.cast(VoteKey::new(comment, ALICE), VoteKind::Dislike).await.unwrap();
    engine.cast(VoteKey::new(comment, BOB), VoteKind::Dislike).await.unwrap();
    engine.cast(VoteKey::new(comment, BOB), VoteKind::Like).await.unwrap();
    engine.retract(VoteKey::new(post, ALICE)).await.unwrap();
    let _ = engine.cast(VoteKey::new(post, BOB), VoteKind::Dislike).await;

    assert_eq!(engine.rating_of(post).await.unwrap(), 1);
    assert_eq!(engine.rating_of(comment).await.unwrap(), 0);
    assert_eq!(engine.author_rating_of(AUTHOR).await.unwrap(), 1);
    assert_ratings_consistent(&repository).await;
}

#[tokio::test]
async fn test_reconcile_after_engine_writes_is_clean() {
    let (engine, repository) = setup(VotePolicies::default()).await;
    engine
        .cast(VoteKey::new(Target::post(1), ALICE), VoteKind::Like)
        .await
        .unwrap();

    assert!(engine.reconcile().await.unwrap().is_clean());

    repository.force_entity_rating(Target::post(1), 10).await;
    let report = engine.reconcile().await.unwrap();
    assert_eq!(report.entities_corrected, 1);
    assert_eq!(engine.rating_of(Target::post(1)).await.unwrap(), 1);
    assert_ratings_consistent(&repository).await;
}
