//! Tests for the in-memory vote repository: unit-of-work visibility,
//! rollback on drop, storage-level errors and rating reconciliation.

use futures::TryStreamExt;
use rating_service_repository::{
    InMemoryVoteRepository, RatingLedger, VoteRepository, VoteRepositoryError, VoteStore,
};
use rating_service_shared::types::{Target, Vote, VoteKey, VoteKind};

const AUTHOR: i64 = 1;
const VOTER: i64 = 2;

async fn seeded_repository() -> InMemoryVoteRepository {
    let repository = InMemoryVoteRepository::new();
    repository.insert_user(AUTHOR).await;
    repository.insert_user(VOTER).await;
    repository.insert_post(10, AUTHOR).await;
    repository.insert_comment(20, AUTHOR).await;
    repository
}

#[tokio::test]
async fn test_commit_makes_writes_visible() {
    let repository = seeded_repository().await;
    let key = VoteKey::new(Target::post(10), VOTER);

    let mut uow = repository.begin().await.unwrap();
    uow.insert(&Vote::new(key, VoteKind::Like)).await.unwrap();
    uow.adjust_entity_rating(key.target, 1).await.unwrap();
    uow.adjust_author_rating(AUTHOR, 1).await.unwrap();
    uow.commit().await.unwrap();

    let stored = repository.find_vote(&key).await.unwrap().unwrap();
    assert_eq!(stored.kind, VoteKind::Like);
    assert_eq!(repository.resolve_target(key.target).await.unwrap().unwrap().rating, 1);
    assert_eq!(repository.user_rating(AUTHOR).await.unwrap(), Some(1));
}

#[tokio::test]
async fn test_dropped_unit_of_work_rolls_back() {
    let repository = seeded_repository().await;
    let key = VoteKey::new(Target::post(10), VOTER);

    {
        let mut uow = repository.begin().await.unwrap();
        uow.insert(&Vote::new(key, VoteKind::Dislike)).await.unwrap();
        uow.adjust_entity_rating(key.target, -1).await.unwrap();
        // dropped without commit
    }

    assert!(repository.find_vote(&key).await.unwrap().is_none());
    assert_eq!(repository.resolve_target(key.target).await.unwrap().unwrap().rating, 0);
}

#[tokio::test]
async fn test_unit_of_work_reads_its_own_writes() {
    let repository = seeded_repository().await;
    let key = VoteKey::new(Target::comment(20), VOTER);

    let mut uow = repository.begin().await.unwrap();
    uow.insert(&Vote::new(key, VoteKind::Like)).await.unwrap();
    let found = uow.find(&key).await.unwrap();
    assert_eq!(found.map(|vote| vote.kind), Some(VoteKind::Like));

    let updated = uow.update_kind(&key, VoteKind::Dislike).await.unwrap();
    assert_eq!(updated.kind, VoteKind::Dislike);
}

#[tokio::test]
async fn test_insert_existing_key_conflicts() {
    let repository = seeded_repository().await;
    let key = VoteKey::new(Target::post(10), VOTER);

    let mut uow = repository.begin().await.unwrap();
    uow.insert(&Vote::new(key, VoteKind::Like)).await.unwrap();
    let err = uow.insert(&Vote::new(key, VoteKind::Dislike)).await.unwrap_err();

    assert!(matches!(err, VoteRepositoryError::Conflict(k) if k == key));
}

#[tokio::test]
async fn test_update_and_remove_missing_vote() {
    let repository = seeded_repository().await;
    let key = VoteKey::new(Target::post(10), VOTER);

    let mut uow = repository.begin().await.unwrap();
    assert!(matches!(
        uow.update_kind(&key, VoteKind::Like).await,
        Err(VoteRepositoryError::VoteNotFound(_))
    ));
    assert!(matches!(
        uow.remove(&key).await,
        Err(VoteRepositoryError::VoteNotFound(_))
    ));
}

#[tokio::test]
async fn test_ledger_reports_missing_rows() {
    let repository = seeded_repository().await;

    let mut uow = repository.begin().await.unwrap();
    assert!(matches!(
        uow.adjust_entity_rating(Target::post(999), 1).await,
        Err(VoteRepositoryError::TargetNotFound(_))
    ));
    assert!(matches!(
        uow.adjust_author_rating(999, 1).await,
        Err(VoteRepositoryError::UserNotFound(999))
    ));
}

#[tokio::test]
async fn test_list_by_target_only_returns_that_target() {
    let repository = seeded_repository().await;
    repository.insert_user(3).await;

    let mut uow = repository.begin().await.unwrap();
    uow.insert(&Vote::new(VoteKey::new(Target::post(10), VOTER), VoteKind::Like))
        .await
        .unwrap();
    uow.insert(&Vote::new(VoteKey::new(Target::post(10), 3), VoteKind::Dislike))
        .await
        .unwrap();
    uow.insert(&Vote::new(VoteKey::new(Target::comment(10), VOTER), VoteKind::Like))
        .await
        .unwrap();
    uow.commit().await.unwrap();

    let votes: Vec<Vote> = repository
        .list_by_target(Target::post(10))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(votes.len(), 2);
    assert!(votes.iter().all(|vote| vote.target == Target::post(10)));
}

#[tokio::test]
async fn test_reconcile_repairs_drifted_counters() {
    let repository = seeded_repository().await;
    let key = VoteKey::new(Target::post(10), VOTER);

    let mut uow = repository.begin().await.unwrap();
    uow.insert(&Vote::new(key, VoteKind::Like)).await.unwrap();
    uow.commit().await.unwrap();
    repository.force_entity_rating(Target::comment(20), 5).await;

    let report = repository.reconcile_ratings().await.unwrap();

    assert_eq!(report.entities_corrected, 2);
    assert_eq!(report.users_corrected, 1);
    assert_eq!(repository.resolve_target(Target::post(10)).await.unwrap().unwrap().rating, 1);
    assert_eq!(repository.resolve_target(Target::comment(20)).await.unwrap().unwrap().rating, 0);
    assert_eq!(repository.user_rating(AUTHOR).await.unwrap(), Some(1));

    assert!(repository.reconcile_ratings().await.unwrap().is_clean());
}

#[tokio::test]
async fn test_rollback_restores_replaced_and_removed_votes() {
    let repository = seeded_repository().await;
    let replaced = VoteKey::new(Target::comment(20), VOTER);
    let removed = VoteKey::new(Target::post(10), VOTER);

    let mut uow = repository.begin().await.unwrap();
    uow.insert(&Vote::new(replaced, VoteKind::Like)).await.unwrap();
    uow.insert(&Vote::new(removed, VoteKind::Dislike)).await.unwrap();
    uow.adjust_entity_rating(replaced.target, 1).await.unwrap();
    uow.adjust_entity_rating(removed.target, -1).await.unwrap();
    uow.commit().await.unwrap();
    let before = repository.snapshot().await;

    {
        let mut uow = repository.begin().await.unwrap();
        uow.update_kind(&replaced, VoteKind::Dislike).await.unwrap();
        uow.adjust_entity_rating(replaced.target, -2).await.unwrap();
        uow.remove(&removed).await.unwrap();
        uow.adjust_entity_rating(removed.target, 1).await.unwrap();
        uow.adjust_author_rating(AUTHOR, -1).await.unwrap();
        // the same row written twice must come back to its first value
        uow.adjust_entity_rating(removed.target, 5).await.unwrap();
    }

    let after = repository.snapshot().await;
    assert_eq!(after.entities, before.entities);
    assert_eq!(after.users, before.users);
    assert_eq!(after.votes, before.votes);
}
