use async_trait::async_trait;
use rating_service_shared::types::{Target, TargetInfo, UserId, Vote, VoteKey, VoteKind};
use sqlx::Postgres;

use super::rows::{TargetRow, VoteRow, entity_table};
use crate::errors::VoteRepositoryError;
use crate::interfaces::{RatingLedger, TargetResolver, UnitOfWork, VoteStore};

const FIND_VOTE_FOR_UPDATE: &str = r#"
    SELECT entity_type, entity_id, author_id, type, created_at
    FROM likes
    WHERE entity_type = $1 AND entity_id = $2 AND author_id = $3
    FOR UPDATE
"#;

const INSERT_VOTE: &str = r#"
    INSERT INTO likes (entity_type, entity_id, author_id, type, created_at)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (entity_type, entity_id, author_id) DO NOTHING
"#;

const UPDATE_VOTE_KIND: &str = r#"
    UPDATE likes SET type = $4
    WHERE entity_type = $1 AND entity_id = $2 AND author_id = $3
    RETURNING entity_type, entity_id, author_id, type, created_at
"#;

const DELETE_VOTE: &str = r#"
    DELETE FROM likes
    WHERE entity_type = $1 AND entity_id = $2 AND author_id = $3
    RETURNING entity_type, entity_id, author_id, type, created_at
"#;

const ADJUST_USER_RATING: &str = "UPDATE users SET rating = rating + $1 WHERE id = $2 RETURNING rating";

/// A unit of work backed by one PostgreSQL transaction.
///
/// The transaction is taken from the pool when the unit is opened and goes
/// back to it on `commit`. If the unit is dropped first, sqlx rolls the
/// transaction back, which also covers callers that are cancelled mid-flight.
pub struct PostgresUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl PostgresUnitOfWork {
    pub(crate) fn new(tx: sqlx::Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl VoteStore for PostgresUnitOfWork {
    async fn find(&mut self, key: &VoteKey) -> Result<Option<Vote>, VoteRepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(FIND_VOTE_FOR_UPDATE)
            .bind(key.target.target_type.as_str())
            .bind(key.target.id)
            .bind(key.voter_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(Vote::try_from).transpose()
    }

    /// Inserts with `ON CONFLICT DO NOTHING` and reports zero affected rows
    /// as a conflict, leaving the transaction usable.
    async fn insert(&mut self, vote: &Vote) -> Result<(), VoteRepositoryError> {
        let result = sqlx::query(INSERT_VOTE)
            .bind(vote.target.target_type.as_str())
            .bind(vote.target.id)
            .bind(vote.voter_id)
            .bind(vote.kind.as_str())
            .bind(vote.created_at)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VoteRepositoryError::Conflict(vote.key()));
        }
        Ok(())
    }

    async fn update_kind(
        &mut self,
        key: &VoteKey,
        kind: VoteKind,
    ) -> Result<Vote, VoteRepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(UPDATE_VOTE_KIND)
            .bind(key.target.target_type.as_str())
            .bind(key.target.id)
            .bind(key.voter_id)
            .bind(kind.as_str())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.ok_or(VoteRepositoryError::VoteNotFound(*key))
            .and_then(Vote::try_from)
    }

    async fn remove(&mut self, key: &VoteKey) -> Result<Vote, VoteRepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(DELETE_VOTE)
            .bind(key.target.target_type.as_str())
            .bind(key.target.id)
            .bind(key.voter_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.ok_or(VoteRepositoryError::VoteNotFound(*key))
            .and_then(Vote::try_from)
    }
}

#[async_trait]
impl RatingLedger for PostgresUnitOfWork {
    async fn adjust_entity_rating(
        &mut self,
        target: Target,
        delta: i64,
    ) -> Result<i64, VoteRepositoryError> {
        let sql = format!(
            "UPDATE {} SET rating = rating + $1 WHERE id = $2 RETURNING rating",
            entity_table(target.target_type)
        );
        let rating = sqlx::query_scalar::<_, i64>(&sql)
            .bind(delta)
            .bind(target.id)
            .fetch_optional(&mut *self.tx)
            .await?;

        rating.ok_or(VoteRepositoryError::TargetNotFound(target))
    }

    async fn adjust_author_rating(
        &mut self,
        author_id: UserId,
        delta: i64,
    ) -> Result<i64, VoteRepositoryError> {
        let rating = sqlx::query_scalar::<_, i64>(ADJUST_USER_RATING)
            .bind(delta)
            .bind(author_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        rating.ok_or(VoteRepositoryError::UserNotFound(author_id))
    }
}

#[async_trait]
impl TargetResolver for PostgresUnitOfWork {
    async fn resolve(&mut self, target: Target) -> Result<Option<TargetInfo>, VoteRepositoryError> {
        let sql = format!(
            "SELECT author_id, rating FROM {} WHERE id = $1 FOR UPDATE",
            entity_table(target.target_type)
        );
        let row = sqlx::query_as::<_, TargetRow>(&sql)
            .bind(target.id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|row| row.into_info(target)))
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), VoteRepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
