use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use rating_service_shared::types::{
    ReconcileReport, Target, TargetInfo, TargetType, UserId, Vote, VoteKey,
};
use tracing::{debug, info};

use super::rows::{TargetRow, VoteRow, entity_table};
use super::unit_of_work::PostgresUnitOfWork;
use crate::errors::VoteRepositoryError;
use crate::interfaces::{UnitOfWork, VoteRepository};

const FIND_VOTE: &str = r#"
    SELECT entity_type, entity_id, author_id, type, created_at
    FROM likes
    WHERE entity_type = $1 AND entity_id = $2 AND author_id = $3
"#;

const LIST_VOTES_BY_TARGET: &str = r#"
    SELECT entity_type, entity_id, author_id, type, created_at
    FROM likes
    WHERE entity_type = $1 AND entity_id = $2
    ORDER BY created_at, author_id
"#;

const SELECT_USER_RATING: &str = "SELECT rating FROM users WHERE id = $1";

// EXCLUSIVE conflicts with the ROW SHARE taken by `FOR UPDATE`, so the pass
// waits for units of work already holding a target lock. Tables are listed in
// the target -> vote -> author order those units lock them in. Plain reads
// still go through.
const LOCK_RATED_TABLES: &str =
    "LOCK TABLE posts, comments, likes, users IN EXCLUSIVE MODE";

const RECONCILE_USER_RATINGS: &str = r#"
    WITH authored AS (
        SELECT author_id, SUM(rating) AS rating
        FROM (
            SELECT author_id, rating FROM posts
            UNION ALL
            SELECT author_id, rating FROM comments
        ) entities
        GROUP BY author_id
    ),
    computed AS (
        SELECT u.id, COALESCE(a.rating, 0)::BIGINT AS rating
        FROM users u
        LEFT JOIN authored a ON a.author_id = u.id
    )
    UPDATE users SET rating = computed.rating
    FROM computed
    WHERE users.id = computed.id AND users.rating <> computed.rating
"#;

/// PostgreSQL implementation of the vote repository.
///
/// Mutations go through `PostgresUnitOfWork`s opened with `begin`; reads run
/// directly on the pool against committed data.
pub struct PostgresVoteRepository {
    pool: sqlx::PgPool,
}

impl PostgresVoteRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVoteRepository)` - Ready-to-use repository instance
    /// * `Err(VoteRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VoteRepositoryError> {
        Ok(Self { pool })
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), VoteRepositoryError> {
        sqlx::migrate!("src/postgres/migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    /// Rewrites the rating of every entity of one type whose stored counter
    /// disagrees with the sum of its votes.
    async fn reconcile_entity_ratings_tx(
        &self,
        target_type: TargetType,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<u64, VoteRepositoryError> {
        let table = entity_table(target_type);
        let sql = format!(
            r#"
            WITH computed AS (
                SELECT e.id,
                       COALESCE(SUM(CASE l.type WHEN 'like' THEN 1 WHEN 'dislike' THEN -1 ELSE 0 END), 0)::BIGINT AS rating
                FROM {table} e
                LEFT JOIN likes l ON l.entity_type = $1 AND l.entity_id = e.id
                GROUP BY e.id
            )
            UPDATE {table} SET rating = computed.rating
            FROM computed
            WHERE {table}.id = computed.id AND {table}.rating <> computed.rating
            "#
        );

        let result = sqlx::query(&sql)
            .bind(target_type.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    /// Opens a unit of work on a pooled transaction.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, VoteRepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }

    async fn find_vote(&self, key: &VoteKey) -> Result<Option<Vote>, VoteRepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(FIND_VOTE)
            .bind(key.target.target_type.as_str())
            .bind(key.target.id)
            .bind(key.voter_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Vote::try_from).transpose()
    }

    /// Streams votes straight from the database cursor; rows are decoded as
    /// they are pulled.
    fn list_by_target(&self, target: Target) -> BoxStream<'_, Result<Vote, VoteRepositoryError>> {
        sqlx::query_as::<_, VoteRow>(LIST_VOTES_BY_TARGET)
            .bind(target.target_type.as_str())
            .bind(target.id)
            .fetch(&self.pool)
            .map(|row| row.map_err(VoteRepositoryError::from).and_then(Vote::try_from))
            .boxed()
    }

    async fn resolve_target(&self, target: Target) -> Result<Option<TargetInfo>, VoteRepositoryError> {
        let sql = format!(
            "SELECT author_id, rating FROM {} WHERE id = $1",
            entity_table(target.target_type)
        );
        let row = sqlx::query_as::<_, TargetRow>(&sql)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.into_info(target)))
    }

    async fn user_rating(&self, user_id: UserId) -> Result<Option<i64>, VoteRepositoryError> {
        let rating = sqlx::query_scalar::<_, i64>(SELECT_USER_RATING)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rating)
    }

    /// Recomputes all counters in a single transaction.
    ///
    /// Entity ratings are fixed first because user ratings are derived from them.
    async fn reconcile_ratings(&self) -> Result<ReconcileReport, VoteRepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(LOCK_RATED_TABLES).execute(&mut *tx).await?;

        let posts = self.reconcile_entity_ratings_tx(TargetType::Post, &mut tx).await?;
        let comments = self.reconcile_entity_ratings_tx(TargetType::Comment, &mut tx).await?;
        let users = sqlx::query(RECONCILE_USER_RATINGS)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        let report = ReconcileReport {
            entities_corrected: posts + comments,
            users_corrected: users,
        };
        debug!(?report, "Rating reconciliation finished");
        Ok(report)
    }
}
