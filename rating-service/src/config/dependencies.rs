//! Dependency initialization and wiring for the rating service.

use std::sync::Arc;

use rating_service_engine::VoteEngine;
use rating_service_repository::PostgresVoteRepository;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::Config;
use crate::errors::ServiceError;

/// `Dependencies` holds the components the HTTP layer serves from.
pub struct Dependencies {
    pub engine: VoteEngine,
}

impl Dependencies {
    /// Connects to PostgreSQL, optionally migrates the schema and builds the
    /// vote engine on top of the resulting repository.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `ServiceError` if the pool cannot be created or migrations fail.
    pub async fn new(config: &Config) -> Result<Self, ServiceError> {
        info!(
            max_connections = config.max_connections,
            acquire_timeout_secs = config.acquire_timeout.as_secs(),
            run_migrations = config.run_migrations,
            policies = ?config.policies,
            "Initializing dependencies"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        let repository = PostgresVoteRepository::new(pool).await?;
        if config.run_migrations {
            repository.migrate().await?;
        }

        Ok(Dependencies {
            engine: VoteEngine::new(Arc::new(repository), config.policies),
        })
    }
}
