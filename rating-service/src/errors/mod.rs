//! Error types for the rating service binary.

use rating_service_repository::VoteRepositoryError;
use thiserror::Error;

/// Errors that can occur while configuring or starting the service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A configuration value is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database pool could not be created.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The repository failed during setup, e.g. while migrating.
    #[error("Repository error: {0}")]
    Repository(#[from] VoteRepositoryError),

    /// Binding or serving the HTTP listener failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
