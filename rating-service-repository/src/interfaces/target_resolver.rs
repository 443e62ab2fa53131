use rating_service_shared::types::{Target, TargetInfo};

use crate::errors::VoteRepositoryError;

/// Looks up posts and comments owned by the surrounding forum system.
#[async_trait::async_trait]
pub trait TargetResolver: Send {
    /// Returns the target's author and current rating, or `None` if it does
    /// not exist. Inside a unit of work the target row stays locked until
    /// commit or rollback.
    async fn resolve(&mut self, target: Target) -> Result<Option<TargetInfo>, VoteRepositoryError>;
}
