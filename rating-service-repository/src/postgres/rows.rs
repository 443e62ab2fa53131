use chrono::{DateTime, Utc};
use rating_service_shared::types::{Target, TargetInfo, TargetType, Vote};

use crate::errors::VoteRepositoryError;

#[derive(sqlx::FromRow)]
pub(crate) struct VoteRow {
    entity_type: String,
    entity_id: i64,
    author_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = VoteRepositoryError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let target_type = row
            .entity_type
            .parse::<TargetType>()
            .map_err(|_| VoteRepositoryError::InvalidTargetType(row.entity_type.clone()))?;
        let kind = row
            .kind
            .parse()
            .map_err(|_| VoteRepositoryError::InvalidVoteType(row.kind.clone()))?;

        Ok(Vote {
            target: Target {
                target_type,
                id: row.entity_id,
            },
            voter_id: row.author_id,
            kind,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TargetRow {
    author_id: i64,
    rating: i64,
}

impl TargetRow {
    pub(crate) fn into_info(self, target: Target) -> TargetInfo {
        TargetInfo {
            target,
            author_id: self.author_id,
            rating: self.rating,
        }
    }
}

/// Table holding the rated entities of the given type.
pub(crate) fn entity_table(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Post => "posts",
        TargetType::Comment => "comments",
    }
}
