use rating_service_shared::types::{Vote, VoteKind};
use serde::Serialize;

/// Result of a successful cast.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CastOutcome {
    /// The vote as stored after the cast.
    pub vote: Vote,
    /// The kind that was replaced, `None` when the vote is new.
    pub previous_kind: Option<VoteKind>,
    /// The target's rating after the cast.
    pub target_rating: i64,
    /// The target author's rating after the cast.
    pub author_rating: i64,
}

/// Result of a successful retract.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RetractOutcome {
    pub removed: Vote,
    pub target_rating: i64,
    pub author_rating: i64,
}
