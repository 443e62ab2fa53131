mod policy;
mod reconcile;
mod target;
mod vote;

pub use policy::{DuplicatePolicy, ParsePolicyError, VotePolicies};
pub use reconcile::ReconcileReport;
pub use target::{ParseTargetTypeError, Target, TargetId, TargetInfo, TargetType, UserId};
pub use vote::{ParseVoteKindError, Vote, VoteKey, VoteKind, Voter, rating_delta};
