use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::{Target, UserId};

/// Represents the opinion a user expresses on a target.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// Adds one point to the target and its author.
    Like,
    /// Removes one point from the target and its author.
    Dislike,
}

impl VoteKind {
    /// Signed contribution of a single vote of this kind to a rating.
    pub fn contribution(&self) -> i64 {
        match self {
            VoteKind::Like => 1,
            VoteKind::Dislike => -1,
        }
    }

    /// Value stored in the `likes.type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Like => "like",
            VoteKind::Dislike => "dislike",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown vote kind: {0}")]
pub struct ParseVoteKindError(pub String);

impl FromStr for VoteKind {
    type Err = ParseVoteKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(VoteKind::Like),
            "dislike" => Ok(VoteKind::Dislike),
            other => Err(ParseVoteKindError(other.to_string())),
        }
    }
}

/// Computes how much a rating moves when a voter's state changes from
/// `previous` to `next`, where `None` means "no vote".
///
/// The same delta applies to the target and to the target's author.
pub fn rating_delta(previous: Option<VoteKind>, next: Option<VoteKind>) -> i64 {
    let before = previous.map(|kind| kind.contribution()).unwrap_or(0);
    let after = next.map(|kind| kind.contribution()).unwrap_or(0);
    after - before
}

/// Uniquely identifies a vote: at most one exists per key.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoteKey {
    pub target: Target,
    pub voter_id: UserId,
}

impl VoteKey {
    pub fn new(target: Target, voter_id: UserId) -> Self {
        Self { target, voter_id }
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by user#{}", self.target, self.voter_id)
    }
}

/// One user's stored opinion on one target.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub target: Target,
    pub voter_id: UserId,
    pub kind: VoteKind,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Stamps the vote with the current time, truncated to the microsecond
    /// precision a `TIMESTAMPTZ` column stores.
    pub fn new(key: VoteKey, kind: VoteKind) -> Self {
        Self {
            target: key.target,
            voter_id: key.voter_id,
            kind,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn key(&self) -> VoteKey {
        VoteKey::new(self.target, self.voter_id)
    }
}

/// A vote as listed to readers of a target's voters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voter {
    pub voter_id: UserId,
    #[serde(rename = "type")]
    pub kind: VoteKind,
    pub created_at: DateTime<Utc>,
}

impl From<Vote> for Voter {
    fn from(vote: Vote) -> Self {
        Self {
            voter_id: vote.voter_id,
            kind: vote.kind,
            created_at: vote.created_at,
        }
    }
}
