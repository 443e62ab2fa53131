use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::types::TargetType;

/// What happens when a voter casts again on a target they already voted on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Any repeat vote is refused, even one that changes the kind.
    Reject,
    /// A repeat vote with a different kind replaces the stored one.
    /// Repeating the same kind is still refused.
    Replace,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown duplicate vote policy: {0} (expected \"reject\" or \"replace\")")]
pub struct ParsePolicyError(pub String);

impl FromStr for DuplicatePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" | "strict" => Ok(DuplicatePolicy::Reject),
            "replace" | "upsert" => Ok(DuplicatePolicy::Replace),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Duplicate-vote policy per target type.
///
/// Posts historically refuse any second vote while comments let a voter
/// change their mind, so the defaults keep that split.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotePolicies {
    pub post: DuplicatePolicy,
    pub comment: DuplicatePolicy,
}

impl VotePolicies {
    pub fn uniform(policy: DuplicatePolicy) -> Self {
        Self {
            post: policy,
            comment: policy,
        }
    }

    pub fn for_target(&self, target_type: TargetType) -> DuplicatePolicy {
        match target_type {
            TargetType::Post => self.post,
            TargetType::Comment => self.comment,
        }
    }
}

impl Default for VotePolicies {
    fn default() -> Self {
        Self {
            post: DuplicatePolicy::Reject,
            comment: DuplicatePolicy::Replace,
        }
    }
}
