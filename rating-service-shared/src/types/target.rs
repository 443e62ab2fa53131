use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a registered user.
pub type UserId = i64;

/// Identifier of a post or a comment.
pub type TargetId = i64;

/// The kind of entity a vote can be cast on.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

impl TargetType {
    /// Value stored in the `likes.entity_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Post => "post",
            TargetType::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown target type: {0}")]
pub struct ParseTargetTypeError(pub String);

impl FromStr for TargetType {
    type Err = ParseTargetTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(TargetType::Post),
            "comment" => Ok(TargetType::Comment),
            other => Err(ParseTargetTypeError(other.to_string())),
        }
    }
}

/// A rated entity addressed by type and id.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub target_type: TargetType,
    pub id: TargetId,
}

impl Target {
    pub fn post(id: TargetId) -> Self {
        Self { target_type: TargetType::Post, id }
    }

    pub fn comment(id: TargetId) -> Self {
        Self { target_type: TargetType::Comment, id }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target_type, self.id)
    }
}

/// What the surrounding system knows about a vote target.
///
/// `author_id` is a non-owning back-reference: it identifies whose rating
/// receives the target's contributions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetInfo {
    pub target: Target,
    pub author_id: UserId,
    pub rating: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_column_values() {
        assert_eq!("post".parse::<TargetType>(), Ok(TargetType::Post));
        assert_eq!("comment".parse::<TargetType>(), Ok(TargetType::Comment));
        assert_eq!(TargetType::Comment.as_str(), "comment");
        assert!("reply".parse::<TargetType>().is_err());
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::post(7).to_string(), "post#7");
        assert_eq!(Target::comment(3).to_string(), "comment#3");
    }
}
