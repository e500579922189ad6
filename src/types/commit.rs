// ABOUTME: Source-control commit identifiers recorded against revisions.
// ABOUTME: Supports short-prefix matching used to resolve rollback targets.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitIdError {
    #[error("commit id cannot be empty")]
    Empty,

    #[error("commit id cannot contain whitespace")]
    ContainsWhitespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(value: &str) -> Result<Self, CommitIdError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CommitIdError::Empty);
        }
        if value.chars().any(char::is_whitespace) {
            return Err(CommitIdError::ContainsWhitespace);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Whether `prefix` is a non-empty prefix of this commit id.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim();
        !prefix.is_empty() && self.0.starts_with(prefix)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
