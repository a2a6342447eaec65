//! Source-Control Boundary Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Commit metadata supplied by the source-control collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMetadata {
    /// Raw branch ref, possibly prefixed with `origin/`
    pub branch: String,
    pub commit_hash: String,
    pub commit_message: String,
    pub author: String,
    pub author_email: String,
    pub commit_timestamp: Option<DateTime<Utc>>,
}

impl CommitMetadata {
    /// Metadata with only the branch and hash set; handy for tests and
    /// detached builds.
    pub fn new(branch: impl Into<String>, commit_hash: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            commit_hash: commit_hash.into(),
            commit_message: String::new(),
            author: String::new(),
            author_email: String::new(),
            commit_timestamp: None,
        }
    }
}
