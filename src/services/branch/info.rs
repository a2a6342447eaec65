//! Branch Information
//!
//! `BranchInfo` is computed once per run from commit metadata and never
//! mutated afterwards.

use chrono::{DateTime, Utc};
use release_cascade_core::{normalize_branch_name, BranchPolicy, BranchType, CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use super::table::PolicyTable;
use super::tag::compute_docker_tag;
use crate::models::branch::CommitMetadata;

/// Placeholder used for every field of degraded branch info.
pub const UNKNOWN: &str = "unknown";

/// Length of the abbreviated commit hash.
pub const SHORT_HASH_LEN: usize = 8;

/// Branch facts and the policy that governs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInfo {
    pub name: String,
    pub commit_hash: String,
    pub short_hash: String,
    pub commit_message: String,
    pub author: String,
    pub author_email: String,
    pub commit_timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub branch_type: BranchType,
    pub policy: BranchPolicy,
}

impl BranchInfo {
    /// Classify commit metadata and resolve its policy.
    pub fn from_commit(commit: CommitMetadata, policies: &PolicyTable) -> Self {
        let name = normalize_branch_name(&commit.branch).to_string();
        let short_hash = commit.commit_hash.chars().take(SHORT_HASH_LEN).collect();
        let branch_type = BranchType::classify(&name);
        let policy = policies.resolve_policy(&name);

        Self {
            name,
            short_hash,
            commit_hash: commit.commit_hash,
            commit_message: commit.commit_message,
            author: commit.author,
            author_email: commit.author_email,
            commit_timestamp: commit.commit_timestamp,
            branch_type,
            policy,
        }
    }

    /// Stand-in used when source control cannot be queried. Carries the
    /// default policy.
    pub fn degraded(policies: &PolicyTable) -> Self {
        Self {
            name: UNKNOWN.to_string(),
            commit_hash: UNKNOWN.to_string(),
            short_hash: UNKNOWN.to_string(),
            commit_message: String::new(),
            author: UNKNOWN.to_string(),
            author_email: String::new(),
            commit_timestamp: None,
            branch_type: BranchType::Custom,
            policy: policies.default_policy(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.name == UNKNOWN && self.commit_hash == UNKNOWN
    }

    /// Fail with `PolicyViolation` unless the policy admits `environment`.
    pub fn validate_for_environment(&self, environment: &str) -> CoreResult<()> {
        if !self.policy.allows(environment) {
            return Err(CoreError::policy_violation(
                &self.name,
                environment,
                self.policy.environments.clone(),
            ));
        }
        tracing::info!(
            branch = %self.name,
            environment,
            "Branch is permitted to deploy to environment"
        );
        Ok(())
    }

    /// Whether a deployment to `environment` may promote without approval.
    pub fn can_auto_promote(&self, environment: &str) -> bool {
        self.policy.allows(environment) && self.policy.auto_promote.contains(environment)
    }

    /// Whether a deployment to `environment` needs a human approval.
    pub fn needs_approval(&self, environment: &str) -> bool {
        self.policy.requires_approval.contains(environment)
    }

    /// Image tag for this branch and build number.
    pub fn docker_tag(&self, build_number: u64) -> String {
        compute_docker_tag(self, build_number)
    }
}
