//! Branch Policy Table
//!
//! Resolves the policy for a branch through a four-level chain:
//!
//! 1. Exact literal key
//! 2. First matching glob, in table order
//! 3. Key equal to the branch type tag (`feature`, `custom`, ...)
//! 4. The default (`main`) policy
//!
//! Resolution never fails; reaching level 4 is logged as a warning.

use release_cascade_core::{
    normalize_branch_name, BranchPolicy, BranchType, CoreResult, DeploymentStrategy,
};
use serde::{Deserialize, Serialize};

use super::glob::BranchPattern;
use crate::models::config::BranchPolicyOverride;

/// Key of the designated default policy.
pub const DEFAULT_POLICY_KEY: &str = "main";

/// Which level of the chain produced a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    Exact,
    Pattern,
    BranchType,
    Default,
}

impl std::fmt::Display for PolicySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicySource::Exact => write!(f, "exact"),
            PolicySource::Pattern => write!(f, "pattern"),
            PolicySource::BranchType => write!(f, "branch_type"),
            PolicySource::Default => write!(f, "default"),
        }
    }
}

/// A resolved policy together with how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyResolution {
    pub policy: BranchPolicy,
    pub source: PolicySource,
    /// Table key that matched; `None` for the built-in fallback
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
struct PolicyEntry {
    pattern: BranchPattern,
    policy: BranchPolicy,
}

/// Ordered, key-unique table of branch policies.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    entries: Vec<PolicyEntry>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Policy used for `main`/`master`, and as the last-resort default.
pub fn main_policy() -> BranchPolicy {
    BranchPolicy::new(&["dev", "sit", "uat", "prod"])
        .with_auto_promote(&["dev", "sit"])
        .with_approval(&["uat", "prod"])
        .with_strategy(DeploymentStrategy::BlueGreen)
        .with_gates(true, true, true)
}

impl PolicyTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let entries = vec![
            ("main", main_policy()),
            ("master", main_policy()),
            (
                "develop",
                BranchPolicy::new(&["dev", "sit"])
                    .with_auto_promote(&["dev", "sit"])
                    .with_gates(true, true, false),
            ),
            (
                "feature/*",
                BranchPolicy::new(&["dev"])
                    .with_auto_promote(&["dev"])
                    .with_gates(true, false, false)
                    .ephemeral(),
            ),
            (
                "release/*",
                BranchPolicy::new(&["dev", "sit", "uat"])
                    .with_auto_promote(&["dev", "sit"])
                    .with_approval(&["uat"])
                    .with_strategy(DeploymentStrategy::BlueGreen)
                    .with_gates(true, true, true),
            ),
            (
                "hotfix/*",
                BranchPolicy::new(&["dev", "sit", "uat", "prod"])
                    .with_auto_promote(&["dev"])
                    .with_approval(&["prod"])
                    .with_strategy(DeploymentStrategy::Canary)
                    .with_gates(true, true, false)
                    .fast_track(),
            ),
            (
                "bugfix/*",
                BranchPolicy::new(&["dev", "sit"])
                    .with_auto_promote(&["dev"])
                    .with_gates(true, false, false),
            ),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(key, policy)| PolicyEntry {
                    pattern: BranchPattern::compile_builtin(key),
                    policy,
                })
                .collect(),
        }
    }

    /// Insert or replace a policy. A replaced key keeps its position; a new
    /// key is appended after every existing entry.
    pub fn insert(&mut self, pattern: &str, policy: BranchPolicy) -> CoreResult<()> {
        let pattern = BranchPattern::parse(pattern)?;
        policy.validate()?;

        match self
            .entries
            .iter_mut()
            .find(|e| e.pattern.as_str() == pattern.as_str())
        {
            Some(entry) => {
                tracing::debug!(pattern = %pattern, "Overriding branch policy");
                entry.policy = policy;
            }
            None => {
                tracing::debug!(pattern = %pattern, "Adding branch policy");
                self.entries.push(PolicyEntry { pattern, policy });
            }
        }
        Ok(())
    }

    /// Apply configured overrides in order.
    pub fn with_overrides(mut self, overrides: &[BranchPolicyOverride]) -> CoreResult<Self> {
        for entry in overrides {
            self.insert(&entry.pattern, entry.policy.clone())?;
        }
        Ok(self)
    }

    /// Table keys in declaration order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.pattern.as_str()).collect()
    }

    /// Policy stored under an exact key.
    pub fn get(&self, key: &str) -> Option<&BranchPolicy> {
        self.entries
            .iter()
            .find(|e| e.pattern.as_str() == key)
            .map(|e| &e.policy)
    }

    /// The designated default policy.
    pub fn default_policy(&self) -> BranchPolicy {
        self.get(DEFAULT_POLICY_KEY).cloned().unwrap_or_else(main_policy)
    }

    /// Walk the resolution chain for `branch`.
    pub fn resolve(&self, branch: &str) -> PolicyResolution {
        let name = normalize_branch_name(branch);

        let exact = self.entries.iter().find(|e| match &e.pattern {
            BranchPattern::Literal(key) => key == name,
            BranchPattern::Glob(_) => false,
        });
        if let Some(entry) = exact {
            return self.found(name, entry, PolicySource::Exact);
        }

        let pattern = self.entries.iter().find(|e| match &e.pattern {
            BranchPattern::Glob(glob) => glob.matches(name),
            BranchPattern::Literal(_) => false,
        });
        if let Some(entry) = pattern {
            return self.found(name, entry, PolicySource::Pattern);
        }

        let branch_type = BranchType::classify(name);
        let typed = self.entries.iter().find(|e| match &e.pattern {
            BranchPattern::Literal(key) => key == branch_type.as_str(),
            BranchPattern::Glob(_) => false,
        });
        if let Some(entry) = typed {
            return self.found(name, entry, PolicySource::BranchType);
        }

        tracing::warn!(
            branch = name,
            "No branch policy matched, falling back to the default policy"
        );
        PolicyResolution {
            policy: self.default_policy(),
            source: PolicySource::Default,
            key: self.get(DEFAULT_POLICY_KEY).map(|_| DEFAULT_POLICY_KEY.to_string()),
        }
    }

    /// Policy for `branch`. Never fails.
    pub fn resolve_policy(&self, branch: &str) -> BranchPolicy {
        self.resolve(branch).policy
    }

    fn found(&self, name: &str, entry: &PolicyEntry, source: PolicySource) -> PolicyResolution {
        tracing::debug!(
            branch = name,
            key = %entry.pattern,
            source = %source,
            "Resolved branch policy"
        );
        PolicyResolution {
            policy: entry.policy.clone(),
            source,
            key: Some(entry.pattern.as_str().to_string()),
        }
    }
}

impl BranchPattern {
    /// Built-in keys are known to be well formed.
    fn compile_builtin(key: &str) -> Self {
        BranchPattern::parse(key).unwrap_or_else(|_| BranchPattern::Literal(key.to_string()))
    }
}
