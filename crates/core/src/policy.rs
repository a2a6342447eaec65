//! Branch Policy Types
//!
//! Branch classification tags, deployment strategies and the `BranchPolicy`
//! record that bundles the environment/approval/gate rules for a branch.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Prefix stripped from remote-tracking refs before classification.
pub const REMOTE_PREFIX: &str = "origin/";

/// Strip a leading `origin/` from a raw branch ref.
pub fn normalize_branch_name(raw: &str) -> &str {
    raw.strip_prefix(REMOTE_PREFIX).unwrap_or(raw)
}

// ============================================================================
// Branch Type
// ============================================================================

/// Branch type derived from the branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Main,
    Develop,
    Feature,
    Release,
    Hotfix,
    Bugfix,
    Custom,
}

impl BranchType {
    /// Classify a branch name. Case-sensitive; only `origin/` is stripped.
    pub fn classify(name: &str) -> BranchType {
        let name = normalize_branch_name(name);
        match name {
            "main" | "master" => BranchType::Main,
            "develop" | "dev" => BranchType::Develop,
            _ if name.starts_with("feature/") => BranchType::Feature,
            _ if name.starts_with("release/") => BranchType::Release,
            _ if name.starts_with("hotfix/") => BranchType::Hotfix,
            _ if name.starts_with("bugfix/") => BranchType::Bugfix,
            _ => BranchType::Custom,
        }
    }

    /// The `prefix/` this type is recognised by, for prefixed types.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            BranchType::Feature => Some("feature/"),
            BranchType::Release => Some("release/"),
            BranchType::Hotfix => Some("hotfix/"),
            BranchType::Bugfix => Some("bugfix/"),
            _ => None,
        }
    }

    /// Tag used as a policy table key for type fallback.
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Main => "main",
            BranchType::Develop => "develop",
            BranchType::Feature => "feature",
            BranchType::Release => "release",
            BranchType::Hotfix => "hotfix",
            BranchType::Bugfix => "bugfix",
            BranchType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for BranchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Deployment Strategy
// ============================================================================

/// How a release is rolled out to an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStrategy {
    RollingUpdate,
    BlueGreen,
    Canary,
}

impl Default for DeploymentStrategy {
    fn default() -> Self {
        DeploymentStrategy::RollingUpdate
    }
}

impl std::fmt::Display for DeploymentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentStrategy::RollingUpdate => write!(f, "rolling-update"),
            DeploymentStrategy::BlueGreen => write!(f, "blue-green"),
            DeploymentStrategy::Canary => write!(f, "canary"),
        }
    }
}

// ============================================================================
// Branch Policy
// ============================================================================

/// Rules applicable to every branch matching one policy table key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BranchPolicy {
    /// Reachable environments, in promotion order
    pub environments: Vec<String>,
    /// Environments promoted to without human approval
    #[serde(default)]
    pub auto_promote: BTreeSet<String>,
    /// Environments that need an approval before deployment
    #[serde(default)]
    pub requires_approval: BTreeSet<String>,
    #[serde(default)]
    pub deployment_strategy: DeploymentStrategy,
    #[serde(default = "default_true")]
    pub quality_gate_required: bool,
    #[serde(default)]
    pub security_scan_required: bool,
    #[serde(default)]
    pub performance_test_required: bool,
    #[serde(default)]
    pub ephemeral_environment: bool,
    #[serde(default)]
    pub fast_track: bool,
}

fn default_true() -> bool {
    true
}

impl BranchPolicy {
    /// Create a policy reaching the given environments with every gate off
    /// except the quality gate.
    pub fn new(environments: &[&str]) -> Self {
        Self {
            environments: environments.iter().map(|e| e.to_string()).collect(),
            auto_promote: BTreeSet::new(),
            requires_approval: BTreeSet::new(),
            deployment_strategy: DeploymentStrategy::RollingUpdate,
            quality_gate_required: true,
            security_scan_required: false,
            performance_test_required: false,
            ephemeral_environment: false,
            fast_track: false,
        }
    }

    /// Set the auto-promoted environments.
    pub fn with_auto_promote(mut self, envs: &[&str]) -> Self {
        self.auto_promote = envs.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Set the environments that require approval.
    pub fn with_approval(mut self, envs: &[&str]) -> Self {
        self.requires_approval = envs.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Set the deployment strategy.
    pub fn with_strategy(mut self, strategy: DeploymentStrategy) -> Self {
        self.deployment_strategy = strategy;
        self
    }

    /// Set the quality / security / performance gate flags.
    pub fn with_gates(mut self, quality: bool, security: bool, performance: bool) -> Self {
        self.quality_gate_required = quality;
        self.security_scan_required = security;
        self.performance_test_required = performance;
        self
    }

    /// Mark deployments as short-lived, branch-scoped environments.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral_environment = true;
        self
    }

    /// Relax approval friction for urgent changes.
    pub fn fast_track(mut self) -> Self {
        self.fast_track = true;
        self
    }

    /// Whether the policy admits the given environment.
    pub fn allows(&self, environment: &str) -> bool {
        self.environments.iter().any(|e| e == environment)
    }

    /// Check the structural invariants of a policy loaded from configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.environments.is_empty() {
            return Err(CoreError::config(
                "Branch policy must list at least one environment",
            ));
        }

        let mut seen = HashSet::new();
        for env in &self.environments {
            if !seen.insert(env.as_str()) {
                return Err(CoreError::config(format!(
                    "Duplicate environment '{}' in branch policy",
                    env
                )));
            }
        }

        for (field, set) in [
            ("autoPromote", &self.auto_promote),
            ("requiresApproval", &self.requires_approval),
        ] {
            if let Some(stray) = set.iter().find(|e| !seen.contains(e.as_str())) {
                return Err(CoreError::config(format!(
                    "{} lists '{}' which is not one of the policy environments",
                    field, stray
                )));
            }
        }

        Ok(())
    }
}
