//! Branch Policy Integration Tests
//!
//! Resolution precedence, configured overrides and docker tags through the
//! public API.

use release_cascade::models::config::BranchPolicyOverride;
use release_cascade::services::branch::{compute_docker_tag, docker_tag, PolicySource};
use release_cascade::{BranchInfo, CommitMetadata, CoreError, PolicyTable};
use release_cascade_core::{BranchPolicy, BranchType, DeploymentStrategy};

// ============================================================================
// Helper Functions
// ============================================================================

fn branch(name: &str) -> BranchInfo {
    BranchInfo::from_commit(
        CommitMetadata::new(name, "9d1e0c7b42aa61f3e8c05b7d9a2f4e6c1b3d5a70"),
        &PolicyTable::builtin(),
    )
}

// ============================================================================
// Policy Resolution
// ============================================================================

#[test]
fn test_release_branch_policy() {
    let policy = PolicyTable::builtin().resolve_policy("release/2.0.0");
    assert_eq!(policy.environments, vec!["dev", "sit", "uat"]);
    assert_eq!(policy.deployment_strategy, DeploymentStrategy::BlueGreen);
    assert_eq!(policy.requires_approval.iter().collect::<Vec<_>>(), vec!["uat"]);
}

#[test]
fn test_unmatched_branch_gets_main_policy() {
    let table = PolicyTable::builtin();
    let resolution = table.resolve("experiments/new-cache");
    assert_eq!(resolution.source, PolicySource::Default);
    assert_eq!(resolution.policy, table.get("main").cloned().unwrap());
}

#[test]
fn test_hotfix_policy_is_fast_track_canary() {
    let policy = PolicyTable::builtin().resolve_policy("origin/hotfix/CVE-2024-1");
    assert_eq!(policy.deployment_strategy, DeploymentStrategy::Canary);
    assert!(policy.fast_track);
    assert!(policy.requires_approval.contains("prod"));
    assert!(policy.auto_promote.contains("dev"));
}

#[test]
fn test_configured_override_replaces_builtin() {
    let overrides = vec![BranchPolicyOverride {
        pattern: "feature/*".to_string(),
        policy: BranchPolicy::new(&["dev", "sit"]).with_auto_promote(&["dev"]),
    }];
    let table = PolicyTable::builtin().with_overrides(&overrides).unwrap();

    let policy = table.resolve_policy("feature/payments");
    assert_eq!(policy.environments, vec!["dev", "sit"]);
    assert_eq!(table.keys().iter().filter(|k| **k == "feature/*").count(), 1);
}

#[test]
fn test_invalid_override_rejected() {
    let overrides = vec![BranchPolicyOverride {
        pattern: "spike/*".to_string(),
        policy: BranchPolicy::new(&["dev"]).with_approval(&["prod"]),
    }];
    assert!(matches!(
        PolicyTable::builtin().with_overrides(&overrides),
        Err(CoreError::Config(_))
    ));
}

#[test]
fn test_glob_metacharacters_are_literal() {
    let overrides = vec![BranchPolicyOverride {
        pattern: "ops.v1/*".to_string(),
        policy: BranchPolicy::new(&["dev"]),
    }];
    let table = PolicyTable::builtin().with_overrides(&overrides).unwrap();

    assert_eq!(table.resolve("ops.v1/rotate").source, PolicySource::Pattern);
    assert_eq!(table.resolve("opsXv1/rotate").source, PolicySource::Default);
}

// ============================================================================
// Environment Admission
// ============================================================================

#[test]
fn test_feature_branch_blocked_from_prod() {
    let info = branch("feature/x");
    assert_eq!(info.branch_type, BranchType::Feature);

    match info.validate_for_environment("prod") {
        Err(CoreError::PolicyViolation {
            branch,
            environment,
            allowed,
        }) => {
            assert_eq!(branch, "feature/x");
            assert_eq!(environment, "prod");
            assert_eq!(allowed, vec!["dev"]);
        }
        other => panic!("expected policy violation, got {:?}", other),
    }
    assert!(info.validate_for_environment("dev").is_ok());
}

#[test]
fn test_main_branch_promotion_rules() {
    let info = branch("origin/main");
    assert_eq!(info.name, "main");
    assert_eq!(info.short_hash, "9d1e0c7b");
    assert!(info.can_auto_promote("sit"));
    assert!(!info.can_auto_promote("uat"));
    assert!(info.needs_approval("prod"));
}

// ============================================================================
// Docker Tags
// ============================================================================

#[test]
fn test_docker_tags_by_branch_type() {
    assert_eq!(compute_docker_tag(&branch("main"), 42), "42");
    assert_eq!(compute_docker_tag(&branch("develop"), 7), "dev-7");
    assert_eq!(compute_docker_tag(&branch("feature/Login_Page"), 3), "feature-login-page-3");
    assert_eq!(compute_docker_tag(&branch("release/2.0.0"), 9), "rc-2-0-0-9");
}

#[test]
fn test_docker_tag_is_deterministic() {
    let first = docker_tag("hotfix/Urgent Fix", BranchType::Hotfix, 5);
    let second = docker_tag("hotfix/Urgent Fix", BranchType::Hotfix, 5);
    assert_eq!(first, second);
    assert!(first
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
}
