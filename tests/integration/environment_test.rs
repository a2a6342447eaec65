//! Environment Resolution Integration Tests
//!
//! Resolution from empty and file-based configuration, using temporary
//! directories for configuration files.

use std::fs;
use tempfile::TempDir;

use release_cascade::{CoreError, EnvironmentConfigResolver, GlobalConfig};
use release_cascade_core::{DeploymentStrategy, EnvironmentLookup};

// ============================================================================
// Helper Functions
// ============================================================================

fn write_config(temp: &TempDir, file: &str, content: &str) -> std::path::PathBuf {
    let path = temp.path().join(file);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_empty_config_resolves_four_environments() {
    let table = EnvironmentConfigResolver::resolve(&GlobalConfig::default()).unwrap();
    assert_eq!(table.len(), 4);
    for name in ["dev", "sit", "uat", "prod"] {
        assert!(table.contains_key(name), "missing {}", name);
    }
    assert_eq!(table["prod"].replicas, 3);
    assert_eq!(table["prod"].resources.limits.cpu, "4000m");
}

#[test]
fn test_resolution_is_repeatable() {
    let config = GlobalConfig::from_json_str(
        r#"{"nexus": {"url": "https://nexus.example.com"}, "sonarqube": {"projectKey": "shop"}}"#,
    )
    .unwrap();
    assert_eq!(
        EnvironmentConfigResolver::resolve(&config).unwrap(),
        EnvironmentConfigResolver::resolve(&config).unwrap()
    );
}

// ============================================================================
// Configuration Files
// ============================================================================

#[test]
fn test_toml_file_overrides() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        "release.toml",
        r#"
[nexus]
url = "https://nexus.example.com"

[kubernetes]
contextPrefix = "eks"

[[environments]]
name = "uat"
namespace = "shop-uat"
deploymentStrategy = "canary"

[[environments]]
name = "perf"
namespace = "shop-perf"
deploymentStrategy = "rolling-update"
replicas = 2

[environments.resources.requests]
cpu = "500m"
memory = "1Gi"

[environments.resources.limits]
cpu = "1000m"
memory = "2Gi"
"#,
    );

    let config = GlobalConfig::load(&path).unwrap();
    let resolver = EnvironmentConfigResolver::new(&config).unwrap();

    let uat = resolver.config("uat").unwrap();
    assert_eq!(uat.cluster.namespace, "shop-uat");
    assert_eq!(uat.cluster.context, "eks-uat");
    assert_eq!(uat.deployment_strategy, DeploymentStrategy::Canary);
    assert_eq!(uat.replicas, 2);

    let perf = resolver.get_config("perf").unwrap();
    assert_eq!(perf.registry.url.as_deref(), Some("https://nexus.example.com/perf"));
    assert_eq!(perf.registry.npm_repository, "npm-perf");
    assert!(resolver.validate("perf").valid);
}

#[test]
fn test_json_file_with_incomplete_custom_environment() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        "release.json",
        r#"{"environments": [{"name": "qa", "replicas": 1}]}"#,
    );

    let config = GlobalConfig::load(&path).unwrap();
    assert!(matches!(
        EnvironmentConfigResolver::resolve(&config),
        Err(CoreError::Config(_))
    ));
}

#[test]
fn test_unsupported_or_missing_files() {
    let temp = TempDir::new().unwrap();
    let yaml = write_config(&temp, "release.yaml", "nexus: {}\n");
    assert!(matches!(GlobalConfig::load(&yaml), Err(CoreError::Config(_))));
    assert!(matches!(
        GlobalConfig::load(temp.path().join("absent.toml")),
        Err(CoreError::Io(_))
    ));
}

// ============================================================================
// Readiness
// ============================================================================

#[test]
fn test_environment_readiness() {
    let config = GlobalConfig::from_json_str(
        r#"{"nexus": {"prodUrl": "https://nexus-prod.example.com"}}"#,
    )
    .unwrap();
    let resolver = EnvironmentConfigResolver::new(&config).unwrap();

    assert!(resolver.ensure_deployable("prod").is_ok());
    let dev = resolver.validate("dev");
    assert!(!dev.valid);
    assert!(dev.errors[0].contains("Registry URL"));
    assert!(matches!(
        resolver.ensure_deployable("qa"),
        Err(CoreError::UnknownEnvironment { .. })
    ));
}
