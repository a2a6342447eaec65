//! Global Configuration
//!
//! Typed form of the nested configuration object that drives environment
//! resolution and branch policy overrides. Every key is optional; unknown
//! keys are rejected at load time instead of being ignored.

use std::collections::BTreeMap;
use std::path::Path;

use release_cascade_core::{BranchPolicy, CoreError, CoreResult, DeploymentStrategy};
use serde::{Deserialize, Serialize};

/// Root configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Per-environment overrides and additional environments
    pub environments: Vec<EnvironmentOverride>,
    pub nexus: NexusSettings,
    pub sonarqube: SonarQubeSettings,
    pub kubernetes: KubernetesSettings,
    pub monitoring: MonitoringSettings,
    /// Applied in order on top of the built-in branch policy table
    pub branch_policies: Vec<BranchPolicyOverride>,
}

impl GlobalConfig {
    /// Load from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(CoreError::config(format!(
                "Unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content)
            .map_err(|e| CoreError::parse(format!("Invalid TOML configuration: {}", e)))
    }

    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Partial CPU/memory pair; unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuantityOverride {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

/// Partial resource requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceOverride {
    pub requests: Option<QuantityOverride>,
    pub limits: Option<QuantityOverride>,
}

/// Override for a default environment, or a full definition of a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvironmentOverride {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub requires_approval: Option<bool>,
    #[serde(default)]
    pub auto_promote: Option<bool>,
    #[serde(default)]
    pub deployment_strategy: Option<DeploymentStrategy>,
    #[serde(default)]
    pub replicas: Option<u32>,
    #[serde(default)]
    pub resources: Option<ResourceOverride>,
    /// Repository manager URL for this environment only
    #[serde(default)]
    pub registry_url: Option<String>,
}

impl EnvironmentOverride {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Artifact repository manager settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NexusSettings {
    /// Base URL; environments without a specific URL use `{url}/{env}`
    pub url: Option<String>,
    pub dev_url: Option<String>,
    pub sit_url: Option<String>,
    pub uat_url: Option<String>,
    pub prod_url: Option<String>,
    /// Repository name prefix per artifact type (`docker`, `maven`, ...)
    pub repositories: BTreeMap<String, String>,
}

impl NexusSettings {
    /// Environment-specific URL for one of the default environments.
    pub fn environment_url(&self, environment: &str) -> Option<&str> {
        match environment {
            "dev" => self.dev_url.as_deref(),
            "sit" => self.sit_url.as_deref(),
            "uat" => self.uat_url.as_deref(),
            "prod" => self.prod_url.as_deref(),
            _ => None,
        }
    }
}

/// Static analysis server settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SonarQubeSettings {
    pub url: Option<String>,
    pub project_key: Option<String>,
    pub branch_analysis: Option<bool>,
}

/// Cluster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct KubernetesSettings {
    pub context_prefix: Option<String>,
    pub storage_class: Option<String>,
}

/// Observability settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MonitoringSettings {
    pub grafana_url: Option<String>,
    pub metrics_enabled: Option<bool>,
}

/// A configured branch policy table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchPolicyOverride {
    pub pattern: String,
    pub policy: BranchPolicy,
}
