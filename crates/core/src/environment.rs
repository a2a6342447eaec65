//! Environment Configuration Types
//!
//! The fully resolved configuration of one deployment environment, including
//! the service sub-configs derived from the global configuration.

use serde::{Deserialize, Serialize};

use crate::policy::DeploymentStrategy;

/// CPU and memory quantity pair, in Kubernetes notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantity {
    pub cpu: String,
    pub memory: String,
}

impl ResourceQuantity {
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }
}

/// Resource requests and limits for workloads in an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub requests: ResourceQuantity,
    pub limits: ResourceQuantity,
}

/// Artifact repository settings for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Repository manager URL; `None` makes the environment undeployable
    pub url: Option<String>,
    pub docker_repository: String,
    pub maven_repository: String,
    pub npm_repository: String,
    pub pypi_repository: String,
    pub raw_repository: String,
}

/// Static analysis settings for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    pub server_url: Option<String>,
    pub project_key: String,
    pub gate_profile: String,
    pub branch_analysis: bool,
}

/// Target cluster settings for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub namespace: String,
    pub context: String,
    pub ingress_class: String,
    pub storage_class: String,
}

/// Log verbosity for deployed workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Observability settings for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringConfig {
    pub metrics_enabled: bool,
    pub alerting_enabled: bool,
    pub dashboard_url: Option<String>,
    pub log_level: LogLevel,
}

/// Fully resolved configuration of a single environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub name: String,
    pub display_name: String,
    pub namespace: String,
    pub requires_approval: bool,
    pub auto_promote: bool,
    pub deployment_strategy: DeploymentStrategy,
    pub replicas: u32,
    pub resources: ResourceRequirements,
    pub registry: RegistryConfig,
    pub quality: QualityConfig,
    pub cluster: ClusterConfig,
    pub monitoring: MonitoringConfig,
}

/// Outcome of an environment readiness check. Never an error by itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Build a result; validity follows from the absence of errors.
    pub fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
