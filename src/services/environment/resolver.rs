//! Environment Configuration Resolver
//!
//! Builds the per-environment table in two passes:
//!
//! 1. Base fields: built-in defaults, then `environments[]` overrides merged
//!    field by field (new environments must be complete)
//! 2. Derived sub-configs (registry, quality, cluster, monitoring), computed
//!    from the merged base so overrides are visible to every derivation
//!
//! Resolution is deterministic: the same `GlobalConfig` always yields an
//! equal table.

use std::collections::{BTreeMap, HashSet};

use release_cascade_core::{
    ClusterConfig, CoreError, CoreResult, DeploymentStrategy, EnvironmentConfig,
    EnvironmentLookup, LogLevel, MonitoringConfig, QualityConfig, RegistryConfig,
    ResourceQuantity, ResourceRequirements, ValidationResult,
};

use super::defaults::{default_environment, BaseEnvironment, DEFAULT_ENVIRONMENTS, PRODUCTION};
use crate::models::config::{EnvironmentOverride, GlobalConfig, QuantityOverride};

const DEFAULT_PROJECT_KEY: &str = "app";
const DEFAULT_CONTEXT_PREFIX: &str = "k8s";

/// Resolved environment table with lookup and readiness checks.
#[derive(Debug, Clone)]
pub struct EnvironmentConfigResolver {
    table: BTreeMap<String, EnvironmentConfig>,
}

impl EnvironmentConfigResolver {
    /// Resolve `global` and keep the table for lookups.
    pub fn new(global: &GlobalConfig) -> CoreResult<Self> {
        Ok(Self {
            table: Self::resolve(global)?,
        })
    }

    /// Resolve the full environment table.
    pub fn resolve(global: &GlobalConfig) -> CoreResult<BTreeMap<String, EnvironmentConfig>> {
        let mut bases: BTreeMap<String, BaseEnvironment> = DEFAULT_ENVIRONMENTS
            .iter()
            .filter_map(|name| default_environment(name))
            .map(|base| (base.name.clone(), base))
            .collect();

        let mut seen = HashSet::new();
        for entry in &global.environments {
            if entry.name.trim().is_empty() {
                return Err(CoreError::config("Environment entry without a name"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(CoreError::config(format!(
                    "Environment '{}' is configured more than once",
                    entry.name
                )));
            }

            let merged = match bases.remove(&entry.name) {
                Some(base) => merge_override(base, entry),
                None => new_environment(entry)?,
            };
            if merged.replicas == 0 {
                return Err(CoreError::config(format!(
                    "Environment '{}' must run at least one replica",
                    merged.name
                )));
            }
            bases.insert(merged.name.clone(), merged);
        }

        let table: BTreeMap<String, EnvironmentConfig> = bases
            .into_values()
            .map(|base| (base.name.clone(), derive(global, base)))
            .collect();

        tracing::debug!(environments = ?table.keys().collect::<Vec<_>>(), "Resolved environments");
        Ok(table)
    }

    /// The resolved table.
    pub fn table(&self) -> &BTreeMap<String, EnvironmentConfig> {
        &self.table
    }

    /// Environment names in table order.
    pub fn environment_names(&self) -> Vec<String> {
        self.table.keys().cloned().collect()
    }

    /// Configuration for `name`; never defaulted.
    pub fn config(&self, name: &str) -> CoreResult<&EnvironmentConfig> {
        self.table
            .get(name)
            .ok_or_else(|| CoreError::unknown_environment(name, self.environment_names()))
    }

    pub fn requires_approval(&self, name: &str) -> CoreResult<bool> {
        Ok(self.config(name)?.requires_approval)
    }

    pub fn supports_auto_promotion(&self, name: &str) -> CoreResult<bool> {
        Ok(self.config(name)?.auto_promote)
    }

    pub fn get_strategy(&self, name: &str) -> CoreResult<DeploymentStrategy> {
        Ok(self.config(name)?.deployment_strategy)
    }

    /// Readiness report for `name`. Never fails.
    pub fn validate(&self, name: &str) -> ValidationResult {
        let config = match self.table.get(name) {
            Some(config) => config,
            None => {
                return ValidationResult::new(
                    vec![format!("Environment '{}' is not configured", name)],
                    Vec::new(),
                )
            }
        };

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if config.registry.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            errors.push(format!("Registry URL is not configured for '{}'", name));
        }
        if config.cluster.namespace.trim().is_empty() {
            warnings.push(format!("Cluster namespace is not set for '{}'", name));
        }
        if name == PRODUCTION && !config.requires_approval {
            warnings.push("Production deployments do not require approval".to_string());
        }

        ValidationResult::new(errors, warnings)
    }

    /// Configuration for `name`, or a `ConfigurationError` carrying every
    /// validation error.
    pub fn ensure_deployable(&self, name: &str) -> CoreResult<&EnvironmentConfig> {
        let config = self.config(name)?;
        let report = self.validate(name);
        for warning in &report.warnings {
            tracing::warn!(environment = name, "{}", warning);
        }
        if !report.valid {
            return Err(CoreError::config(report.errors.join("; ")));
        }
        Ok(config)
    }
}

impl EnvironmentLookup for EnvironmentConfigResolver {
    fn get_config(&self, name: &str) -> CoreResult<EnvironmentConfig> {
        self.config(name).cloned()
    }

    fn environment_names(&self) -> Vec<String> {
        EnvironmentConfigResolver::environment_names(self)
    }
}

// ============================================================================
// Base Field Merge
// ============================================================================

fn merge_quantity(base: ResourceQuantity, patch: Option<&QuantityOverride>) -> ResourceQuantity {
    match patch {
        Some(patch) => ResourceQuantity {
            cpu: patch.cpu.clone().unwrap_or(base.cpu),
            memory: patch.memory.clone().unwrap_or(base.memory),
        },
        None => base,
    }
}

fn merge_override(base: BaseEnvironment, entry: &EnvironmentOverride) -> BaseEnvironment {
    let resources = match &entry.resources {
        Some(patch) => ResourceRequirements {
            requests: merge_quantity(base.resources.requests, patch.requests.as_ref()),
            limits: merge_quantity(base.resources.limits, patch.limits.as_ref()),
        },
        None => base.resources,
    };

    BaseEnvironment {
        name: base.name,
        display_name: entry.display_name.clone().unwrap_or(base.display_name),
        namespace: entry.namespace.clone().unwrap_or(base.namespace),
        requires_approval: entry.requires_approval.unwrap_or(base.requires_approval),
        auto_promote: entry.auto_promote.unwrap_or(base.auto_promote),
        deployment_strategy: entry.deployment_strategy.unwrap_or(base.deployment_strategy),
        replicas: entry.replicas.unwrap_or(base.replicas),
        resources,
        registry_url: entry.registry_url.clone().or(base.registry_url),
    }
}

/// Build an environment outside the default set; every required field must
/// be present.
fn new_environment(entry: &EnvironmentOverride) -> CoreResult<BaseEnvironment> {
    let requests = entry.resources.as_ref().and_then(|r| r.requests.as_ref());
    let limits = entry.resources.as_ref().and_then(|r| r.limits.as_ref());

    let required = [
        ("namespace", entry.namespace.is_some()),
        ("deploymentStrategy", entry.deployment_strategy.is_some()),
        ("replicas", entry.replicas.is_some()),
        ("resources.requests.cpu", requests.and_then(|q| q.cpu.as_ref()).is_some()),
        ("resources.requests.memory", requests.and_then(|q| q.memory.as_ref()).is_some()),
        ("resources.limits.cpu", limits.and_then(|q| q.cpu.as_ref()).is_some()),
        ("resources.limits.memory", limits.and_then(|q| q.memory.as_ref()).is_some()),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::config(format!(
            "Environment '{}' is missing required fields: {}",
            entry.name,
            missing.join(", ")
        )));
    }

    let quantity = |q: Option<&QuantityOverride>| ResourceQuantity {
        cpu: q.and_then(|q| q.cpu.clone()).unwrap_or_default(),
        memory: q.and_then(|q| q.memory.clone()).unwrap_or_default(),
    };

    Ok(BaseEnvironment {
        name: entry.name.clone(),
        display_name: entry.display_name.clone().unwrap_or_else(|| entry.name.clone()),
        namespace: entry.namespace.clone().unwrap_or_default(),
        requires_approval: entry.requires_approval.unwrap_or(false),
        auto_promote: entry.auto_promote.unwrap_or(false),
        deployment_strategy: entry.deployment_strategy.unwrap_or_default(),
        replicas: entry.replicas.unwrap_or(1),
        resources: ResourceRequirements {
            requests: quantity(requests),
            limits: quantity(limits),
        },
        registry_url: entry.registry_url.clone(),
    })
}

// ============================================================================
// Derived Sub-Configs
// ============================================================================

fn derive(global: &GlobalConfig, base: BaseEnvironment) -> EnvironmentConfig {
    let env = base.name.as_str();
    let registry = derive_registry(global, &base);
    let quality = derive_quality(global, env);
    let cluster = derive_cluster(global, &base);
    let monitoring = derive_monitoring(global, env);

    EnvironmentConfig {
        name: base.name,
        display_name: base.display_name,
        namespace: base.namespace,
        requires_approval: base.requires_approval,
        auto_promote: base.auto_promote,
        deployment_strategy: base.deployment_strategy,
        replicas: base.replicas,
        resources: base.resources,
        registry,
        quality,
        cluster,
        monitoring,
    }
}

fn derive_registry(global: &GlobalConfig, base: &BaseEnvironment) -> RegistryConfig {
    let env = base.name.as_str();
    let nexus = &global.nexus;
    let url = base
        .registry_url
        .clone()
        .or_else(|| nexus.environment_url(env).map(str::to_string))
        .or_else(|| {
            nexus
                .url
                .as_deref()
                .map(|u| format!("{}/{}", u.trim_end_matches('/'), env))
        });

    let repository = |artifact_type: &str| {
        let prefix = nexus
            .repositories
            .get(artifact_type)
            .map(String::as_str)
            .unwrap_or(artifact_type);
        format!("{}-{}", prefix, env)
    };

    RegistryConfig {
        url,
        docker_repository: repository("docker"),
        maven_repository: repository("maven"),
        npm_repository: repository("npm"),
        pypi_repository: repository("pypi"),
        raw_repository: repository("raw"),
    }
}

fn derive_quality(global: &GlobalConfig, env: &str) -> QualityConfig {
    let sonar = &global.sonarqube;
    let key = sonar.project_key.as_deref().unwrap_or(DEFAULT_PROJECT_KEY);

    QualityConfig {
        server_url: sonar.url.clone(),
        project_key: format!("{}-{}", key, env),
        gate_profile: if env == PRODUCTION { "Production" } else { "Default" }.to_string(),
        branch_analysis: sonar.branch_analysis.unwrap_or(true),
    }
}

fn derive_cluster(global: &GlobalConfig, base: &BaseEnvironment) -> ClusterConfig {
    let env = base.name.as_str();
    let k8s = &global.kubernetes;
    let prefix = k8s.context_prefix.as_deref().unwrap_or(DEFAULT_CONTEXT_PREFIX);
    let is_prod = env == PRODUCTION;

    ClusterConfig {
        namespace: base.namespace.clone(),
        context: format!("{}-{}", prefix, env),
        ingress_class: if is_prod { "nginx-prod" } else { "nginx-dev" }.to_string(),
        storage_class: k8s
            .storage_class
            .clone()
            .unwrap_or_else(|| if is_prod { "fast-ssd" } else { "standard" }.to_string()),
    }
}

fn derive_monitoring(global: &GlobalConfig, env: &str) -> MonitoringConfig {
    let monitoring = &global.monitoring;

    MonitoringConfig {
        metrics_enabled: monitoring.metrics_enabled.unwrap_or(true),
        alerting_enabled: matches!(env, "uat" | "prod"),
        dashboard_url: monitoring
            .grafana_url
            .as_deref()
            .map(|u| format!("{}/d/{}", u.trim_end_matches('/'), env)),
        log_level: if env == PRODUCTION {
            LogLevel::Warn
        } else {
            LogLevel::Info
        },
    }
}
