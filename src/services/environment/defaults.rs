//! Built-in Environment Defaults
//!
//! Base fields for the four standard environments. Sizing grows from `dev`
//! (smallest) to `prod` (largest).

use release_cascade_core::{DeploymentStrategy, ResourceQuantity, ResourceRequirements};

/// Names of the built-in environments, in promotion order.
pub const DEFAULT_ENVIRONMENTS: [&str; 4] = ["dev", "sit", "uat", "prod"];

/// Name of the production environment.
pub const PRODUCTION: &str = "prod";

/// Environment fields before service sub-configs are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseEnvironment {
    pub name: String,
    pub display_name: String,
    pub namespace: String,
    pub requires_approval: bool,
    pub auto_promote: bool,
    pub deployment_strategy: DeploymentStrategy,
    pub replicas: u32,
    pub resources: ResourceRequirements,
    /// Registry URL pinned for this environment, ahead of the nexus settings
    pub registry_url: Option<String>,
}

fn resources(req_cpu: &str, req_mem: &str, lim_cpu: &str, lim_mem: &str) -> ResourceRequirements {
    ResourceRequirements {
        requests: ResourceQuantity::new(req_cpu, req_mem),
        limits: ResourceQuantity::new(lim_cpu, lim_mem),
    }
}

/// Defaults for a built-in environment name.
pub fn default_environment(name: &str) -> Option<BaseEnvironment> {
    let (display_name, approval, auto_promote, strategy, replicas, resources) = match name {
        "dev" => (
            "Development",
            false,
            true,
            DeploymentStrategy::RollingUpdate,
            1,
            resources("250m", "512Mi", "500m", "1Gi"),
        ),
        "sit" => (
            "System Integration Testing",
            false,
            true,
            DeploymentStrategy::RollingUpdate,
            1,
            resources("500m", "1Gi", "1000m", "2Gi"),
        ),
        "uat" => (
            "User Acceptance Testing",
            true,
            false,
            DeploymentStrategy::BlueGreen,
            2,
            resources("1000m", "2Gi", "2000m", "4Gi"),
        ),
        "prod" => (
            "Production",
            true,
            false,
            DeploymentStrategy::BlueGreen,
            3,
            resources("2000m", "4Gi", "4000m", "8Gi"),
        ),
        _ => return None,
    };

    Some(BaseEnvironment {
        name: name.to_string(),
        display_name: display_name.to_string(),
        namespace: name.to_string(),
        requires_approval: approval,
        auto_promote,
        deployment_strategy: strategy,
        replicas,
        resources,
        registry_url: None,
    })
}
