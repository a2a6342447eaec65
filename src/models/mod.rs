//! Data Models
//!
//! Configuration input and source-control boundary types.

pub mod branch;
pub mod config;

pub use branch::CommitMetadata;
pub use config::{
    BranchPolicyOverride, EnvironmentOverride, GlobalConfig, KubernetesSettings,
    MonitoringSettings, NexusSettings, QuantityOverride, ResourceOverride, SonarQubeSettings,
};
