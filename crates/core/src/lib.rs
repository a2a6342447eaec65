//! Release Cascade Core
//!
//! Foundational error types, branch policy and environment models, and the
//! context seams shared by the Release Cascade workspace. This crate depends
//! on nothing else in the workspace.
//!
//! ## Module Organization
//!
//! - `error` - Error taxonomy (`CoreError`, `CoreResult`)
//! - `policy` - Branch types, deployment strategies, `BranchPolicy`
//! - `environment` - Resolved `EnvironmentConfig` and its sub-configs
//! - `context` - `EnvironmentLookup` seam used by stage bodies

pub mod context;
pub mod environment;
pub mod error;
pub mod policy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Policy Types ───────────────────────────────────────────────────────
pub use policy::{normalize_branch_name, BranchPolicy, BranchType, DeploymentStrategy};

// ── Environment Types ──────────────────────────────────────────────────
pub use environment::{
    ClusterConfig, EnvironmentConfig, LogLevel, MonitoringConfig, QualityConfig, RegistryConfig,
    ResourceQuantity, ResourceRequirements, ValidationResult,
};

// ── Context Seams ──────────────────────────────────────────────────────
pub use context::EnvironmentLookup;
