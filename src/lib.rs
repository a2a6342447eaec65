//! Release Cascade
//!
//! Branch-policy resolution and release pipeline orchestration. This crate
//! provides:
//! - Branch classification and policy lookup (exact, glob, type fallback)
//! - Per-environment configuration resolved from defaults and overrides
//! - The `ReleaseSession` that ties branch, environments, pipeline and
//!   reporting together for one run
//!
//! Errors and shared models come from `release_cascade_core`; the stage
//! orchestrator and build ledger come from `release_cascade_pipeline`.

pub mod models;
pub mod services;

pub use models::config::GlobalConfig;
pub use models::branch::CommitMetadata;
pub use services::{
    load_report, save_report, ArtifactStore, BranchInfo, ChangeRequest, DeploymentPlan,
    EnvironmentConfigResolver, PolicyTable, ReleaseSession, SourceControl, TicketingSystem,
};

pub use release_cascade_core::{CoreError, CoreResult};
pub use release_cascade_pipeline::{
    stage_action, BuildStateTracker, PipelineOrchestrator, ReportGenerator, ReportSnapshot,
    StageContext,
};
