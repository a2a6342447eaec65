//! Release Cascade Pipeline
//!
//! Stage orchestrator, run-scoped build ledger and report snapshots:
//!
//! - `models` - Ledger records (QualityResult, TestResult, DeploymentRecord, etc.)
//! - `state` - `BuildStateTracker`, the lock-per-table ledger
//! - `pipeline` - Serial / parallel / quality-gate orchestrator and `StageContext`
//! - `report` - `ReportSnapshot` and `ReportGenerator`
//!
//! Policy resolution and environment configuration live in the application
//! crate; this crate only sees them through `release_cascade_core`.

pub mod models;
pub mod pipeline;
pub mod report;
pub mod state;

// Re-export ledger model types
pub use models::{
    ArtifactRecord, DeploymentRecord, QualityResult, SecurityResult, StageKind, TestCounts,
    TestResult,
};

// Re-export pipeline types
pub use pipeline::{
    stage_action, PipelineConfig, PipelineOrchestrator, PipelinePhase, PipelineResult,
    StageAction, StageContext, StageFuture, StageOutcome,
};

// Re-export reporting types
pub use report::{ReportGenerator, ReportSnapshot, ReportSummary, REPORT_STATUS_COMPLETED};

// Re-export the ledger
pub use state::BuildStateTracker;
