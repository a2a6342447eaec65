//! Services
//!
//! Business logic for release runs:
//! - `branch` - Branch classification, policy table, docker tags
//! - `environment` - Environment defaults and the layered resolver
//! - `collaborators` - Source control, ticketing and artifact store traits
//! - `release` - Run-scoped `ReleaseSession`
//! - `report_store` - JSON persistence of report snapshots

pub mod branch;
pub mod collaborators;
pub mod environment;
pub mod release;
pub mod report_store;

pub use branch::{BranchInfo, BranchPattern, PolicyResolution, PolicySource, PolicyTable};
pub use collaborators::{ArtifactStore, ChangeRequest, SourceControl, TicketingSystem};
pub use environment::EnvironmentConfigResolver;
pub use release::{DeploymentPlan, ReleaseSession};
pub use report_store::{load_report, save_report};
