//! Collaborator Traits
//!
//! Side-effecting capabilities a release session depends on. Implementations
//! live outside this crate (git CLI, ticketing APIs, artifact repositories);
//! the engine itself never performs I/O against them.

use async_trait::async_trait;
use release_cascade_core::CoreResult;
use release_cascade_pipeline::{ArtifactRecord, ReportSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::branch::CommitMetadata;

/// Source control access for the working copy being released.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Metadata of the checked-out commit.
    async fn current_commit(&self) -> CoreResult<CommitMetadata>;
}

/// Payload handed to the ticketing system for a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub environment: String,
    /// Deployment details; opaque to the engine
    pub deployment: Value,
    pub report: ReportSnapshot,
}

/// Change-management integration.
#[async_trait]
pub trait TicketingSystem: Send + Sync {
    /// Open a change ticket and return its id.
    async fn create_change(&self, request: &ChangeRequest) -> CoreResult<String>;

    /// Attach an updated request to an existing ticket.
    async fn update_change(&self, ticket_id: &str, request: &ChangeRequest) -> CoreResult<()>;
}

/// Artifact repository integration.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload an artifact for `environment`; returns where it was stored.
    async fn push(&self, environment: &str, artifact: &ArtifactRecord) -> CoreResult<String>;

    /// Fetch a previously pushed artifact's record.
    async fn pull(
        &self,
        environment: &str,
        artifact_type: &str,
        name: &str,
        version: &str,
    ) -> CoreResult<ArtifactRecord>;
}
