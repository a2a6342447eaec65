//! Build Ledger Models
//!
//! Records accumulated by the `BuildStateTracker` during a run and exported
//! through `ReportSnapshot`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single quality check. The quality gate reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityResult {
    pub check_name: String,
    pub passed: bool,
    /// Opaque payload from the checker (coverage numbers, issue counts, ...)
    pub detail: Value,
}

/// Counts reported by one test suite. `total` is taken as reported and is
/// not reconciled with `passed + failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestCounts {
    pub passed: u64,
    pub failed: u64,
    pub total: u64,
}

impl TestCounts {
    pub fn new(passed: u64, failed: u64, total: u64) -> Self {
        Self {
            passed,
            failed,
            total,
        }
    }
}

/// Test results for one suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub suite_name: String,
    pub passed: u64,
    pub failed: u64,
    pub total: u64,
}

/// Result of one security scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityResult {
    pub scan_name: String,
    pub status: String,
    pub findings: Value,
}

/// A build output registered for publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRecord {
    pub artifact_type: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub metadata: Value,
}

impl ArtifactRecord {
    pub fn new(
        artifact_type: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            name: name.into(),
            version: version.into(),
            metadata: Value::Null,
        }
    }

    /// Attach free-form metadata (digest, size, repository path, ...).
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One entry of the append-only deployment audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Monotonically increasing per tracker, assigned at append time
    pub sequence: u64,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    /// Status, image, strategy and whatever else the deploy stage reports
    pub detail: Value,
}

/// Whether a stage ran in the serial or the parallel phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Serial,
    Parallel,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Serial => write!(f, "serial"),
            StageKind::Parallel => write!(f, "parallel"),
        }
    }
}
