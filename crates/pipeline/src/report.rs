//! Report Snapshots
//!
//! `ReportSnapshot` is the immutable export of a run's ledger; the
//! `ReportGenerator` produces snapshots and summaries on demand.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{ArtifactRecord, DeploymentRecord, QualityResult, SecurityResult, TestResult};
use crate::state::BuildStateTracker;

/// Terminal status stamped on every snapshot.
pub const REPORT_STATUS_COMPLETED: &str = "COMPLETED";

/// Point-in-time export of the build ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub run_id: Uuid,
    pub build_metrics: BTreeMap<String, Value>,
    pub quality_gate_results: BTreeMap<String, QualityResult>,
    pub test_results: BTreeMap<String, TestResult>,
    pub security_scan_results: BTreeMap<String, SecurityResult>,
    pub artifact_registry: BTreeMap<String, Vec<ArtifactRecord>>,
    pub deployment_history: Vec<DeploymentRecord>,
    pub generated_at: DateTime<Utc>,
    pub status: String,
}

/// Aggregate figures derived from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub failed_quality_checks: Vec<String>,
    pub artifact_count: usize,
    pub deployment_count: usize,
    pub last_deployment: Option<DeploymentRecord>,
}

impl ReportSnapshot {
    /// Summarize the snapshot's contents.
    pub fn summary(&self) -> ReportSummary {
        let (total_tests, passed_tests, failed_tests) = self
            .test_results
            .values()
            .fold((0u64, 0u64, 0u64), |(t, p, f), r| {
                (
                    t.saturating_add(r.total),
                    p.saturating_add(r.passed),
                    f.saturating_add(r.failed),
                )
            });

        ReportSummary {
            total_tests,
            passed_tests,
            failed_tests,
            failed_quality_checks: self
                .quality_gate_results
                .values()
                .filter(|r| !r.passed)
                .map(|r| r.check_name.clone())
                .collect(),
            artifact_count: self.artifact_registry.values().map(Vec::len).sum(),
            deployment_count: self.deployment_history.len(),
            last_deployment: self.deployment_history.last().cloned(),
        }
    }
}

/// Renders snapshots of a shared ledger.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    tracker: Arc<BuildStateTracker>,
}

impl ReportGenerator {
    pub fn new(tracker: Arc<BuildStateTracker>) -> Self {
        Self { tracker }
    }

    /// Snapshot the ledger as it stands now. Safe to call repeatedly.
    pub fn snapshot(&self) -> ReportSnapshot {
        let snapshot = self.tracker.snapshot();
        tracing::debug!(run_id = %snapshot.run_id, "Report snapshot generated");
        snapshot
    }

    /// Summary of a fresh snapshot.
    pub fn summary(&self) -> ReportSummary {
        self.snapshot().summary()
    }
}
