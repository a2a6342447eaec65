//! Build State Tracker
//!
//! Run-scoped ledger written by stage bodies and read by the quality gate and
//! the report generator. Each logical table sits behind its own lock so
//! parallel stages writing different tables never contend. Deployment
//! sequence numbers are handed out while the history lock is held, which
//! keeps the history sorted by sequence under any interleaving.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::models::{
    ArtifactRecord, DeploymentRecord, QualityResult, SecurityResult, TestCounts, TestResult,
};
use crate::report::{ReportSnapshot, REPORT_STATUS_COMPLETED};

#[derive(Debug, Default)]
struct DeploymentHistory {
    next_sequence: u64,
    records: Vec<DeploymentRecord>,
}

/// Append/overwrite ledger for a single run.
#[derive(Debug)]
pub struct BuildStateTracker {
    run_id: Uuid,
    metrics: Mutex<BTreeMap<String, Value>>,
    tests: Mutex<BTreeMap<String, TestResult>>,
    security: Mutex<BTreeMap<String, SecurityResult>>,
    quality: Mutex<BTreeMap<String, QualityResult>>,
    artifacts: Mutex<BTreeMap<String, Vec<ArtifactRecord>>>,
    deployments: Mutex<DeploymentHistory>,
}

impl Default for BuildStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a table, recovering the data if a writer panicked mid-update.
fn lock<T>(table: &Mutex<T>) -> MutexGuard<'_, T> {
    table.lock().unwrap_or_else(|e| e.into_inner())
}

impl BuildStateTracker {
    /// Create an empty ledger with a fresh run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            metrics: Mutex::new(BTreeMap::new()),
            tests: Mutex::new(BTreeMap::new()),
            security: Mutex::new(BTreeMap::new()),
            quality: Mutex::new(BTreeMap::new()),
            artifacts: Mutex::new(BTreeMap::new()),
            deployments: Mutex::new(DeploymentHistory::default()),
        }
    }

    /// Identifier of the run this ledger belongs to.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record a build metric, overwriting any previous value for `key`.
    pub fn record_metric(&self, key: impl Into<String>, value: impl Into<Value>) {
        lock(&self.metrics).insert(key.into(), value.into());
    }

    /// Record results for a test suite, overwriting by suite name.
    pub fn record_test_result(&self, suite: impl Into<String>, counts: TestCounts) {
        let suite_name = suite.into();
        let result = TestResult {
            suite_name: suite_name.clone(),
            passed: counts.passed,
            failed: counts.failed,
            total: counts.total,
        };
        lock(&self.tests).insert(suite_name, result);
    }

    /// Record a security scan outcome, overwriting by scan name.
    pub fn record_security_result(
        &self,
        scan: impl Into<String>,
        status: impl Into<String>,
        findings: Value,
    ) {
        let scan_name = scan.into();
        let result = SecurityResult {
            scan_name: scan_name.clone(),
            status: status.into(),
            findings,
        };
        lock(&self.security).insert(scan_name, result);
    }

    /// Record a quality check outcome, overwriting by check name.
    ///
    /// Two writers using the same check name race; last write wins.
    pub fn record_quality_result(&self, check: impl Into<String>, passed: bool, detail: Value) {
        let check_name = check.into();
        tracing::debug!(check = %check_name, passed, "Quality result recorded");
        let result = QualityResult {
            check_name: check_name.clone(),
            passed,
            detail,
        };
        lock(&self.quality).insert(check_name, result);
    }

    /// Append an artifact to the list for its type.
    pub fn register_artifact(&self, record: ArtifactRecord) {
        lock(&self.artifacts)
            .entry(record.artifact_type.clone())
            .or_default()
            .push(record);
    }

    /// Append a deployment to the audit trail and return its sequence number.
    pub fn record_deployment(&self, environment: impl Into<String>, detail: Value) -> u64 {
        let environment = environment.into();
        let mut history = lock(&self.deployments);
        let sequence = history.next_sequence;
        history.next_sequence += 1;
        history.records.push(DeploymentRecord {
            sequence,
            environment: environment.clone(),
            timestamp: Utc::now(),
            detail,
        });
        tracing::info!(environment = %environment, sequence, "Deployment recorded");
        sequence
    }

    /// All recorded quality results, ordered by check name.
    pub fn quality_results(&self) -> Vec<QualityResult> {
        lock(&self.quality).values().cloned().collect()
    }

    /// Names of the quality checks that did not pass, sorted.
    pub fn failed_quality_checks(&self) -> Vec<String> {
        lock(&self.quality)
            .values()
            .filter(|r| !r.passed)
            .map(|r| r.check_name.clone())
            .collect()
    }

    /// Deployment records for one environment, in sequence order.
    pub fn deployments_for(&self, environment: &str) -> Vec<DeploymentRecord> {
        lock(&self.deployments)
            .records
            .iter()
            .filter(|r| r.environment == environment)
            .cloned()
            .collect()
    }

    /// Value of a single metric.
    pub fn metric(&self, key: &str) -> Option<Value> {
        lock(&self.metrics).get(key).cloned()
    }

    /// Export the current ledger. Stamps `generatedAt` at call time.
    pub fn snapshot(&self) -> ReportSnapshot {
        let build_metrics = lock(&self.metrics).clone();
        let quality_gate_results = lock(&self.quality).clone();
        let test_results = lock(&self.tests).clone();
        let security_scan_results = lock(&self.security).clone();
        let artifact_registry = lock(&self.artifacts).clone();
        let deployment_history = lock(&self.deployments).records.clone();

        ReportSnapshot {
            run_id: self.run_id,
            build_metrics,
            quality_gate_results,
            test_results,
            security_scan_results,
            artifact_registry,
            deployment_history,
            generated_at: Utc::now(),
            status: REPORT_STATUS_COMPLETED.to_string(),
        }
    }
}
