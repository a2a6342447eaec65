//! Release Stage Pipeline
//!
//! Provides a `PipelineOrchestrator` that executes release stages in three
//! strictly ordered phases:
//! 1. SERIAL_STAGES - registration order, abort on the first failure
//! 2. PARALLEL_STAGES - fan out as tokio tasks, join all, then report the
//!    first failure in registration order
//! 3. QUALITY_GATE - every recorded quality result must have passed
//!
//! Stage bodies receive a `StageContext` exposing only the ledger writes and
//! environment lookups a stage needs.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use release_cascade_core::{
    BranchPolicy, CoreError, CoreResult, EnvironmentConfig, EnvironmentLookup,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ArtifactRecord, StageKind, TestCounts};
use crate::state::BuildStateTracker;

// ============================================================================
// Stage Actions
// ============================================================================

/// Future returned by a stage action.
pub type StageFuture = Pin<Box<dyn Future<Output = CoreResult<()>> + Send>>;

/// Deferred unit of work registered under a stage name.
pub type StageAction = Box<dyn Fn(StageContext) -> StageFuture + Send + Sync>;

/// Box an async closure into a `StageAction`.
pub fn stage_action<F, Fut>(f: F) -> StageAction
where
    F: Fn(StageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CoreResult<()>> + Send + 'static,
{
    Box::new(move |ctx| Box::pin(f(ctx)))
}

// ============================================================================
// Stage Context
// ============================================================================

/// Handle passed to every stage action.
///
/// Cloning is cheap; all clones write to the same run ledger.
#[derive(Clone)]
pub struct StageContext {
    stage_name: String,
    kind: StageKind,
    tracker: Arc<BuildStateTracker>,
    environments: Option<Arc<dyn EnvironmentLookup>>,
}

impl StageContext {
    /// Create a context for a stage writing to `tracker`.
    pub fn new(
        stage_name: impl Into<String>,
        kind: StageKind,
        tracker: Arc<BuildStateTracker>,
        environments: Option<Arc<dyn EnvironmentLookup>>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            kind,
            tracker,
            environments,
        }
    }

    /// Name of the stage this context was created for.
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn record_metric(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.tracker.record_metric(key, value);
    }

    pub fn record_test_result(&self, suite: impl Into<String>, counts: TestCounts) {
        self.tracker.record_test_result(suite, counts);
    }

    pub fn record_security_result(
        &self,
        scan: impl Into<String>,
        status: impl Into<String>,
        findings: Value,
    ) {
        self.tracker.record_security_result(scan, status, findings);
    }

    pub fn record_quality_result(&self, check: impl Into<String>, passed: bool, detail: Value) {
        self.tracker.record_quality_result(check, passed, detail);
    }

    pub fn register_artifact(&self, record: ArtifactRecord) {
        self.tracker.register_artifact(record);
    }

    /// Append to the deployment audit trail; returns the sequence number.
    pub fn record_deployment(&self, environment: impl Into<String>, detail: Value) -> u64 {
        self.tracker.record_deployment(environment, detail)
    }

    /// Resolved configuration for an environment.
    pub fn get_config(&self, environment: &str) -> CoreResult<EnvironmentConfig> {
        match &self.environments {
            Some(lookup) => lookup.get_config(environment),
            None => Err(CoreError::unknown_environment(environment, Vec::new())),
        }
    }
}

// ============================================================================
// Pipeline Config & Phases
// ============================================================================

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Run the aggregate quality gate after all stages
    pub quality_gate_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quality_gate_enabled: true,
        }
    }
}

impl PipelineConfig {
    /// Configuration dictated by a branch policy.
    pub fn for_policy(policy: &BranchPolicy) -> Self {
        Self {
            quality_gate_enabled: policy.quality_gate_required,
        }
    }
}

/// Lifecycle phase of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    /// Stages may still be registered
    Registering,
    SerialStages,
    ParallelStages,
    QualityGate,
    Completed,
    Failed,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Registering => write!(f, "registering"),
            PipelinePhase::SerialStages => write!(f, "serial_stages"),
            PipelinePhase::ParallelStages => write!(f, "parallel_stages"),
            PipelinePhase::QualityGate => write!(f, "quality_gate"),
            PipelinePhase::Completed => write!(f, "completed"),
            PipelinePhase::Failed => write!(f, "failed"),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    pub name: String,
    pub kind: StageKind,
    pub success: bool,
    pub duration_ms: u64,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// Serial outcomes in order, then parallel outcomes in registration order
    pub stage_outcomes: Vec<StageOutcome>,
    pub quality_gate_evaluated: bool,
    pub total_duration_ms: u64,
}

// ============================================================================
// Pipeline Orchestrator
// ============================================================================

/// Sequences serial stages, parallel stages and the quality gate.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    tracker: Arc<BuildStateTracker>,
    environments: Option<Arc<dyn EnvironmentLookup>>,
    /// Serial stages; duplicate names run once per registration
    serial: Vec<(String, StageAction)>,
    /// Parallel stages; a re-registered name keeps its slot
    parallel: Vec<(String, StageAction)>,
    phase: Mutex<PipelinePhase>,
}

impl PipelineOrchestrator {
    /// Create an orchestrator writing to `tracker`.
    pub fn new(config: PipelineConfig, tracker: Arc<BuildStateTracker>) -> Self {
        Self {
            config,
            tracker,
            environments: None,
            serial: Vec::new(),
            parallel: Vec::new(),
            phase: Mutex::new(PipelinePhase::Registering),
        }
    }

    /// Expose an environment table to stage contexts.
    pub fn with_environments(mut self, environments: Arc<dyn EnvironmentLookup>) -> Self {
        self.environments = Some(environments);
        self
    }

    /// Append a serial stage.
    pub fn add_stage(&mut self, name: &str, action: StageAction) -> CoreResult<()> {
        self.check_registration(name)?;
        self.serial.push((name.to_string(), action));
        Ok(())
    }

    /// Register a parallel stage, replacing any earlier action under `name`.
    pub fn add_parallel_stage(&mut self, name: &str, action: StageAction) -> CoreResult<()> {
        self.check_registration(name)?;
        match self.parallel.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => {
                tracing::debug!(stage = name, "Replacing parallel stage");
                slot.1 = action;
            }
            None => self.parallel.push((name.to_string(), action)),
        }
        Ok(())
    }

    fn check_registration(&self, name: &str) -> CoreResult<()> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("Stage name must not be empty"));
        }
        let phase = self.phase();
        if phase != PipelinePhase::Registering {
            return Err(CoreError::validation(format!(
                "Cannot register stage '{}' once the pipeline is {}",
                name, phase
            )));
        }
        Ok(())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PipelinePhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: PipelinePhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Names of the registered serial stages, in order.
    pub fn serial_stage_names(&self) -> Vec<&str> {
        self.serial.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Names of the registered parallel stages, in registration order.
    pub fn parallel_stage_names(&self) -> Vec<&str> {
        self.parallel.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn context(&self, name: &str, kind: StageKind) -> StageContext {
        StageContext::new(
            name,
            kind,
            Arc::clone(&self.tracker),
            self.environments.clone(),
        )
    }

    /// Run every phase. May be called once per orchestrator.
    pub async fn execute(&self) -> CoreResult<PipelineResult> {
        {
            let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
            if *phase != PipelinePhase::Registering {
                return Err(CoreError::validation(format!(
                    "Pipeline already executed (phase: {})",
                    phase
                )));
            }
            *phase = PipelinePhase::SerialStages;
        }

        let started = Instant::now();
        let mut stage_outcomes = Vec::with_capacity(self.serial.len() + self.parallel.len());

        for (name, action) in &self.serial {
            tracing::info!(stage = %name, "Starting serial stage");
            let stage_started = Instant::now();
            let result = AssertUnwindSafe(action(self.context(name, StageKind::Serial)))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(CoreError::internal("stage task panicked")));
            let outcome =
                self.finish_stage(name, StageKind::Serial, &result, stage_started.elapsed());
            stage_outcomes.push(outcome);

            if let Err(err) = result {
                tracing::warn!(
                    stage = %name,
                    error = %err,
                    "Serial stage failed, aborting pipeline"
                );
                self.set_phase(PipelinePhase::Failed);
                return Err(CoreError::stage(name.clone(), err));
            }
        }

        if !self.parallel.is_empty() {
            self.set_phase(PipelinePhase::ParallelStages);
            if let Err(err) = self.execute_parallel(&mut stage_outcomes).await {
                self.set_phase(PipelinePhase::Failed);
                return Err(err);
            }
        }

        let quality_gate_evaluated = self.config.quality_gate_enabled;
        if quality_gate_evaluated {
            self.set_phase(PipelinePhase::QualityGate);
            if let Err(err) = self.evaluate_quality_gate() {
                self.set_phase(PipelinePhase::Failed);
                return Err(err);
            }
        } else {
            tracing::info!("Quality gate disabled, skipping evaluation");
        }

        self.set_phase(PipelinePhase::Completed);
        Ok(PipelineResult {
            stage_outcomes,
            quality_gate_evaluated,
            total_duration_ms: duration_ms(started.elapsed()),
        })
    }

    /// Fan out every parallel stage, wait for all, then surface the first
    /// failure in registration order.
    async fn execute_parallel(&self, stage_outcomes: &mut Vec<StageOutcome>) -> CoreResult<()> {
        tracing::info!(count = self.parallel.len(), "Launching parallel stages");

        let handles: Vec<_> = self
            .parallel
            .iter()
            .map(|(name, action)| {
                let future = action(self.context(name, StageKind::Parallel));
                tokio::spawn(async move {
                    let stage_started = Instant::now();
                    let result = future.await;
                    (result, stage_started.elapsed())
                })
            })
            .collect();

        let joined = futures_util::future::join_all(handles).await;

        let mut first_failure = None;
        for ((name, _), joined) in self.parallel.iter().zip(joined) {
            let (result, elapsed) = match joined {
                Ok(finished) => finished,
                Err(join_err) => (
                    Err(CoreError::internal(format!("stage task aborted: {}", join_err))),
                    Duration::ZERO,
                ),
            };
            stage_outcomes.push(self.finish_stage(name, StageKind::Parallel, &result, elapsed));

            if let Err(err) = result {
                tracing::warn!(stage = %name, error = %err, "Parallel stage failed");
                if first_failure.is_none() {
                    first_failure = Some(CoreError::stage(name.clone(), err));
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn finish_stage(
        &self,
        name: &str,
        kind: StageKind,
        result: &CoreResult<()>,
        elapsed: Duration,
    ) -> StageOutcome {
        let duration_ms = duration_ms(elapsed);
        self.tracker
            .record_metric(format!("stage.{}.durationMs", name), duration_ms);
        if result.is_ok() {
            tracing::info!(stage = %name, kind = %kind, duration_ms, "Stage finished");
        }
        StageOutcome {
            name: name.to_string(),
            kind,
            success: result.is_ok(),
            duration_ms,
        }
    }

    /// Aggregate check over every recorded quality result. Passes vacuously
    /// when nothing was recorded.
    pub fn evaluate_quality_gate(&self) -> CoreResult<()> {
        let results = self.tracker.quality_results();
        let failed: Vec<String> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.check_name.clone())
            .collect();

        if failed.is_empty() {
            tracing::info!(checks = results.len(), "Quality gate passed");
            Ok(())
        } else {
            tracing::warn!(failed = ?failed, "Quality gate failed");
            Err(CoreError::quality_gate(failed))
        }
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================
