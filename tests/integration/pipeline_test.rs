//! Pipeline Integration Tests
//!
//! Orchestrator runs against a resolved environment table and the shared
//! build ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;

use release_cascade::{
    stage_action, BuildStateTracker, CoreError, EnvironmentConfigResolver, GlobalConfig,
    PipelineOrchestrator, ReportGenerator,
};
use release_cascade_pipeline::{ArtifactRecord, PipelineConfig, PipelinePhase, TestCounts};

// ============================================================================
// Helper Functions
// ============================================================================

fn orchestrator(tracker: Arc<BuildStateTracker>) -> PipelineOrchestrator {
    let config = GlobalConfig::from_json_str(r#"{"nexus": {"url": "https://nexus.example.com"}}"#)
        .unwrap();
    let resolver = Arc::new(EnvironmentConfigResolver::new(&config).unwrap());
    PipelineOrchestrator::new(PipelineConfig::default(), tracker).with_environments(resolver)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_failing_serial_stage_aborts() {
    let tracker = Arc::new(BuildStateTracker::new());
    let mut pipeline = orchestrator(tracker);
    let second_ran = Arc::new(AtomicBool::new(false));

    pipeline
        .add_stage(
            "A",
            stage_action(|_ctx| async { Err::<(), _>(CoreError::command("compile failed")) }),
        )
        .unwrap();
    let flag = second_ran.clone();
    pipeline
        .add_stage(
            "B",
            stage_action(move |_ctx| {
                let flag = flag.clone();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                }
            }),
        )
        .unwrap();

    let err = pipeline.execute().await.unwrap_err();
    assert_eq!(err.failed_stage(), Some("A"));
    assert!(!second_ran.load(Ordering::SeqCst));
    assert_eq!(pipeline.phase(), PipelinePhase::Failed);
}

#[tokio::test]
async fn test_full_run_produces_report() {
    let tracker = Arc::new(BuildStateTracker::new());
    let mut pipeline = orchestrator(tracker.clone());

    pipeline
        .add_stage(
            "build",
            stage_action(|ctx| async move {
                ctx.register_artifact(ArtifactRecord::new("docker", "shop-api", "dev-12"));
                Ok(())
            }),
        )
        .unwrap();
    pipeline
        .add_parallel_stage(
            "unit-tests",
            stage_action(|ctx| async move {
                ctx.record_test_result("unit", TestCounts::new(120, 0, 120));
                ctx.record_quality_result("coverage", true, json!({"percent": 84.5}));
                Ok(())
            }),
        )
        .unwrap();
    pipeline
        .add_parallel_stage(
            "security-scan",
            stage_action(|ctx| async move {
                ctx.record_security_result("dependencies", "PASSED", json!([]));
                Ok(())
            }),
        )
        .unwrap();
    pipeline
        .add_parallel_stage(
            "deploy-dev",
            stage_action(|ctx| async move {
                let env = ctx.get_config("dev")?;
                ctx.record_deployment(
                    env.name.clone(),
                    json!({"namespace": env.namespace, "registry": env.registry.url}),
                );
                Ok::<(), CoreError>(())
            }),
        )
        .unwrap();

    let result = pipeline.execute().await.unwrap();
    assert!(result.quality_gate_evaluated);
    assert_eq!(result.stage_outcomes.len(), 4);
    assert_eq!(pipeline.phase(), PipelinePhase::Completed);

    let summary = ReportGenerator::new(tracker).summary();
    assert_eq!(summary.total_tests, 120);
    assert_eq!(summary.artifact_count, 1);
    assert_eq!(summary.deployment_count, 1);
    assert!(summary.failed_quality_checks.is_empty());
}

#[tokio::test]
async fn test_unknown_environment_fails_stage() {
    let tracker = Arc::new(BuildStateTracker::new());
    let mut pipeline = orchestrator(tracker);
    pipeline
        .add_stage(
            "deploy-staging",
            stage_action(|ctx| async move {
                ctx.get_config("staging")?;
                Ok::<(), CoreError>(())
            }),
        )
        .unwrap();

    match pipeline.execute().await {
        Err(CoreError::StageExecution { stage, source }) => {
            assert_eq!(stage, "deploy-staging");
            assert!(matches!(*source, CoreError::UnknownEnvironment { .. }));
        }
        other => panic!("expected stage failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_quality_check_fails_pipeline() {
    let tracker = Arc::new(BuildStateTracker::new());
    let mut pipeline = orchestrator(tracker);
    pipeline
        .add_parallel_stage(
            "sonar",
            stage_action(|ctx| async move {
                ctx.record_quality_result("duplication", false, json!({"percent": 12}));
                ctx.record_quality_result("coverage", true, json!({"percent": 90}));
                Ok(())
            }),
        )
        .unwrap();

    match pipeline.execute().await {
        Err(CoreError::QualityGateFailure { failed_checks }) => {
            assert_eq!(failed_checks, vec!["duplication"]);
        }
        other => panic!("expected quality gate failure, got {:?}", other),
    }
}
