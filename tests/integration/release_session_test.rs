//! Release Session Integration Tests
//!
//! A full run through `ReleaseSession` with in-memory collaborators: branch
//! resolution, pipeline execution, artifact publishing, change tickets and
//! report persistence.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use release_cascade::{
    load_report, stage_action, ArtifactStore, ChangeRequest, CommitMetadata, CoreError,
    CoreResult, GlobalConfig, ReleaseSession, SourceControl, TicketingSystem,
};
use release_cascade_pipeline::{ArtifactRecord, TestCounts};

// ============================================================================
// In-Memory Collaborators
// ============================================================================

struct StaticCommit(CommitMetadata);

#[async_trait]
impl SourceControl for StaticCommit {
    async fn current_commit(&self) -> CoreResult<CommitMetadata> {
        Ok(self.0.clone())
    }
}

struct BrokenCheckout;

#[async_trait]
impl SourceControl for BrokenCheckout {
    async fn current_commit(&self) -> CoreResult<CommitMetadata> {
        Err(CoreError::command("fatal: not a git repository"))
    }
}

#[derive(Default)]
struct RecordingTickets {
    created: Mutex<Vec<ChangeRequest>>,
    updated: Mutex<Vec<(String, ChangeRequest)>>,
}

#[async_trait]
impl TicketingSystem for RecordingTickets {
    async fn create_change(&self, request: &ChangeRequest) -> CoreResult<String> {
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok(format!("CHG-{}", created.len()))
    }

    async fn update_change(&self, ticket_id: &str, request: &ChangeRequest) -> CoreResult<()> {
        self.updated
            .lock()
            .unwrap()
            .push((ticket_id.to_string(), request.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    pushed: Mutex<Vec<(String, ArtifactRecord)>>,
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn push(&self, environment: &str, artifact: &ArtifactRecord) -> CoreResult<String> {
        self.pushed
            .lock()
            .unwrap()
            .push((environment.to_string(), artifact.clone()));
        Ok(format!("{}/{}:{}", environment, artifact.name, artifact.version))
    }

    async fn pull(
        &self,
        environment: &str,
        artifact_type: &str,
        name: &str,
        version: &str,
    ) -> CoreResult<ArtifactRecord> {
        self.pushed
            .lock()
            .unwrap()
            .iter()
            .find(|(env, a)| {
                env == environment
                    && a.artifact_type == artifact_type
                    && a.name == name
                    && a.version == version
            })
            .map(|(_, a)| a.clone())
            .ok_or_else(|| CoreError::not_found(format!("{}:{}", name, version)))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn global_config() -> GlobalConfig {
    GlobalConfig::from_json_str(
        r#"{
            "nexus": {"url": "https://nexus.example.com"},
            "monitoring": {"grafanaUrl": "https://grafana.example.com"}
        }"#,
    )
    .unwrap()
}

fn session_for(branch: &str) -> ReleaseSession {
    let mut commit = CommitMetadata::new(branch, "c0ffee00d15ea5e0123456789abcdef012345678");
    commit.author = "Release Bot".to_string();
    ReleaseSession::new(&global_config(), Arc::new(StaticCommit(commit))).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_develop_release_run() {
    let session = session_for("origin/develop");
    assert_eq!(session.docker_tag(31).await, "dev-31");

    let mut pipeline = session.orchestrator().await;
    pipeline
        .add_stage(
            "build",
            stage_action(|ctx| async move {
                ctx.register_artifact(ArtifactRecord::new("docker", "shop-api", "dev-31"));
                ctx.record_metric("build.durationMs", 1800u64);
                Ok(())
            }),
        )
        .unwrap();
    pipeline
        .add_parallel_stage(
            "tests",
            stage_action(|ctx| async move {
                ctx.record_test_result("unit", TestCounts::new(48, 2, 50));
                ctx.record_quality_result("unit-tests", true, json!({}));
                Ok(())
            }),
        )
        .unwrap();
    pipeline.execute().await.unwrap();

    let plan = session.authorize_deployment("sit").await.unwrap();
    assert!(plan.auto_promote);
    assert_eq!(
        plan.environment.monitoring.dashboard_url.as_deref(),
        Some("https://grafana.example.com/d/sit")
    );

    let store = MemoryStore::default();
    let locations = session.publish_artifacts(&store, "sit").await.unwrap();
    assert_eq!(locations, vec!["sit/shop-api:dev-31"]);
    let pulled = store.pull("sit", "docker", "shop-api", "dev-31").await.unwrap();
    assert_eq!(pulled.name, "shop-api");

    assert!(matches!(
        session.authorize_deployment("uat").await,
        Err(CoreError::PolicyViolation { .. })
    ));
}

#[tokio::test]
async fn test_change_ticket_carries_report() {
    let session = session_for("main");
    session.tracker().record_deployment("uat", json!({"tag": "87"}));

    let tickets = RecordingTickets::default();
    let ticket = session
        .open_change_ticket(&tickets, "prod", json!({"tag": "87"}))
        .await
        .unwrap();
    assert_eq!(ticket, "CHG-1");

    session.tracker().record_deployment("prod", json!({"tag": "87"}));
    session
        .update_change_ticket(&tickets, &ticket, "prod", json!({"tag": "87", "status": "done"}))
        .await
        .unwrap();

    let created = tickets.created.lock().unwrap();
    assert_eq!(created[0].environment, "prod");
    assert_eq!(created[0].report.deployment_history.len(), 1);

    let updated = tickets.updated.lock().unwrap();
    assert_eq!(updated[0].0, "CHG-1");
    assert_eq!(updated[0].1.report.deployment_history.len(), 2);
    assert_eq!(updated[0].1.report.run_id, created[0].report.run_id);
}

#[tokio::test]
async fn test_source_control_failure_degrades() {
    let session = ReleaseSession::new(&global_config(), Arc::new(BrokenCheckout)).unwrap();
    let info = session.branch_info().await;

    assert_eq!(info.name, "unknown");
    assert_eq!(info.commit_hash, "unknown");
    assert_eq!(info.policy, session.policies().default_policy());
    assert!(session.authorize_deployment("dev").await.is_ok());
}

#[tokio::test]
async fn test_report_round_trip() {
    let temp = TempDir::new().unwrap();
    let session = session_for("release/3.1.0");
    let tracker = session.tracker();
    tracker.record_test_result("integration", TestCounts::new(10, 0, 10));
    tracker.record_quality_result("sonar", true, json!({"bugs": 0}));
    tracker.record_security_result("image", "PASSED", json!({"critical": 0}));
    tracker.register_artifact(ArtifactRecord::new("maven", "shop-core", "3.1.0"));
    tracker.record_deployment("dev", json!({"tag": "rc-3-1-0-4"}));

    let path = temp.path().join("reports").join("run.json");
    let saved = session.save_report(&path).unwrap();
    let loaded = load_report(&path).unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(loaded.status, "COMPLETED");
    assert_eq!(loaded.summary().deployment_count, 1);
}
