//! Release Session
//!
//! Run-scoped wiring of the branch classifier, environment resolver, build
//! ledger and collaborators. A session resolves the branch once, hands out
//! orchestrators whose quality gate follows the branch policy, and turns the
//! ledger into reports and change tickets.

use std::path::Path;
use std::sync::Arc;

use release_cascade_core::{CoreResult, EnvironmentConfig};
use release_cascade_pipeline::{
    BuildStateTracker, PipelineConfig, PipelineOrchestrator, ReportGenerator, ReportSnapshot,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::branch::{BranchInfo, PolicyTable};
use super::collaborators::{ArtifactStore, ChangeRequest, SourceControl, TicketingSystem};
use super::environment::EnvironmentConfigResolver;
use super::report_store;
use crate::models::config::GlobalConfig;

/// Outcome of admitting a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub branch: String,
    pub environment: EnvironmentConfig,
    /// Either the branch policy or the environment demands sign-off
    pub requires_approval: bool,
    /// Both the branch policy and the environment allow promotion without
    /// a human, and no approval is required
    pub auto_promote: bool,
}

/// One release run.
pub struct ReleaseSession {
    policies: PolicyTable,
    environments: Arc<EnvironmentConfigResolver>,
    tracker: Arc<BuildStateTracker>,
    source_control: Arc<dyn SourceControl>,
    branch: OnceCell<BranchInfo>,
}

impl ReleaseSession {
    /// Build the policy table and environment table from `config`.
    pub fn new(config: &GlobalConfig, source_control: Arc<dyn SourceControl>) -> CoreResult<Self> {
        let policies = PolicyTable::builtin().with_overrides(&config.branch_policies)?;
        let environments = Arc::new(EnvironmentConfigResolver::new(config)?);
        let tracker = Arc::new(BuildStateTracker::new());

        tracing::info!(
            run_id = %tracker.run_id(),
            policies = policies.keys().len(),
            environments = environments.table().len(),
            "Release session created"
        );

        Ok(Self {
            policies,
            environments,
            tracker,
            source_control,
            branch: OnceCell::new(),
        })
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn environments(&self) -> &EnvironmentConfigResolver {
        &self.environments
    }

    pub fn tracker(&self) -> Arc<BuildStateTracker> {
        Arc::clone(&self.tracker)
    }

    /// Branch facts for this run, queried from source control on first use.
    ///
    /// A source-control failure yields degraded info carrying the default
    /// policy instead of an error.
    pub async fn branch_info(&self) -> &BranchInfo {
        self.branch
            .get_or_init(|| async {
                match self.source_control.current_commit().await {
                    Ok(commit) => {
                        let info = BranchInfo::from_commit(commit, &self.policies);
                        tracing::info!(
                            branch = %info.name,
                            branch_type = %info.branch_type,
                            commit = %info.short_hash,
                            "Resolved branch"
                        );
                        info
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Could not read commit metadata, using defaults"
                        );
                        BranchInfo::degraded(&self.policies)
                    }
                }
            })
            .await
    }

    /// A fresh orchestrator sharing this session's ledger and environments.
    pub async fn orchestrator(&self) -> PipelineOrchestrator {
        let info = self.branch_info().await;
        PipelineOrchestrator::new(PipelineConfig::for_policy(&info.policy), self.tracker())
            .with_environments(self.environments.clone())
    }

    /// Admit a deployment of the current branch to `environment`.
    ///
    /// Fails with `UnknownEnvironment`, `PolicyViolation`, or a
    /// configuration error when the environment is not deployable.
    pub async fn authorize_deployment(&self, environment: &str) -> CoreResult<DeploymentPlan> {
        let info = self.branch_info().await;
        self.environments.config(environment)?;
        info.validate_for_environment(environment)?;
        let config = self.environments.ensure_deployable(environment)?.clone();

        let requires_approval = info.needs_approval(environment) || config.requires_approval;
        let auto_promote =
            !requires_approval && config.auto_promote && info.can_auto_promote(environment);

        Ok(DeploymentPlan {
            branch: info.name.clone(),
            environment: config,
            requires_approval,
            auto_promote,
        })
    }

    /// Image tag for the current branch.
    pub async fn docker_tag(&self, build_number: u64) -> String {
        self.branch_info().await.docker_tag(build_number)
    }

    pub fn reporter(&self) -> ReportGenerator {
        ReportGenerator::new(self.tracker())
    }

    fn change_request(&self, environment: &str, deployment: Value) -> ChangeRequest {
        ChangeRequest {
            environment: environment.to_string(),
            deployment,
            report: self.reporter().snapshot(),
        }
    }

    /// Open a change ticket carrying the current report.
    pub async fn open_change_ticket(
        &self,
        ticketing: &dyn TicketingSystem,
        environment: &str,
        deployment: Value,
    ) -> CoreResult<String> {
        let request = self.change_request(environment, deployment);
        let ticket_id = ticketing.create_change(&request).await?;
        tracing::info!(ticket_id = %ticket_id, environment, "Opened change ticket");
        Ok(ticket_id)
    }

    /// Refresh an existing ticket with the current report.
    pub async fn update_change_ticket(
        &self,
        ticketing: &dyn TicketingSystem,
        ticket_id: &str,
        environment: &str,
        deployment: Value,
    ) -> CoreResult<()> {
        let request = self.change_request(environment, deployment);
        ticketing.update_change(ticket_id, &request).await?;
        tracing::debug!(ticket_id, environment, "Updated change ticket");
        Ok(())
    }

    /// Push every registered artifact to `environment`; returns the stored
    /// locations in registry order.
    pub async fn publish_artifacts(
        &self,
        store: &dyn ArtifactStore,
        environment: &str,
    ) -> CoreResult<Vec<String>> {
        self.environments.config(environment)?;
        let snapshot = self.reporter().snapshot();

        let mut locations = Vec::new();
        for artifact in snapshot.artifact_registry.values().flatten() {
            let location = store.push(environment, artifact).await?;
            tracing::debug!(artifact = %artifact.name, location = %location, "Pushed artifact");
            locations.push(location);
        }

        self.tracker
            .record_metric(format!("artifacts.{}.published", environment), locations.len() as u64);
        Ok(locations)
    }

    /// Snapshot the ledger and persist it to `path`.
    pub fn save_report(&self, path: impl AsRef<Path>) -> CoreResult<ReportSnapshot> {
        let snapshot = self.reporter().snapshot();
        report_store::save_report(&snapshot, path)?;
        Ok(snapshot)
    }
}
