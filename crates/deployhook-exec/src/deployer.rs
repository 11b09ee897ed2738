//! Entry point tying resolution, serialization and execution together.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use deployhook_core::{
    deploy_span, emit_deploy_failed, emit_deploy_finished, emit_no_match, resolve, ActionRule,
    DeployContext, ExecError, MatchStage, NormalizedEvent, Resolution, RuleSet, METRICS,
};

use crate::lock::ExecutionLock;
use crate::runner::{ActionRunner, RunReport};

/// What happened to one handled event.
#[derive(Debug)]
pub enum DeployOutcome {
    NoMatch(MatchStage),
    Succeeded(RunReport),
    Failed(ExecError),
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployOutcome::Succeeded(_))
    }
}

/// Shared by all request handlers; cloning is cheap.
#[derive(Clone)]
pub struct Deployer {
    rules: Arc<RuleSet>,
    runner: Arc<ActionRunner>,
    lock: ExecutionLock,
}

impl Deployer {
    pub fn new(rules: Arc<RuleSet>, runner: ActionRunner) -> Self {
        Self {
            rules,
            runner: Arc::new(runner),
            lock: ExecutionLock::new(),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn lock(&self) -> &ExecutionLock {
        &self.lock
    }

    pub fn resolve(&self, event: &NormalizedEvent) -> Resolution<'_> {
        resolve(&self.rules, event)
    }

    /// Run `action` once no other run is in flight.
    pub async fn run(
        &self,
        action: &ActionRule,
        ctx: &DeployContext,
    ) -> Result<RunReport, ExecError> {
        let _guard = self.lock.acquire().await;
        self.runner.run(action, ctx).await
    }

    /// Resolve and run `event`, logging every outcome.
    ///
    /// No outcome is an error for the caller: webhook senders never learn
    /// what happened.
    pub async fn handle(&self, event: &NormalizedEvent) -> DeployOutcome {
        let span = deploy_span(Uuid::new_v4(), event);
        let outcome = async {
            METRICS.inc_events_received();
            match self.resolve(event) {
                Resolution::NoMatch(stage) => {
                    emit_no_match(stage, event);
                    METRICS.inc_no_matches();
                    DeployOutcome::NoMatch(stage)
                }
                Resolution::Matched { action, context } => {
                    match self.run(action, &context).await {
                        Ok(report) => {
                            emit_deploy_finished(report.commands_run, report.duration_ms);
                            METRICS.inc_deployments_succeeded();
                            DeployOutcome::Succeeded(report)
                        }
                        Err(e) => {
                            emit_deploy_failed(&e);
                            METRICS.inc_deployments_failed();
                            DeployOutcome::Failed(e)
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await;

        METRICS.flush();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::CommandExecutor;
    use crate::spawner::{ProcessExit, ProcessSpawner, SpawnRequest};
    use async_trait::async_trait;
    use deployhook_core::{BranchRule, RepoRule};

    struct AlwaysOk;

    #[async_trait]
    impl ProcessSpawner for AlwaysOk {
        async fn spawn(&self, _request: &SpawnRequest) -> std::io::Result<ProcessExit> {
            Ok(ProcessExit::SUCCESS)
        }
    }

    fn deployer() -> Deployer {
        let rules = RuleSet::new(vec![RepoRule {
            name: "acme/site".to_string(),
            base_dir: "/".to_string(),
            proj_dir: "/".to_string(),
            branches: vec![BranchRule {
                name: "main".to_string(),
                actions: vec![ActionRule {
                    label: "push".to_string(),
                    commands: vec![vec!["make".to_string()]],
                }],
            }],
        }]);
        Deployer::new(
            Arc::new(rules),
            ActionRunner::new(CommandExecutor::new(Arc::new(AlwaysOk)), "/"),
        )
    }

    #[tokio::test]
    async fn test_handle_matched_event() {
        let event = NormalizedEvent::new("acme/site", "refs/heads/main", "push", "u");
        let outcome = deployer().handle(&event).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_handle_no_match_reports_stage() {
        let event = NormalizedEvent::new("acme/site", "refs/heads/main", "release", "u");
        match deployer().handle(&event).await {
            DeployOutcome::NoMatch(stage) => assert_eq!(stage, MatchStage::Action),
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lock_released_after_run() {
        let d = deployer();
        let event = NormalizedEvent::new("acme/site", "refs/heads/main", "push", "u");
        d.handle(&event).await;
        assert!(!d.lock().is_busy());
    }
}
