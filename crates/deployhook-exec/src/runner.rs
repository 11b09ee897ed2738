//! Ordered, fail-fast execution of an action's command list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use deployhook_core::{
    emit_command_started, emit_deploy_started, ActionRule, DeployContext, ExecError, METRICS,
};

use crate::executor::{CommandExecutor, CommandOutcome, ExecSession};

/// Summary of a fully successful action run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    /// Label of the action that ran.
    pub action: String,

    /// Commands completed, including `cd` and skipped clones.
    pub commands_run: usize,

    /// Clones skipped because the project directory existed.
    pub clones_skipped: usize,

    /// Session directory after the last command.
    pub final_dir: PathBuf,

    pub started_at: DateTime<Utc>,

    pub duration_ms: u64,
}

/// Drives a [`CommandExecutor`] over an action's commands.
#[derive(Clone)]
pub struct ActionRunner {
    executor: CommandExecutor,
    start_dir: PathBuf,
}

impl ActionRunner {
    /// Every run starts a fresh session at `start_dir`.
    pub fn new(executor: CommandExecutor, start_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            start_dir: start_dir.into(),
        }
    }

    pub fn start_dir(&self) -> &std::path::Path {
        &self.start_dir
    }

    /// Run every command in order, stopping at the first error.
    ///
    /// Nothing is rolled back: commands before the failing one keep their
    /// effects.
    pub async fn run(
        &self,
        action: &ActionRule,
        ctx: &DeployContext,
    ) -> Result<RunReport, ExecError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut session = ExecSession::new(&self.start_dir);
        let mut clones_skipped = 0;

        emit_deploy_started(&action.label, action.commands.len());

        for (index, command) in action.commands.iter().enumerate() {
            if let Some(program) = command.first() {
                emit_command_started(index, program);
            }
            match self.executor.execute(&mut session, command, ctx).await? {
                CommandOutcome::CloneSkipped => {
                    clones_skipped += 1;
                    METRICS.inc_clones_skipped();
                }
                CommandOutcome::ChangedDirectory(_) | CommandOutcome::Completed => {}
            }
            METRICS.inc_commands_executed();
        }

        Ok(RunReport {
            action: action.label.clone(),
            commands_run: action.commands.len(),
            clones_skipped,
            final_dir: session.cwd().to_path_buf(),
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
