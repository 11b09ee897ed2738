//! Process spawning seam.
//!
//! The executor never touches `std::process` directly; it hands a
//! [`SpawnRequest`] to a [`ProcessSpawner`]. Production uses
//! [`TokioSpawner`]; tests substitute recorders.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// A fully substituted program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child.
    pub cwd: PathBuf,
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub const SUCCESS: ProcessExit = ProcessExit { code: Some(0) };

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Starts a program and waits for it to finish.
///
/// Dropping the returned future must terminate the child: the executor
/// enforces its timeout by dropping it.
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    async fn spawn(&self, request: &SpawnRequest) -> std::io::Result<ProcessExit>;
}

/// Spawns real processes with inherited stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

#[async_trait]
impl ProcessSpawner for TokioSpawner {
    async fn spawn(&self, request: &SpawnRequest) -> std::io::Result<ProcessExit> {
        let mut child = Command::new(&request.program)
            .args(&request.args)
            .current_dir(&request.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let status = child.wait().await?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }
}
