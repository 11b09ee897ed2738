//! Single command execution.
//!
//! Two command shapes never reach the spawner:
//! - `cd <dir>` moves the session's working directory
//! - `git clone ...` is skipped when the project directory already exists
//!
//! The working directory lives in [`ExecSession`] and is handed to every
//! spawn; the process-wide current directory is never changed.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use deployhook_core::{emit_clone_skipped, substitute, DeployContext, ExecError, SpawnCause};

use crate::spawner::{ProcessSpawner, SpawnRequest};

/// Pseudo-command changing the session directory.
pub const CHDIR_COMMAND: &str = "cd";
/// Program/subcommand pair subject to the clone-idempotency check.
pub const CLONE_PROGRAM: &str = "git";
pub const CLONE_SUBCOMMAND: &str = "clone";

/// Working-directory state for one action run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSession {
    cwd: PathBuf,
}

impl ExecSession {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: start_dir.into(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve `path` against the session directory; absolute paths win.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(path)
    }
}

/// What a successfully executed command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    ChangedDirectory(PathBuf),
    CloneSkipped,
    Completed,
}

/// Executes one command line against a session.
#[derive(Clone)]
pub struct CommandExecutor {
    spawner: Arc<dyn ProcessSpawner>,
    timeout: Option<Duration>,
}

impl CommandExecutor {
    pub fn new(spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            spawner,
            timeout: None,
        }
    }

    /// Bound every spawned command; `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convenience for the config's `command_timeout_secs` (0 = unbounded).
    pub fn with_timeout_secs(self, secs: u64) -> Self {
        let timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self.with_timeout(timeout)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub async fn execute(
        &self,
        session: &mut ExecSession,
        command: &[String],
        ctx: &DeployContext,
    ) -> Result<CommandOutcome, ExecError> {
        let Some((program, rest)) = command.split_first() else {
            return Err(ExecError::EmptyCommand);
        };

        if program == CHDIR_COMMAND {
            return change_dir(session, rest, ctx).await;
        }

        // An empty proj_dir names no directory, so the clone always runs.
        if program == CLONE_PROGRAM
            && rest.first().map(String::as_str) == Some(CLONE_SUBCOMMAND)
            && !ctx.proj_dir.is_empty()
        {
            let proj_dir = session.resolve(&ctx.proj_dir);
            match tokio::fs::try_exists(&proj_dir).await {
                Ok(true) => {
                    emit_clone_skipped(&ctx.proj_dir);
                    return Ok(CommandOutcome::CloneSkipped);
                }
                Ok(false) => {}
                Err(cause) => {
                    return Err(ExecError::ExistenceCheck {
                        path: proj_dir,
                        cause,
                    })
                }
            }
        }

        let request = SpawnRequest {
            program: program.clone(),
            args: substitute(rest, ctx),
            cwd: session.cwd().to_path_buf(),
        };
        self.spawn(request).await
    }

    async fn spawn(&self, request: SpawnRequest) -> Result<CommandOutcome, ExecError> {
        let result = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.spawner.spawn(&request)).await {
                    Ok(result) => result,
                    Err(_) => {
                        return Err(ExecError::Timeout {
                            program: request.program,
                            args: request.args,
                            timeout_secs: limit.as_secs(),
                        })
                    }
                }
            }
            None => self.spawner.spawn(&request).await,
        };

        let cause = match result {
            Ok(exit) if exit.success() => return Ok(CommandOutcome::Completed),
            Ok(exit) => match exit.code {
                Some(code) => SpawnCause::ExitCode { code },
                None => SpawnCause::Signal,
            },
            Err(e) => SpawnCause::Start(e),
        };
        Err(ExecError::Spawn {
            program: request.program,
            args: request.args,
            cause,
        })
    }
}

async fn change_dir(
    session: &mut ExecSession,
    args: &[String],
    ctx: &DeployContext,
) -> Result<CommandOutcome, ExecError> {
    let args = substitute(args, ctx);
    let Some(target) = args.first() else {
        return Err(ExecError::Chdir {
            path: session.cwd().to_path_buf(),
            cause: io::Error::new(io::ErrorKind::InvalidInput, "missing target directory"),
        });
    };

    let path = session.resolve(target);
    // Stat through the directory so a missing search bit fails here, not at the next spawn.
    match tokio::fs::metadata(path.join(".")).await {
        Ok(meta) if meta.is_dir() => {
            session.cwd = path.clone();
            Ok(CommandOutcome::ChangedDirectory(path))
        }
        Ok(_) => Err(ExecError::Chdir {
            path,
            cause: io::Error::other("not a directory"),
        }),
        Err(cause) => Err(ExecError::Chdir { path, cause }),
    }
}
