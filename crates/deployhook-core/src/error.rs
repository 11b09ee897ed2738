//! Error taxonomy for command execution and configuration loading.

use std::path::PathBuf;

/// Why a spawned program did not complete successfully.
#[derive(Debug, thiserror::Error)]
pub enum SpawnCause {
    #[error("could not start: {0}")]
    Start(#[source] std::io::Error),

    #[error("exited with status {code}")]
    ExitCode { code: i32 },

    #[error("terminated by signal")]
    Signal,
}

/// Errors produced while executing a deployment's commands.
///
/// The action runner returns the first one unmodified and runs nothing after
/// it.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("empty command")]
    EmptyCommand,

    #[error("cannot change directory to \"{}\": {cause}", path.display())]
    Chdir {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("cannot determine whether \"{}\" exists: {cause}", path.display())]
    ExistenceCheck {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("command {program} {args:?} failed: {cause}")]
    Spawn {
        program: String,
        args: Vec<String>,
        #[source]
        cause: SpawnCause,
    },

    #[error("command {program} {args:?} timed out after {timeout_secs}s")]
    Timeout {
        program: String,
        args: Vec<String>,
        timeout_secs: u64,
    },
}

/// Errors produced while loading the daemon configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
