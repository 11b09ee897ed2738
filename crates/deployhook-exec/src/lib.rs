//! deployhook execution
//!
//! Runs resolved actions:
//! - [`executor`]: one command, with `cd` and idempotent `git clone`
//! - [`runner`]: an action's commands in order, fail-fast
//! - [`lock`]: one action run in flight per process
//! - [`deployer`]: resolve + lock + run + log for one event

pub mod deployer;
pub mod executor;
pub mod lock;
pub mod runner;
pub mod spawner;

pub use deployer::{DeployOutcome, Deployer};
pub use executor::{CommandExecutor, CommandOutcome, ExecSession};
pub use lock::{ExecutionGuard, ExecutionLock};
pub use runner::{ActionRunner, RunReport};
pub use spawner::{ProcessExit, ProcessSpawner, SpawnRequest, TokioSpawner};
