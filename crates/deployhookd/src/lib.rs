//! deployhookd: HTTP front end for deployhook.
//!
//! Decodes GitHub and Bitbucket webhooks into normalized events and hands
//! them to a [`deployhook_exec::Deployer`] in the background.

pub mod error;
pub mod hosts;
pub mod server;
pub mod signature;
pub mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use deployhook_core::DaemonConfig;
use deployhook_exec::{ActionRunner, CommandExecutor, Deployer, TokioSpawner};

pub use error::WebhookError;
pub use server::{build_router, serve, AppState};
pub use telemetry::init_tracing;

/// Production deployer for `config`, with runs starting in `start_dir`.
pub fn deployer_from_config(config: &DaemonConfig, start_dir: PathBuf) -> Deployer {
    let executor =
        CommandExecutor::new(Arc::new(TokioSpawner)).with_timeout_secs(config.command_timeout_secs);
    Deployer::new(
        Arc::new(config.deployment.clone()),
        ActionRunner::new(executor, start_dir),
    )
}
