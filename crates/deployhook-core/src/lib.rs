//! deployhook core library
//!
//! Turns a host-agnostic [`NormalizedEvent`] into the commands a deployment
//! should run:
//! - [`config`]: the rule table (repository → branch → action → commands)
//!   and the daemon configuration it is loaded from
//! - [`resolver`]: the three-level lookup producing a [`Resolution`]
//! - [`template`]: whole-token placeholder substitution
//! - [`error`]: execution and configuration error taxonomy

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod obs;
pub mod resolver;
pub mod template;

pub use config::{ActionRule, BranchRule, CommandLine, DaemonConfig, RepoRule, RuleSet};
pub use error::{ConfigError, ExecError, SpawnCause};
pub use event::NormalizedEvent;
pub use metrics::METRICS;
pub use obs::{
    deploy_span, emit_clone_skipped, emit_command_started, emit_deploy_failed,
    emit_deploy_finished, emit_deploy_started, emit_event_received, emit_no_match,
    emit_request_dropped,
};
pub use resolver::{resolve, DeployContext, MatchStage, Resolution, REF_PREFIX};
pub use template::{substitute, Placeholder};

/// deployhook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
