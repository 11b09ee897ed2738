//! Structured lifecycle events for deployments.
//!
//! Every handled event gets a [`deploy_span`] tagged with a fresh deployment
//! id; the `emit_*` functions log the lifecycle inside it at `info!` level,
//! failures at `warn!`/`error!`.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::event::NormalizedEvent;
use crate::resolver::MatchStage;

/// Span covering one event from receipt to outcome.
///
/// Attach with `tracing::Instrument` rather than entering it, so the
/// deployment future stays `Send`.
pub fn deploy_span(deployment_id: Uuid, event: &NormalizedEvent) -> tracing::Span {
    tracing::info_span!(
        "deployhook.deploy",
        deployment_id = %deployment_id,
        repo = %event.repo_name,
        git_ref = %event.git_ref,
    )
}

pub fn emit_event_received(source: &str, event: &NormalizedEvent) {
    info!(
        event = "deploy.received",
        source = %source,
        repo = %event.repo_name,
        git_ref = %event.git_ref,
        action = %event.action_label,
    );
}

pub fn emit_no_match(stage: MatchStage, event: &NormalizedEvent) {
    info!(
        event = "deploy.no_match",
        stage = %stage,
        repo = %event.repo_name,
        git_ref = %event.git_ref,
        action = %event.action_label,
        "no rule matched, dropping event"
    );
}

pub fn emit_deploy_started(action: &str, commands: usize) {
    info!(event = "deploy.started", action = %action, commands = commands);
}

pub fn emit_command_started(index: usize, program: &str) {
    info!(event = "deploy.command", index = index, program = %program);
}

pub fn emit_clone_skipped(proj_dir: &str) {
    info!(event = "deploy.clone_skipped", proj_dir = %proj_dir, "project directory exists");
}

pub fn emit_deploy_finished(commands_run: usize, duration_ms: u64) {
    info!(
        event = "deploy.finished",
        commands_run = commands_run,
        duration_ms = duration_ms,
    );
}

pub fn emit_deploy_failed(error: &dyn std::fmt::Display) {
    error!(event = "deploy.failed", error = %error);
}

/// Emit event: an inbound request was dropped before normalization finished.
pub fn emit_request_dropped(source: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "deploy.dropped", source = %source, reason = %reason);
}
