//! HTTP surface: one POST route per configured host plus `/healthz`.

use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;
use tracing::info;

use deployhook_core::{emit_event_received, emit_request_dropped, DaemonConfig, NormalizedEvent};
use deployhook_exec::Deployer;

use crate::error::WebhookError;
use crate::hosts::{bitbucket, github};
use crate::signature;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub deployer: Deployer,
    pub github_secret: Option<Arc<str>>,
    deployments: TaskTracker,
}

impl AppState {
    pub fn new(deployer: Deployer, github_secret: Option<&str>) -> Self {
        Self {
            deployer,
            github_secret: github_secret.map(Arc::from),
            deployments: TaskTracker::new(),
        }
    }

    /// Hand the event to a background task; the request returns immediately.
    fn dispatch(&self, source: &'static str, event: NormalizedEvent) {
        emit_event_received(source, &event);
        let deployer = self.deployer.clone();
        self.deployments.spawn(async move {
            deployer.handle(&event).await;
        });
    }

    /// Deployments dispatched and not yet finished, queued ones included.
    pub fn in_flight(&self) -> usize {
        self.deployments.len()
    }

    /// Stop accepting deployments and wait for the dispatched ones to finish.
    pub async fn drain(&self) {
        self.deployments.close();
        let pending = self.deployments.len();
        if pending > 0 {
            info!(pending, "waiting for in-flight deployments");
        }
        self.deployments.wait().await;
    }
}

pub fn build_router(config: &DaemonConfig, state: AppState) -> Router {
    let mut router = Router::new().route("/healthz", get(healthz));
    if let Some(path) = &config.github_hook {
        router = router.route(path, post(github_hook));
    }
    if let Some(path) = &config.bitbucket_hook {
        router = router.route(path, post(bitbucket_hook));
    }
    router.with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn github_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let event = accept_github(&state, &headers, &body)
        .inspect_err(|e| emit_request_dropped(github::SOURCE, e))?;
    state.dispatch(github::SOURCE, event);
    Ok(StatusCode::ACCEPTED)
}

fn accept_github(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<NormalizedEvent, WebhookError> {
    if let Some(secret) = &state.github_secret {
        signature::verify(
            secret.as_bytes(),
            headers.get(github::SIGNATURE_HEADER),
            body,
        )?;
    }
    github::normalize(headers, body)
}

async fn bitbucket_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let event = bitbucket::normalize(&headers, &body)
        .inspect_err(|e| emit_request_dropped(bitbucket::SOURCE, e))?;
    state.dispatch(bitbucket::SOURCE, event);
    Ok(StatusCode::ACCEPTED)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &DaemonConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        addr = %addr,
        github_hook = ?config.github_hook,
        bitbucket_hook = ?config.bitbucket_hook,
        "deployhookd listening"
    );

    axum::serve(listener, build_router(config, state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    // Children are killed on drop, so exiting early would cut a deployment short.
    state.drain().await;
    info!("deployments drained");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
