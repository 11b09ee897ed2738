//! Host-agnostic deployment trigger.

use serde::{Deserialize, Serialize};

/// An inbound webhook reduced to the four values the resolver needs.
///
/// Produced by a per-host adapter and consumed once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedEvent {
    /// Repository identifier, e.g. `owner/name`.
    pub repo_name: String,

    /// Full ref, expected as `refs/heads/<branch>`.
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Event label such as `push`.
    pub action_label: String,

    /// URL substituted for `%html_url%`.
    pub clone_url: String,
}

impl NormalizedEvent {
    pub fn new(
        repo_name: impl Into<String>,
        git_ref: impl Into<String>,
        action_label: impl Into<String>,
        clone_url: impl Into<String>,
    ) -> Self {
        Self {
            repo_name: repo_name.into(),
            git_ref: git_ref.into(),
            action_label: action_label.into(),
            clone_url: clone_url.into(),
        }
    }
}
