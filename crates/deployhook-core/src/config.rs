//! Deployment rule table and daemon configuration.
//!
//! The configuration is a single JSON document loaded once at startup and
//! never mutated afterwards. The rule table is kept in file order: lookups
//! take the first match, so duplicates further down are shadowed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// One command: program first, arguments following.
pub type CommandLine = Vec<String>;

/// Default bind address when `host` is absent.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default per-command timeout when `command_timeout_secs` is absent.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Ordered set of monitored repositories.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RuleSet {
    pub repos: Vec<RepoRule>,
}

impl RuleSet {
    pub fn new(repos: Vec<RepoRule>) -> Self {
        Self { repos }
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Total number of actions across all repositories and branches.
    pub fn action_count(&self) -> usize {
        self.repos
            .iter()
            .flat_map(|r| r.branches.iter())
            .map(|b| b.actions.len())
            .sum()
    }
}

/// A monitored repository and where it lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoRule {
    /// Repository identifier as sent by the host, e.g. `owner/name`.
    #[serde(rename = "repo")]
    pub name: String,

    /// Directory the project is cloned into.
    pub base_dir: String,

    /// The project's own checkout directory.
    pub proj_dir: String,

    #[serde(default)]
    pub branches: Vec<BranchRule>,
}

/// A branch of a repository, stored by short name (`main`, not
/// `refs/heads/main`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchRule {
    #[serde(rename = "branch")]
    pub name: String,

    #[serde(default)]
    pub actions: Vec<ActionRule>,
}

/// Commands to run for one event label (`push`, `pull_request`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRule {
    #[serde(rename = "action")]
    pub label: String,

    #[serde(default)]
    pub commands: Vec<CommandLine>,
}

/// Full daemon configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Route of the GitHub endpoint; `None` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_hook: Option<String>,

    /// Route of the Bitbucket endpoint; `None` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitbucket_hook: Option<String>,

    /// Shared secret for `X-Hub-Signature-256` verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_secret: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    pub port: u16,

    /// Upper bound for a single spawned command, 0 = unbounded.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub deployment: RuleSet,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl DaemonConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        tracing::debug!(
            path = %path.display(),
            repos = config.deployment.repos.len(),
            actions = config.deployment.action_count(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".to_string()));
        }

        let hooks: Vec<&str> = [&self.github_hook, &self.bitbucket_hook]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if hooks.is_empty() {
            return Err(ConfigError::Invalid(
                "no webhook endpoint configured (github_hook or bitbucket_hook)".to_string(),
            ));
        }
        for hook in &hooks {
            if !hook.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "hook path '{hook}' must start with '/'"
                )));
            }
            if *hook == "/healthz" {
                return Err(ConfigError::Invalid(
                    "hook path '/healthz' is reserved".to_string(),
                ));
            }
        }
        if hooks.len() == 2 && hooks[0] == hooks[1] {
            return Err(ConfigError::Invalid(format!(
                "github_hook and bitbucket_hook share the path '{}'",
                hooks[0]
            )));
        }

        for repo in &self.deployment.repos {
            if repo.name.is_empty() {
                return Err(ConfigError::Invalid(
                    "repository entry with empty name".to_string(),
                ));
            }
            if repo.base_dir.is_empty() || repo.proj_dir.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "repository '{}' needs both base_dir and proj_dir",
                    repo.name
                )));
            }
        }
        Ok(())
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "github_hook": "/github",
        "port": 8082,
        "deployment": [
            {
                "repo": "acme/site",
                "base_dir": "/srv",
                "proj_dir": "/srv/site",
                "branches": [
                    {
                        "branch": "main",
                        "actions": [
                            { "action": "push", "commands": [["cd", "%base_dir%"], ["git", "clone", "%html_url%"]] },
                            { "action": "ping", "commands": [] }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let config = DaemonConfig::from_json(SAMPLE).expect("parse");
        assert_eq!(config.port, 8082);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.command_timeout_secs, DEFAULT_COMMAND_TIMEOUT_SECS);
        assert!(config.bitbucket_hook.is_none());

        let repo = &config.deployment.repos[0];
        assert_eq!(repo.name, "acme/site");
        assert_eq!(repo.branches[0].name, "main");
        assert_eq!(repo.branches[0].actions[0].label, "push");
        assert_eq!(
            repo.branches[0].actions[0].commands[1],
            vec!["git", "clone", "%html_url%"]
        );
        assert_eq!(config.deployment.action_count(), 2);
    }

    #[test]
    fn test_bind_addr() {
        let config = DaemonConfig::from_json(SAMPLE).expect("parse");
        assert_eq!(config.bind_addr(), "0.0.0.0:8082");
    }

    #[test]
    fn test_zero_port_rejected() {
        let raw = SAMPLE.replace("8082", "0");
        let err = DaemonConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_empty_proj_dir_rejected() {
        let raw = SAMPLE.replace("\"/srv/site\"", "\"\"");
        let err = DaemonConfig::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("acme/site"));
    }

    #[test]
    fn test_empty_base_dir_rejected() {
        let raw = SAMPLE.replace("\"base_dir\": \"/srv\"", "\"base_dir\": \"\"");
        let err = DaemonConfig::from_json(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_relative_hook_rejected() {
        let raw = SAMPLE.replace("\"/github\"", "\"github\"");
        let err = DaemonConfig::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_missing_hooks_rejected() {
        let raw = r#"{ "port": 9000, "deployment": [] }"#;
        let err = DaemonConfig::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("no webhook endpoint"));
    }

    #[test]
    fn test_shared_hook_path_rejected() {
        let raw = r#"{ "github_hook": "/hook", "bitbucket_hook": "/hook", "port": 9000 }"#;
        let err = DaemonConfig::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("share the path"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = DaemonConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
