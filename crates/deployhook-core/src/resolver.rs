//! Three-level lookup from an event to the action it triggers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ActionRule, BranchRule, RepoRule, RuleSet};
use crate::event::NormalizedEvent;

/// Prefix joining a branch rule's short name to a full ref.
pub const REF_PREFIX: &str = "refs/heads/";

/// Values substitutable into command tokens for one deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployContext {
    pub base_dir: String,
    pub proj_dir: String,
    pub clone_url: String,
}

/// Lookup level at which resolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Repository,
    Branch,
    Action,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Repository => "repository",
            MatchStage::Branch => "branch",
            MatchStage::Action => "action",
        }
    }
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`resolve`].
///
/// A no-match is a legitimate "nothing to do", not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Matched {
        action: &'a ActionRule,
        context: DeployContext,
    },
    NoMatch(MatchStage),
}

impl Resolution<'_> {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

impl RepoRule {
    pub fn matches(&self, repo_name: &str) -> bool {
        self.name == repo_name
    }
}

impl BranchRule {
    /// Full ref this rule stands for.
    pub fn full_ref(&self) -> String {
        format!("{REF_PREFIX}{}", self.name)
    }

    /// Compares `refs/heads/<name>` against `git_ref` without allocating.
    pub fn matches(&self, git_ref: &str) -> bool {
        git_ref
            .strip_prefix(REF_PREFIX)
            .is_some_and(|short| short == self.name)
    }
}

impl ActionRule {
    pub fn matches(&self, label: &str) -> bool {
        self.label == label
    }
}

/// Resolve `event` against `rules`, first match wins at every level.
pub fn resolve<'a>(rules: &'a RuleSet, event: &NormalizedEvent) -> Resolution<'a> {
    let Some(repo) = rules.repos.iter().find(|r| r.matches(&event.repo_name)) else {
        return Resolution::NoMatch(MatchStage::Repository);
    };
    let Some(branch) = repo.branches.iter().find(|b| b.matches(&event.git_ref)) else {
        return Resolution::NoMatch(MatchStage::Branch);
    };
    let Some(action) = branch.actions.iter().find(|a| a.matches(&event.action_label)) else {
        return Resolution::NoMatch(MatchStage::Action);
    };

    Resolution::Matched {
        action,
        context: DeployContext {
            base_dir: repo.base_dir.clone(),
            proj_dir: repo.proj_dir.clone(),
            clone_url: event.clone_url.clone(),
        },
    }
}
