//! Whole-token placeholder substitution.

use crate::resolver::DeployContext;

/// Reserved tokens replaced with deployment context values.
///
/// Matching is exact and case-sensitive on the whole token; a placeholder
/// embedded in a longer token is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `%base_dir%`
    BaseDir,
    /// `%proj_dir%`
    ProjDir,
    /// `%html_url%`
    CloneUrl,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [
        Placeholder::BaseDir,
        Placeholder::ProjDir,
        Placeholder::CloneUrl,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::BaseDir => "%base_dir%",
            Placeholder::ProjDir => "%proj_dir%",
            Placeholder::CloneUrl => "%html_url%",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "%base_dir%" => Some(Placeholder::BaseDir),
            "%proj_dir%" => Some(Placeholder::ProjDir),
            "%html_url%" => Some(Placeholder::CloneUrl),
            _ => None,
        }
    }

    pub fn value<'a>(&self, ctx: &'a DeployContext) -> &'a str {
        match self {
            Placeholder::BaseDir => &ctx.base_dir,
            Placeholder::ProjDir => &ctx.proj_dir,
            Placeholder::CloneUrl => &ctx.clone_url,
        }
    }
}

/// Replace every placeholder token with its context value, preserving order.
pub fn substitute(tokens: &[String], ctx: &DeployContext) -> Vec<String> {
    tokens
        .iter()
        .map(|token| match Placeholder::from_token(token) {
            Some(p) => p.value(ctx).to_string(),
            None => token.clone(),
        })
        .collect()
}
