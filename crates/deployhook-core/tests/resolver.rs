//! Resolution of normalized events against a rule table.

use deployhook_core::{
    resolve, ActionRule, BranchRule, DaemonConfig, DeployContext, MatchStage, NormalizedEvent,
    RepoRule, Resolution, RuleSet,
};

fn cmd(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn rules() -> RuleSet {
    RuleSet::new(vec![
        RepoRule {
            name: "acme/site".to_string(),
            base_dir: "/srv".to_string(),
            proj_dir: "/srv/site".to_string(),
            branches: vec![
                BranchRule {
                    name: "main".to_string(),
                    actions: vec![
                        ActionRule {
                            label: "push".to_string(),
                            commands: vec![cmd(&["git", "pull"]), cmd(&["make", "build"])],
                        },
                        ActionRule {
                            label: "push".to_string(),
                            commands: vec![cmd(&["echo", "shadowed"])],
                        },
                    ],
                },
                BranchRule {
                    name: "develop".to_string(),
                    actions: vec![ActionRule {
                        label: "pull_request".to_string(),
                        commands: vec![cmd(&["make", "test"])],
                    }],
                },
            ],
        },
        RepoRule {
            name: "acme/site".to_string(),
            base_dir: "/other".to_string(),
            proj_dir: "/other/site".to_string(),
            branches: vec![],
        },
    ])
}

#[test]
fn full_match_returns_action_and_context() {
    let rules = rules();
    let event = NormalizedEvent::new(
        "acme/site",
        "refs/heads/main",
        "push",
        "https://example.com/acme/site",
    );

    match resolve(&rules, &event) {
        Resolution::Matched { action, context } => {
            assert_eq!(action.label, "push");
            assert_eq!(action.commands[0], cmd(&["git", "pull"]));
            assert_eq!(
                context,
                DeployContext {
                    base_dir: "/srv".to_string(),
                    proj_dir: "/srv/site".to_string(),
                    clone_url: "https://example.com/acme/site".to_string(),
                }
            );
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn first_matching_action_wins() {
    let rules = rules();
    let event = NormalizedEvent::new("acme/site", "refs/heads/main", "push", "u");
    let Resolution::Matched { action, .. } = resolve(&rules, &event) else {
        panic!("expected match");
    };
    assert_eq!(action.commands.len(), 2);
}

#[test]
fn first_matching_repo_shadows_duplicates() {
    let rules = rules();
    // The second acme/site entry has no branches; the first one is used.
    let event = NormalizedEvent::new("acme/site", "refs/heads/develop", "pull_request", "u");
    let Resolution::Matched { context, .. } = resolve(&rules, &event) else {
        panic!("expected match");
    };
    assert_eq!(context.base_dir, "/srv");
}

#[test]
fn clone_url_comes_from_event() {
    let rules = rules();
    let event = NormalizedEvent::new("acme/site", "refs/heads/main", "push", "git@host:x.git");
    let Resolution::Matched { context, .. } = resolve(&rules, &event) else {
        panic!("expected match");
    };
    assert_eq!(context.clone_url, "git@host:x.git");
}

#[test]
fn unknown_repository_is_repository_no_match() {
    let rules = rules();
    let event = NormalizedEvent::new("acme/other", "refs/heads/main", "push", "u");
    assert_eq!(
        resolve(&rules, &event),
        Resolution::NoMatch(MatchStage::Repository)
    );
}

#[test]
fn unknown_branch_is_branch_no_match() {
    let rules = rules();
    let event = NormalizedEvent::new("acme/site", "refs/heads/feature", "push", "u");
    assert_eq!(resolve(&rules, &event), Resolution::NoMatch(MatchStage::Branch));
}

#[test]
fn unprefixed_ref_is_branch_no_match() {
    let rules = rules();
    let event = NormalizedEvent::new("acme/site", "main", "push", "u");
    assert_eq!(resolve(&rules, &event), Resolution::NoMatch(MatchStage::Branch));
}

#[test]
fn unknown_label_is_action_no_match() {
    let rules = rules();
    let event = NormalizedEvent::new("acme/site", "refs/heads/develop", "push", "u");
    assert_eq!(resolve(&rules, &event), Resolution::NoMatch(MatchStage::Action));
}

#[test]
fn empty_rule_set_never_matches() {
    let rules = RuleSet::default();
    let event = NormalizedEvent::new("acme/site", "refs/heads/main", "push", "u");
    assert!(!resolve(&rules, &event).is_match());
}

#[test]
fn config_file_round_trip_through_resolver() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "bitbucket_hook": "/bitbucket",
            "port": 8082,
            "command_timeout_secs": 30,
            "deployment": [
                { "repo": "team/api", "base_dir": "/opt", "proj_dir": "/opt/api",
                  "branches": [ { "branch": "prod", "actions": [
                      { "action": "push", "commands": [["systemctl", "restart", "api"]] }
                  ] } ] }
            ]
        }"#,
    )
    .expect("write config");

    let config = DaemonConfig::load(&path).expect("load");
    assert_eq!(config.command_timeout_secs, 30);

    let event = NormalizedEvent::new("team/api", "refs/heads/prod", "push", "u");
    let Resolution::Matched { action, context } = resolve(&config.deployment, &event) else {
        panic!("expected match");
    };
    assert_eq!(action.commands[0][0], "systemctl");
    assert_eq!(context.proj_dir, "/opt/api");
}

#[test]
fn missing_config_file_is_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = DaemonConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, deployhook_core::ConfigError::Read { .. }));
}
