//! deployhookd - webhook-triggered deployments
//!
//! ## Commands
//!
//! - `serve`: listen for webhooks and run matching actions
//! - `check`: validate a configuration file
//! - `resolve`: show which commands an event would run, without running them

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use deployhook_core::{substitute, DaemonConfig, NormalizedEvent, Resolution};
use deployhookd::{deployer_from_config, init_tracing, serve, AppState};

#[derive(Parser)]
#[command(name = "deployhookd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run deployment commands on source-control webhooks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Path to the JSON configuration file
        #[arg(short, long, env = "DEPLOYHOOK_CONFIG")]
        config: PathBuf,
    },

    /// Validate a configuration file and print a summary
    Check {
        #[arg(short, long, env = "DEPLOYHOOK_CONFIG")]
        config: PathBuf,
    },

    /// Resolve an event against the configuration and print its commands
    Resolve {
        #[arg(short, long, env = "DEPLOYHOOK_CONFIG")]
        config: PathBuf,

        /// Repository name, e.g. owner/name
        #[arg(long)]
        repo: String,

        /// Full ref, e.g. refs/heads/main
        #[arg(long = "ref")]
        git_ref: String,

        /// Event label
        #[arg(long, default_value = "push")]
        action: String,

        /// Clone URL substituted for %html_url%
        #[arg(long, default_value = "")]
        clone_url: String,
    },
}

fn load(path: &Path) -> Result<DaemonConfig> {
    DaemonConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Serve { config } => cmd_serve(&config).await,
        Commands::Check { config } => cmd_check(&config),
        Commands::Resolve {
            config,
            repo,
            git_ref,
            action,
            clone_url,
        } => cmd_resolve(
            &config,
            &NormalizedEvent::new(repo, git_ref, action, clone_url),
        ),
    }
}

async fn cmd_serve(path: &Path) -> Result<()> {
    let config = load(path)?;
    let start_dir = std::env::current_dir().context("reading working directory")?;
    info!(
        config = %path.display(),
        repos = config.deployment.repos.len(),
        start_dir = %start_dir.display(),
        version = deployhook_core::VERSION,
        "starting deployhookd"
    );

    let deployer = deployer_from_config(&config, start_dir);
    let state = AppState::new(deployer, config.github_secret.as_deref());
    serve(&config, state).await
}

fn cmd_check(path: &Path) -> Result<()> {
    let config = load(path)?;
    println!("Config {} is valid", path.display());
    println!("  listen:       {}", config.bind_addr());
    if let Some(hook) = &config.github_hook {
        let signed = if config.github_secret.is_some() {
            "signed"
        } else {
            "unsigned"
        };
        println!("  github hook:  {hook} ({signed})");
    }
    if let Some(hook) = &config.bitbucket_hook {
        println!("  bitbucket:    {hook}");
    }
    println!("  timeout:      {}s", config.command_timeout_secs);
    println!(
        "  rules:        {} repositories, {} actions",
        config.deployment.repos.len(),
        config.deployment.action_count()
    );
    Ok(())
}

fn cmd_resolve(path: &Path, event: &NormalizedEvent) -> Result<()> {
    let config = load(path)?;
    match deployhook_core::resolve(&config.deployment, event) {
        Resolution::NoMatch(stage) => {
            println!("no match at {stage} level");
        }
        Resolution::Matched { action, context } => {
            println!(
                "action '{}' ({} commands)",
                action.label,
                action.commands.len()
            );
            for command in &action.commands {
                let Some((program, args)) = command.split_first() else {
                    println!("  <empty command>");
                    continue;
                };
                let args = substitute(args, &context);
                println!("  {} {}", program, args.join(" "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_args_parse() {
        let cli = Cli::try_parse_from([
            "deployhookd",
            "resolve",
            "--config",
            "c.json",
            "--repo",
            "acme/site",
            "--ref",
            "refs/heads/main",
        ])
        .expect("parse");
        match cli.command {
            Commands::Resolve { action, git_ref, .. } => {
                assert_eq!(action, "push");
                assert_eq!(git_ref, "refs/heads/main");
            }
            _ => panic!("expected resolve"),
        }
    }
}
