//! git-si: use local git branches on top of an SVN working copy.
//!
//! Each subcommand maps to one [`Action`] of the core engine. Any failure
//! ends the process with a single error line and a failing exit status.

mod style;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gitsi_core::{Action, SiConfig, SyncEngine, SystemRunner};

use crate::ui::TerminalUi;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Use local git branches on top of an SVN working copy.
#[derive(Parser, Debug)]
#[command(name = "git-si", version)]
struct Cli {
    /// Show debug logging.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Hide progress notices.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// svn binary to use.
    #[arg(long, global = true, value_name = "PATH")]
    svn: Option<String>,

    /// git binary to use.
    #[arg(long, global = true, value_name = "PATH")]
    git: Option<String>,

    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show svn status, without externals and git files.
    Status {
        /// Files or options passed to `svn status`.
        #[arg(allow_hyphen_values = true)]
        files: Vec<String>,
    },

    /// Show svn diff, adding git-tracked files to svn first.
    Diff {
        /// Files or options passed to `svn diff`.
        #[arg(allow_hyphen_values = true)]
        files: Vec<String>,
    },

    /// Add files to both svn and git.
    Add {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Update the mirror branch from svn.
    Fetch,

    /// Rebase the current branch onto the mirror branch.
    Rebase,

    /// Fetch, then rebase.
    Pull,

    /// Commit the current branch to svn.
    Commit,

    /// Add files to svn that have been added to git.
    Readd,

    /// Set up git-si in an svn working copy.
    Init,
}

impl From<Commands> for Action {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Status { files } => Action::Status(files),
            Commands::Diff { files } => Action::Diff(files),
            Commands::Add { files } => Action::Add(files),
            Commands::Fetch => Action::Fetch,
            Commands::Rebase => Action::Rebase,
            Commands::Pull => Action::Pull,
            Commands::Commit => Action::Commit,
            Commands::Readd => Action::Readd,
            Commands::Init => Action::Init,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::error(&format!("{e:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = SiConfig::discover(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_binaries(cli.svn.as_deref(), cli.git.as_deref());
    config.validate().context("invalid configuration")?;
    debug!(?config, "configuration loaded");

    let workdir = std::env::current_dir().context("failed to read current directory")?;
    let ui = TerminalUi::new(cli.quiet);
    let runner = SystemRunner;
    let engine = SyncEngine::new(config, &runner, &ui, workdir);

    let action = Action::from(cli.command);
    engine.execute(&action)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_passes_options_through() {
        let cli = Cli::try_parse_from(["git-si", "status", "-v", "src"]).unwrap();
        assert_eq!(
            Action::from(cli.command),
            Action::Status(vec!["-v".to_string(), "src".to_string()])
        );
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "git-si", "fetch", "--svn", "/opt/svn", "--debug", "--quiet",
        ])
        .unwrap();
        assert!(cli.debug && cli.quiet);
        assert_eq!(cli.svn.as_deref(), Some("/opt/svn"));
        assert_eq!(cli.git, None);
        assert_eq!(Action::from(cli.command), Action::Fetch);
    }

    #[test]
    fn test_add_requires_files() {
        assert!(Cli::try_parse_from(["git-si", "add"]).is_err());
        let cli = Cli::try_parse_from(["git-si", "add", "a.c", "b.c"]).unwrap();
        assert_eq!(
            Action::from(cli.command),
            Action::Add(vec!["a.c".to_string(), "b.c".to_string()])
        );
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["git-si", "push"]).is_err());
    }
}
