//! Error types for the git-si core library.
//!
//! Each collaborator has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them so the outermost scope can
//! report any failure the same way.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Svn(#[from] SvnError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A command builder was asked to build a command without its required
    /// arguments (e.g. `svn add` with no files).
    #[error("{0} requires at least one argument")]
    MissingArgument(&'static str),

    /// Reading an answer from the user failed.
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),

    /// Reading or writing a file in the working copy failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Shell errors
// ---------------------------------------------------------------------------

/// Errors from running an external process.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The program was not found on `$PATH`.
    #[error("{0} binary not found")]
    BinaryNotFound(String),

    /// A command exited with a non-zero status, or was killed by a signal
    /// (no exit code).
    #[error("there was an error while trying to run the command: {command} ({}). Look above for any errors.", describe_exit(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },

    /// Spawning or waiting on the process failed.
    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit {code}"),
        None => "terminated by signal".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Failed git preconditions.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git branch` did not report a checked-out branch.
    #[error("could not find local branch name")]
    BranchUnknown,

    /// The working tree has uncommitted changes.
    #[error("there are local changes; please commit them before continuing")]
    UncommittedChanges,

    /// Committing from the mainline branch is refused.
    #[error("please do not commit changes on the {0} branch")]
    CommitOnMainline(String),

    /// `git rebase` stopped, usually on a conflict.
    #[error("rebase onto '{onto}' failed; resolve the conflicts and run `git rebase --continue`")]
    RebaseFailed { onto: String },

    /// `git stash pop` failed after the operation completed.
    #[error("could not restore stashed changes; they are still in `git stash list`")]
    UnstashFailed,

    /// `git init` failed.
    #[error("failed to initialize git repository; check for any errors above")]
    InitFailed,
}

// ---------------------------------------------------------------------------
// SVN errors
// ---------------------------------------------------------------------------

/// Failed Subversion preconditions.
#[derive(Debug, Error)]
pub enum SvnError {
    /// `svn info` failed in the current directory.
    #[error("no svn repository was found here. Maybe you're in the wrong directory?")]
    NoWorkingCopy,

    /// `svn info` did not report a working copy root path.
    #[error("could not find the svn root directory")]
    RootNotFound,

    /// `svn info` did not report a revision.
    #[error("could not determine the current svn revision")]
    RevisionUnknown,

    /// `svn diff` is empty.
    #[error("there are no changes to commit")]
    NothingToCommit,

    /// `svn list -R` returned no files.
    #[error("no files could be found in the svn repository")]
    NoFilesListed,
}

// ---------------------------------------------------------------------------
// Version errors
// ---------------------------------------------------------------------------

/// The branch and the SVN working copy disagree about the revision.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The branch was built from an older revision than the working copy.
    #[error("this branch is out-of-date (svn revision {branch_revision}; svn is at {svn_revision}). You should do a git si rebase or git si pull.")]
    OutOfDate {
        branch_revision: u64,
        svn_revision: u64,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
