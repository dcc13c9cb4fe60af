//! Builders for the `git` commands the engine issues.

use crate::errors::{CoreError, Result};
use crate::revision::Revision;
use crate::runner::CommandSpec;

/// Commit message recorded on the mirror branch for `revision`.
///
/// Contains the `svn update to version <N>` marker read back by
/// [`super::parser::parse_last_recorded_revision`].
pub fn revision_commit_message(revision: Revision) -> String {
    format!(
        "git-si {} svn update to version {}",
        env!("CARGO_PKG_VERSION"),
        revision
    )
}

/// Builds `git` invocations for a configured binary.
#[derive(Debug, Clone, Copy)]
pub struct GitCommands<'a> {
    binary: &'a str,
}

impl<'a> GitCommands<'a> {
    pub fn new(binary: &'a str) -> Self {
        Self { binary }
    }

    fn base(&self) -> CommandSpec {
        CommandSpec::new(self.binary)
    }

    pub fn status(&self) -> CommandSpec {
        self.base().args(["status", "--porcelain"])
    }

    /// Full commit messages of the current branch, newest first.
    pub fn log_messages(&self) -> CommandSpec {
        self.base().args(["log", "--pretty=%B"])
    }

    pub fn add<S: AsRef<str>>(&self, files: &[S]) -> Result<CommandSpec> {
        if files.is_empty() {
            return Err(CoreError::MissingArgument("git add"));
        }
        Ok(self.base().arg("add").args(files.iter().map(AsRef::as_ref)))
    }

    pub fn remove(&self, path: &str) -> CommandSpec {
        self.base()
            .args(["rm", "-r", "--quiet", "--ignore-unmatch", "--"])
            .arg(path)
    }

    pub fn commit_revision(&self, revision: Revision) -> CommandSpec {
        self.base()
            .args(["commit", "--allow-empty", "-am"])
            .arg(revision_commit_message(revision))
    }

    pub fn stash(&self) -> CommandSpec {
        self.base().arg("stash")
    }

    pub fn unstash(&self) -> CommandSpec {
        self.base().args(["stash", "pop"])
    }

    pub fn rebase(&self, branch: &str) -> Result<CommandSpec> {
        if branch.is_empty() {
            return Err(CoreError::MissingArgument("git rebase"));
        }
        Ok(self.base().arg("rebase").arg(branch))
    }

    pub fn list_branches(&self) -> CommandSpec {
        self.base().arg("branch")
    }

    pub fn create_branch(&self, name: &str) -> CommandSpec {
        self.base().arg("branch").arg(name)
    }

    pub fn delete_branch(&self, name: &str) -> CommandSpec {
        self.base().args(["branch", "-D"]).arg(name)
    }

    pub fn show_branch(&self, name: &str) -> CommandSpec {
        self.base().arg("show-branch").arg(name)
    }

    pub fn checkout(&self, name: &str) -> CommandSpec {
        self.base().arg("checkout").arg(name)
    }

    pub fn init(&self) -> CommandSpec {
        self.base().arg("init")
    }

    pub fn ls_files(&self, file: &str) -> CommandSpec {
        self.base().args(["ls-files", "--"]).arg(file)
    }

    pub fn hard_reset(&self) -> CommandSpec {
        self.base().args(["reset", "--hard", "HEAD"])
    }
}
