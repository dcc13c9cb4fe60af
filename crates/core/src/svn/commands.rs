//! Builders for the `svn` commands the engine issues.

use crate::errors::{CoreError, Result};
use crate::runner::CommandSpec;

/// Builds `svn` invocations for a configured binary.
#[derive(Debug, Clone, Copy)]
pub struct SvnCommands<'a> {
    binary: &'a str,
}

impl<'a> SvnCommands<'a> {
    pub fn new(binary: &'a str) -> Self {
        Self { binary }
    }

    fn base(&self) -> CommandSpec {
        CommandSpec::new(self.binary)
    }

    pub fn status<S: AsRef<str>>(&self, args: &[S]) -> CommandSpec {
        self.base()
            .args(["status", "--ignore-externals"])
            .args(args.iter().map(AsRef::as_ref))
    }

    pub fn info(&self) -> CommandSpec {
        self.base().arg("info")
    }

    pub fn diff<S: AsRef<str>>(&self, args: &[S]) -> CommandSpec {
        self.base().arg("diff").args(args.iter().map(AsRef::as_ref))
    }

    pub fn add<S: AsRef<str>>(&self, files: &[S]) -> Result<CommandSpec> {
        if files.is_empty() {
            return Err(CoreError::MissingArgument("svn add"));
        }
        Ok(self.base().arg("add").args(files.iter().map(AsRef::as_ref)))
    }

    /// Update to HEAD, taking the repository version of any conflict.
    pub fn update(&self) -> CommandSpec {
        self.base()
            .args(["up", "--accept", "theirs-full", "--ignore-externals"])
    }

    /// Revert `files` recursively, or the whole working copy when empty.
    pub fn revert<S: AsRef<str>>(&self, files: &[S]) -> CommandSpec {
        let cmd = self.base().args(["revert", "-R"]);
        if files.is_empty() {
            cmd.arg(".")
        } else {
            cmd.args(files.iter().map(AsRef::as_ref))
        }
    }

    pub fn commit<S: AsRef<str>>(&self, files: &[S]) -> CommandSpec {
        self.base().arg("commit").args(files.iter().map(AsRef::as_ref))
    }

    pub fn list_files(&self) -> CommandSpec {
        self.base().args(["list", "-R"])
    }
}
