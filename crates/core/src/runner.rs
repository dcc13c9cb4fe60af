//! Process runner used for every `svn` and `git` invocation.

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::errors::ShellError;

/// A program and its arguments, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a command should be run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Capture stdout instead of passing it through to the terminal.
    pub capture: bool,
    /// Report a non-zero exit through [`CommandOutput::success`] instead of
    /// failing with [`ShellError::CommandFailed`].
    pub allow_errors: bool,
}

impl RunOptions {
    pub fn captured() -> Self {
        Self {
            capture: true,
            allow_errors: false,
        }
    }

    pub fn probe() -> Self {
        Self {
            capture: true,
            allow_errors: true,
        }
    }
}

/// Result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured stdout; empty when the command was not captured.
    pub stdout: String,
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Executes external commands.
///
/// Implementations only report what happened; deciding whether a non-zero
/// exit is fatal is left to the caller.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec, workdir: &Path, capture: bool)
        -> Result<CommandOutput, ShellError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        spec: &CommandSpec,
        workdir: &Path,
        capture: bool,
    ) -> Result<CommandOutput, ShellError> {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.arguments()).current_dir(workdir);

        debug!(cmd = %spec, dir = %workdir.display(), capture, "running command");

        let spawn_error = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ShellError::BinaryNotFound(spec.program().to_string())
            } else {
                ShellError::Io(e)
            }
        };

        if capture {
            let output = cmd
                .stdin(Stdio::inherit())
                .stderr(Stdio::inherit())
                .output()
                .map_err(spawn_error)?;
            if !output.status.success() {
                warn!(cmd = %spec, code = ?output.status.code(), "command exited with failure");
            }
            Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                success: output.status.success(),
                exit_code: output.status.code(),
            })
        } else {
            let status = cmd.status().map_err(spawn_error)?;
            if !status.success() {
                warn!(cmd = %spec, code = ?status.code(), "command exited with failure");
            }
            Ok(CommandOutput {
                stdout: String::new(),
                success: status.success(),
                exit_code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_arguments() {
        let spec = CommandSpec::new("svn")
            .arg("status")
            .args(["--ignore-externals", "foobar"]);
        assert_eq!(spec.to_string(), "svn status --ignore-externals foobar");
        assert_eq!(spec.program(), "svn");
        assert_eq!(spec.arguments().len(), 3);
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let spec = CommandSpec::new("git-si-definitely-not-installed").arg("--version");
        let dir = tempfile::tempdir().unwrap();
        let err = SystemRunner.run(&spec, dir.path(), true).unwrap_err();
        assert!(matches!(err, ShellError::BinaryNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let out = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "echo hello"]), dir.path(), true)
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "hello");

        let out = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]), dir.path(), true)
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
    }
}
