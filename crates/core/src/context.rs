//! Execution context shared by every action.
//!
//! [`SyncContext`] owns the configuration and the two external
//! collaborators (process runner and user interface), and tracks the
//! directory commands run in. On top of that it provides the scoped
//! primitives the actions are built from:
//!
//! - [`SyncContext::in_svn_root`] runs a closure with the working copy root
//!   as the command directory and restores the previous directory afterwards.
//! - [`SyncContext::on_local_branch`] is the outermost scope of an action.
//! - [`SyncContext::on_mirror_branch`] checks out the mirror branch for the
//!   duration of a closure and always checks the original branch back out,
//!   whether the closure returns `Ok`, returns `Err`, or panics.
//!
//! Failures propagate as [`CoreError`]; callers use `?`, so no step after a
//! failed one runs.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::SiConfig;
use crate::errors::{CoreError, GitError, Result, ShellError, SvnError, VersionError};
use crate::git::{self, GitCommands};
use crate::revision::{Revision, RevisionCheck};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec, RunOptions};
use crate::svn::{self, SvnCommands};
use crate::ui::Ui;

/// Number of paths passed to a single `git add`.
pub const GIT_ADD_BATCH_SIZE: usize = 10;

/// Configuration, collaborators, and the current command directory.
pub struct SyncContext<'a> {
    config: SiConfig,
    runner: &'a dyn CommandRunner,
    ui: &'a dyn Ui,
    workdir: RefCell<PathBuf>,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        config: SiConfig,
        runner: &'a dyn CommandRunner,
        ui: &'a dyn Ui,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            runner,
            ui,
            workdir: RefCell::new(workdir.into()),
        }
    }

    pub fn config(&self) -> &SiConfig {
        &self.config
    }

    pub fn ui(&self) -> &dyn Ui {
        self.ui
    }

    pub fn svn(&self) -> SvnCommands<'_> {
        SvnCommands::new(&self.config.svn_binary)
    }

    pub fn git(&self) -> GitCommands<'_> {
        GitCommands::new(&self.config.git_binary)
    }

    pub fn mirror_branch(&self) -> &str {
        &self.config.mirror_branch
    }

    /// Directory commands currently run in.
    pub fn workdir(&self) -> PathBuf {
        self.workdir.borrow().clone()
    }

    // -----------------------------------------------------------------------
    // Running commands
    // -----------------------------------------------------------------------

    /// Run `spec`, failing with [`ShellError::CommandFailed`] on a non-zero
    /// exit unless `options.allow_errors` is set.
    pub fn run_command(&self, spec: &CommandSpec, options: RunOptions) -> Result<CommandOutput> {
        let workdir = self.workdir();
        debug!(cmd = %spec, ?options, "run_command");
        let output = self.runner.run(spec, &workdir, options.capture)?;
        if !output.success && !options.allow_errors {
            return Err(ShellError::CommandFailed {
                command: spec.to_string(),
                exit_code: output.exit_code,
            }
            .into());
        }
        Ok(output)
    }

    /// Run with output passed through to the terminal.
    pub fn run(&self, spec: &CommandSpec) -> Result<()> {
        self.run_command(spec, RunOptions::default()).map(drop)
    }

    /// Run and return captured stdout.
    pub fn output(&self, spec: &CommandSpec) -> Result<String> {
        Ok(self.run_command(spec, RunOptions::captured())?.stdout)
    }

    /// Run without treating failure as an error.
    pub fn probe(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.run_command(spec, RunOptions::probe())
    }

    pub fn notice(&self, message: &str) {
        self.ui.notice(message);
    }

    pub fn success(&self, message: &str) {
        self.ui.success(message);
    }

    pub fn confirm(&self, prompt: &str, default_yes: bool) -> Result<bool> {
        self.ui
            .confirm(prompt, default_yes)
            .map_err(CoreError::Prompt)
    }

    // -----------------------------------------------------------------------
    // Facts
    // -----------------------------------------------------------------------

    /// Revision of the SVN working copy.
    pub fn svn_revision(&self) -> Result<Option<Revision>> {
        let info = self.output(&self.svn().info())?;
        Ok(svn::parse_last_revision(&info))
    }

    /// Most recent revision recorded in the current branch history. A
    /// repository without commits has none.
    pub fn recorded_revision(&self) -> Result<Option<Revision>> {
        let log = self.probe(&self.git().log_messages())?;
        if !log.success {
            return Ok(None);
        }
        Ok(git::parse_last_recorded_revision(&log.stdout))
    }

    /// Root of the SVN working copy.
    pub fn svn_root(&self) -> Result<PathBuf> {
        let info = self.probe(&self.svn().info())?;
        svn::parse_root_path(&info.stdout)
            .map(PathBuf::from)
            .ok_or_else(|| SvnError::RootNotFound.into())
    }

    /// Name of the checked-out git branch.
    pub fn local_branch(&self) -> Result<String> {
        let branches = self.output(&self.git().list_branches())?;
        git::parse_current_branch(&branches).ok_or_else(|| GitError::BranchUnknown.into())
    }

    pub fn has_git_changes(&self) -> Result<bool> {
        let status = self.output(&self.git().status())?;
        Ok(git::has_pending_changes(&status))
    }

    pub fn is_file_in_git(&self, file: &str) -> Result<bool> {
        let listed = self.output(&self.git().ls_files(file))?;
        Ok(!listed.trim().is_empty())
    }

    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.probe(&self.git().show_branch(name))?.success)
    }

    /// Compare the working copy revision with the one recorded on the
    /// current branch. Returns whether the caller should go on.
    pub fn verify_revisions(&self) -> Result<bool> {
        let svn = self.svn_revision()?;
        let branch = self.recorded_revision()?;
        debug!(?svn, ?branch, "comparing svn revision with branch revision");

        match RevisionCheck::compare(svn, branch) {
            RevisionCheck::Unknown => {
                self.notice(
                    "Could not determine last git-si version information. \
                     This may be fine if you haven't used git-si before.",
                );
                Ok(true)
            }
            RevisionCheck::InSync => Ok(true),
            RevisionCheck::Behind { branch, svn } => Err(VersionError::OutOfDate {
                branch_revision: branch.number(),
                svn_revision: svn.number(),
            }
            .into()),
            RevisionCheck::Ahead { branch, svn } => self.confirm(
                &format!(
                    "This branch is newer (svn revision {branch}) than svn (rev {svn}). \
                     That can happen when svn changes have been made directly and may be fine. \
                     Do you want to continue?"
                ),
                false,
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Scopes
    // -----------------------------------------------------------------------

    /// Run `action` with the SVN working copy root as command directory.
    pub fn in_svn_root<T>(&self, action: impl FnOnce() -> Result<T>) -> Result<T> {
        let root = self.svn_root()?;
        self.notice(&format!("Changing directory to svn root: {}", root.display()));
        let _guard = WorkdirGuard::enter(self, root);
        action()
    }

    /// Outermost scope of an action run from the user's branch.
    pub fn on_local_branch<T>(&self, action: impl FnOnce() -> Result<T>) -> Result<T> {
        self.in_svn_root(action).inspect_err(|err| {
            debug!(%err, "action aborted");
        })
    }

    /// Run `action` with the mirror branch checked out, then return to the
    /// branch that was checked out before.
    pub fn on_mirror_branch<T>(&self, action: impl FnOnce() -> Result<T>) -> Result<T> {
        self.in_svn_root(|| {
            let original = self.local_branch()?;
            let mirror = self.config.mirror_branch.clone();
            info!(from = %original, to = %mirror, "switching to mirror branch");
            self.run(&self.git().checkout(&mirror))?;

            let guard = BranchGuard::new(self, original);
            let result = action();
            match (result, guard.restore()) {
                (Ok(value), Ok(())) => Ok(value),
                (Ok(_), Err(restore_err)) => Err(restore_err),
                (Err(err), Ok(())) => Err(err),
                (Err(err), Err(restore_err)) => {
                    error!(%restore_err, "could not return to the original branch");
                    Err(err)
                }
            }
        })
    }

    // -----------------------------------------------------------------------
    // Change preservation
    // -----------------------------------------------------------------------

    /// Stash uncommitted changes. Returns whether anything was stashed.
    pub fn stash_local_changes(&self) -> Result<bool> {
        if !self.has_git_changes()? {
            return Ok(false);
        }
        debug!("stashing local changes");
        self.run(&self.git().stash())?;
        Ok(true)
    }

    /// Restore changes stashed by [`Self::stash_local_changes`].
    pub fn unstash_local_changes(&self, stashed: bool) -> Result<()> {
        if !stashed {
            return Ok(());
        }
        debug!("restoring stashed changes");
        let output = self.run_command(
            &self.git().unstash(),
            RunOptions {
                capture: false,
                allow_errors: true,
            },
        )?;
        if !output.success {
            return Err(GitError::UnstashFailed.into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Batch file mutation
    // -----------------------------------------------------------------------

    /// `git add` `files` in groups of [`GIT_ADD_BATCH_SIZE`]. A group that
    /// fails is retried one file at a time.
    pub fn batch_add_files_to_git(&self, files: &[String]) -> Result<()> {
        for batch in files.chunks(GIT_ADD_BATCH_SIZE) {
            let cmd = self.git().add(batch)?;
            if let Err(err) = self.run_command(&cmd, RunOptions::captured()) {
                debug!(%err, size = batch.len(), "batch add failed, adding files individually");
                self.add_files_to_git(batch);
            }
        }
        Ok(())
    }

    /// `git add` each file on its own. Failures are logged and skipped.
    pub fn add_files_to_git(&self, files: &[String]) {
        for file in files {
            let result = self
                .git()
                .add(std::slice::from_ref(file))
                .and_then(|cmd| self.run_command(&cmd, RunOptions::captured()));
            if let Err(err) = result {
                warn!(file = %file, %err, "could not add file to git, skipping");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Restores the previous command directory when dropped.
struct WorkdirGuard<'c, 'a> {
    ctx: &'c SyncContext<'a>,
    previous: PathBuf,
}

impl<'c, 'a> WorkdirGuard<'c, 'a> {
    fn enter(ctx: &'c SyncContext<'a>, dir: impl AsRef<Path>) -> Self {
        let previous = ctx.workdir.replace(dir.as_ref().to_path_buf());
        Self { ctx, previous }
    }
}

impl Drop for WorkdirGuard<'_, '_> {
    fn drop(&mut self) {
        *self.ctx.workdir.borrow_mut() = std::mem::take(&mut self.previous);
    }
}

/// Checks `branch` back out when restored or dropped.
struct BranchGuard<'c, 'a> {
    ctx: &'c SyncContext<'a>,
    branch: String,
    restored: bool,
}

impl<'c, 'a> BranchGuard<'c, 'a> {
    fn new(ctx: &'c SyncContext<'a>, branch: String) -> Self {
        Self {
            ctx,
            branch,
            restored: false,
        }
    }

    fn checkout(&self) -> Result<()> {
        info!(branch = %self.branch, "returning to branch");
        self.ctx.run(&self.ctx.git().checkout(&self.branch))
    }

    fn restore(mut self) -> Result<()> {
        self.restored = true;
        self.checkout()
    }
}

impl Drop for BranchGuard<'_, '_> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = self.checkout() {
            error!(branch = %self.branch, %err, "could not return to the original branch");
        }
    }
}
