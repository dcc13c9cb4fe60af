//! The git-si synchronization actions.
//!
//! [`SyncEngine`] implements the transitions between the states of a
//! git-si working copy. The state itself is implicit: which branch is
//! checked out, whether the git tree is clean, and which SVN revision the
//! mirror branch last recorded.
//!
//! - `fetch` brings the mirror branch up to date with the SVN repository.
//! - `rebase` replays the local branch on top of the mirror branch.
//! - `commit` sends the local branch to SVN and folds the new revision back
//!   into the mirror branch.
//! - `init` prepares an SVN working copy for use with git-si.
//!
//! Every action runs inside [`SyncContext::on_local_branch`]; the first
//! failing step aborts the action and the error is returned to the caller.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::config::SiConfig;
use crate::context::SyncContext;
use crate::errors::{GitError, Result, SvnError};
use crate::gitignore::{self, IgnorePatternSet, GITIGNORE_FILE};
use crate::runner::{CommandRunner, RunOptions};
use crate::svn;
use crate::ui::Ui;

const NO_ARGS: &[&str] = &[];

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A user-invocable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Status(Vec<String>),
    Diff(Vec<String>),
    Add(Vec<String>),
    Fetch,
    Rebase,
    Pull,
    Readd,
    Commit,
    Init,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(_) => write!(f, "status"),
            Self::Diff(_) => write!(f, "diff"),
            Self::Add(_) => write!(f, "add"),
            Self::Fetch => write!(f, "fetch"),
            Self::Rebase => write!(f, "rebase"),
            Self::Pull => write!(f, "pull"),
            Self::Readd => write!(f, "readd"),
            Self::Commit => write!(f, "commit"),
            Self::Init => write!(f, "init"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs git-si actions against one working copy.
pub struct SyncEngine<'a> {
    ctx: SyncContext<'a>,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine whose commands start in `workdir`.
    pub fn new(
        config: SiConfig,
        runner: &'a dyn CommandRunner,
        ui: &'a dyn Ui,
        workdir: impl AsRef<Path>,
    ) -> Self {
        Self {
            ctx: SyncContext::new(config, runner, ui, workdir.as_ref()),
        }
    }

    pub fn context(&self) -> &SyncContext<'a> {
        &self.ctx
    }

    /// Run one action to completion.
    pub fn execute(&self, action: &Action) -> Result<()> {
        info!(%action, "running action");
        match action {
            Action::Status(files) => self.status(files),
            Action::Diff(files) => self.diff(files),
            Action::Add(files) => self.add(files),
            Action::Fetch => self.fetch(),
            Action::Rebase => self.rebase(),
            Action::Pull => self.pull(),
            Action::Readd => self.readd(),
            Action::Commit => self.commit(),
            Action::Init => self.init(),
        }
    }

    /// Make path arguments absolute so they survive the move to the working
    /// copy root. Options are passed through.
    fn resolve_paths(&self, args: &[String]) -> Vec<String> {
        let launch_dir = self.ctx.workdir();
        args.iter()
            .map(|arg| {
                if arg.starts_with('-') || Path::new(arg).is_absolute() {
                    arg.clone()
                } else {
                    launch_dir.join(arg).display().to_string()
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Show `svn status` without externals, `.git` entries, and swap files.
    pub fn status(&self, files: &[String]) -> Result<()> {
        let files = self.resolve_paths(files);
        self.ctx.on_local_branch(|| {
            if !self.ctx.verify_revisions()? {
                return Ok(());
            }
            let status = self.ctx.output(&self.ctx.svn().status(&files))?;
            let filtered = svn::filter_noise(&status);
            if !filtered.is_empty() {
                self.ctx.ui().show_diff(&filtered);
            }
            Ok(())
        })
    }

    /// Show `svn diff`, after registering git-tracked files with SVN so
    /// they appear in it.
    pub fn diff(&self, files: &[String]) -> Result<()> {
        let files = self.resolve_paths(files);
        self.ctx.on_local_branch(|| {
            if !self.ctx.verify_revisions()? {
                return Ok(());
            }
            self.ctx.notice(
                "Adding any files that are not already in svn to ensure an accurate diff.",
            );
            self.readd_unknown_files()?;
            let diff = self.ctx.output(&self.ctx.svn().diff(&files))?;
            self.ctx.ui().show_diff(&diff);
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Adding files
    // -----------------------------------------------------------------------

    /// `svn add` then `git add` the given files.
    pub fn add(&self, files: &[String]) -> Result<()> {
        let files = self.resolve_paths(files);
        self.ctx.on_local_branch(|| {
            self.ctx.run(&self.ctx.svn().add(&files)?)?;
            self.ctx.run(&self.ctx.git().add(&files)?)?;
            self.ctx.success("add complete!");
            Ok(())
        })
    }

    /// Register with SVN the files git tracks but SVN does not know about.
    pub fn readd(&self) -> Result<()> {
        self.ctx.on_local_branch(|| self.readd_unknown_files())
    }

    fn readd_unknown_files(&self) -> Result<()> {
        let status = self.ctx.output(&self.ctx.svn().status(NO_ARGS))?;

        let mut files = Vec::new();
        for path in svn::parse_unknown_files(&status) {
            if path == GITIGNORE_FILE {
                continue;
            }
            if self.ctx.is_file_in_git(&path)? {
                files.push(path);
            }
        }
        debug!(count = files.len(), "files tracked by git but unknown to svn");

        if files.is_empty() {
            self.ctx.notice("There are no files to add.");
            return Ok(());
        }

        for file in &files {
            self.ctx.ui().say(file);
        }
        if self
            .ctx
            .confirm("Do you want to add the above files to svn?", false)?
        {
            self.ctx.run(&self.ctx.svn().add(&files)?)?;
            self.ctx
                .success("Added files to svn that had been added to git.");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Fetch / rebase / pull
    // -----------------------------------------------------------------------

    /// Update the mirror branch to the latest SVN revision.
    pub fn fetch(&self) -> Result<()> {
        self.ctx.on_local_branch(|| self.fetch_into_mirror())
    }

    fn fetch_into_mirror(&self) -> Result<()> {
        let stashed = self.ctx.stash_local_changes()?;
        self.ctx.on_mirror_branch(|| self.update_mirror())?;
        self.ctx.unstash_local_changes(stashed)?;
        self.ctx.success("fetch complete!");
        Ok(())
    }

    /// Run with the mirror branch checked out.
    fn update_mirror(&self) -> Result<()> {
        let svn = self.ctx.svn();
        let git = self.ctx.git();

        self.ctx.notice("Fetching remote data from svn");
        let output = self.ctx.output(&svn.update())?;

        // The checkout restored the mirror's files; put back what svn has.
        self.ctx.output(&svn.revert(NO_ARGS))?;

        let conflicted = svn::parse_conflicted_files(&output);
        if !conflicted.is_empty() {
            debug!(count = conflicted.len(), "reverting conflicted files");
            self.ctx.output(&svn.revert(&conflicted))?;
        }

        let deleted = svn::parse_deleted_files(&output);
        for path in &deleted {
            self.ctx.output(&git.remove(path))?;
        }

        let updated = svn::parse_updated_files(&output);
        self.ctx.batch_add_files_to_git(&updated)?;

        let revision = self
            .ctx
            .svn_revision()?
            .ok_or(SvnError::RevisionUnknown)?;
        self.ctx.output(&git.commit_revision(revision))?;

        info!(
            %revision,
            updated = updated.len(),
            deleted = deleted.len(),
            conflicted = conflicted.len(),
            "mirror branch updated"
        );
        Ok(())
    }

    /// Rebase the local branch onto the mirror branch.
    pub fn rebase(&self) -> Result<()> {
        self.ctx.on_local_branch(|| self.rebase_onto_mirror())
    }

    fn rebase_onto_mirror(&self) -> Result<()> {
        let stashed = self.ctx.stash_local_changes()?;
        let mirror = self.ctx.mirror_branch().to_string();
        let output = self.ctx.run_command(
            &self.ctx.git().rebase(&mirror)?,
            RunOptions {
                capture: false,
                allow_errors: true,
            },
        )?;
        if !output.success {
            return Err(GitError::RebaseFailed { onto: mirror }.into());
        }
        self.ctx.unstash_local_changes(stashed)?;
        self.ctx.success("rebase complete!");
        Ok(())
    }

    /// `fetch`, then `rebase`.
    pub fn pull(&self) -> Result<()> {
        self.fetch()?;
        self.rebase()
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Commit the local branch to SVN and record the new revision on the
    /// mirror branch.
    pub fn commit(&self) -> Result<()> {
        self.ctx.on_local_branch(|| {
            let local = self.ctx.local_branch()?;
            let mainline = self.ctx.config().mainline_branch.clone();
            if local == mainline {
                return Err(GitError::CommitOnMainline(local).into());
            }
            if self.ctx.has_git_changes()? {
                return Err(GitError::UncommittedChanges.into());
            }

            self.readd_unknown_files()?;
            let diff = self.ctx.output(&self.ctx.svn().diff(NO_ARGS))?;
            if diff.trim().is_empty() {
                return Err(SvnError::NothingToCommit.into());
            }

            self.ctx.run(&self.ctx.svn().commit(NO_ARGS))?;
            self.ctx.success("commit complete!");

            if self.ctx.has_git_changes()?
                && self.ctx.confirm(
                    "Some files were added or modified during the commit; should I revert them?",
                    false,
                )?
            {
                self.ctx.run(&self.ctx.git().hard_reset())?;
            }

            self.ctx.notice("Updating mirror branch to latest commit");
            self.fetch_into_mirror()?;

            let prompt = format!(
                "Do you want to switch to the {mainline} branch and delete the committed branch '{local}'?"
            );
            if self.ctx.confirm(&prompt, false)? {
                self.delete_committed_branch(&local, &mainline)?;
            }
            Ok(())
        })
    }

    fn delete_committed_branch(&self, branch: &str, mainline: &str) -> Result<()> {
        self.ctx.run(&self.ctx.git().checkout(mainline))?;
        self.rebase_onto_mirror()?;
        self.ctx.run(&self.ctx.git().delete_branch(branch))?;
        self.ctx.success(&format!("Deleted branch {branch}"));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Init
    // -----------------------------------------------------------------------

    /// Prepare the SVN working copy the tool was started in.
    pub fn init(&self) -> Result<()> {
        if !self.ctx.probe(&self.ctx.svn().info())?.success {
            return Err(SvnError::NoWorkingCopy.into());
        }

        self.ctx.in_svn_root(|| {
            self.ctx.notice("Updating svn working copy");
            self.ctx.run(&self.ctx.svn().update())?;

            let created_repo = self.create_git_repository()?;
            let changed_ignore = self.create_gitignore()?;
            if created_repo || changed_ignore {
                self.ctx.notice("Making initial commit.");
                let revision = self
                    .ctx
                    .svn_revision()?
                    .ok_or(SvnError::RevisionUnknown)?;
                self.ctx
                    .output(&self.ctx.git().commit_revision(revision))?;
            }

            self.create_mirror_branch()?;
            self.ctx.success("init complete!");
            Ok(())
        })
    }

    /// Returns whether a repository was created.
    fn create_git_repository(&self) -> Result<bool> {
        if self.ctx.workdir().join(".git").exists() {
            self.ctx.notice("A git repository already exists.");
            return Ok(false);
        }

        self.ctx.notice("Creating git repository.");
        if !self.ctx.probe(&self.ctx.git().init())?.success {
            return Err(GitError::InitFailed.into());
        }
        self.add_all_svn_files()?;
        Ok(true)
    }

    fn add_all_svn_files(&self) -> Result<()> {
        self.ctx.notice("Adding all files present in the svn repository.");
        let listing = self.ctx.output(&self.ctx.svn().list_files())?;
        let files = svn::parse_file_list(&listing);
        if files.is_empty() {
            return Err(SvnError::NoFilesListed.into());
        }
        self.ctx.batch_add_files_to_git(&files)
    }

    /// Create `.gitignore`, or offer to append the patterns it lacks.
    /// Returns whether the file changed.
    fn create_gitignore(&self) -> Result<bool> {
        let mut patterns = IgnorePatternSet::default();
        patterns.extend(&self.ctx.config().extra_ignore_patterns);
        let status = self.ctx.output(&self.ctx.svn().status(NO_ARGS))?;
        patterns.extend(svn::parse_external_paths(&status));

        let path = self.ctx.workdir().join(GITIGNORE_FILE);
        if !path.exists() {
            self.ctx.notice("Creating gitignore file.");
            gitignore::write_new(&path, &patterns)?;
            self.ctx.run(&self.ctx.git().add(&[GITIGNORE_FILE])?)?;
            return Ok(true);
        }

        let missing = patterns.missing_from(&gitignore::read_lines(&path)?);
        if missing.is_empty() {
            return Ok(false);
        }

        self.ctx
            .ui()
            .say("These lines need to be added to the gitignore file:");
        for line in &missing {
            self.ctx.ui().say(line);
        }
        if !self.ctx.confirm("Do you want to add them?", true)? {
            return Ok(false);
        }
        gitignore::append(&path, &missing)?;
        self.ctx.run(&self.ctx.git().add(&[GITIGNORE_FILE])?)?;
        Ok(true)
    }

    fn create_mirror_branch(&self) -> Result<()> {
        let mirror = self.ctx.mirror_branch().to_string();
        if self.ctx.branch_exists(&mirror)? {
            self.ctx
                .notice(&format!("The {mirror} branch already exists."));
            return Ok(());
        }
        self.ctx.notice(&format!("Creating {mirror} branch."));
        self.ctx.run(&self.ctx.git().create_branch(&mirror))
    }
}
