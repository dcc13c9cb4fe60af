//! Scripted collaborators for unit-testing scopes and actions without real
//! `svn` or `git` binaries.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::errors::ShellError;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::ui::Ui;

pub const ROOT: &str = "/work/project";

pub fn svn_info(revision: u64) -> String {
    format!(
        "Path: .\nWorking Copy Root Path: {ROOT}\nURL: file:///repo/trunk\nRevision: {revision}\nNode Kind: directory\n"
    )
}

/// Mock `CommandRunner` that records every call, answers from a table of
/// substring matches, and tracks the checked-out branch.
pub struct ScriptedRunner {
    pub calls: RefCell<Vec<(String, PathBuf)>>,
    responses: RefCell<Vec<(String, String)>>,
    failures: RefCell<Vec<String>>,
    failure_code: RefCell<i32>,
    pub current_branch: RefCell<String>,
    pub branches: RefCell<Vec<String>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        let runner = Self {
            calls: RefCell::new(Vec::new()),
            responses: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            failure_code: RefCell::new(1),
            current_branch: RefCell::new("feature".to_string()),
            branches: RefCell::new(vec![
                "feature".to_string(),
                "master".to_string(),
                "MIRRORBRANCH".to_string(),
            ]),
        };
        runner.respond("svn info", &svn_info(12));
        runner
    }

    /// Answer commands containing `pattern` with `stdout`. Later
    /// registrations take precedence.
    pub fn respond(&self, pattern: &str, stdout: &str) -> &Self {
        self.responses
            .borrow_mut()
            .insert(0, (pattern.to_string(), stdout.to_string()));
        self
    }

    /// Make commands containing `pattern` exit with failure.
    pub fn fail(&self, pattern: &str) -> &Self {
        self.failures.borrow_mut().push(pattern.to_string());
        self
    }

    pub fn with_current_branch(self, name: &str) -> Self {
        *self.current_branch.borrow_mut() = name.to_string();
        if !self.branches.borrow().iter().any(|b| b == name) {
            self.branches.borrow_mut().push(name.to_string());
        }
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }

    pub fn ran(&self, pattern: &str) -> bool {
        self.count(pattern) > 0
    }

    /// Position of the first command containing `pattern`.
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.commands().iter().position(|c| c.contains(pattern))
    }

    /// Make failing commands exit with `code` instead of 1.
    pub fn fail_with(&self, pattern: &str, code: i32) -> &Self {
        self.fail(pattern);
        *self.failure_code.borrow_mut() = code;
        self
    }

    fn exit_code(&self, success: bool) -> i32 {
        if success {
            0
        } else {
            *self.failure_code.borrow()
        }
    }

    fn branch_listing(&self) -> String {
        let current = self.current_branch.borrow();
        self.branches
            .borrow()
            .iter()
            .map(|b| {
                if *b == *current {
                    format!("* {b}\n")
                } else {
                    format!("  {b}\n")
                }
            })
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        spec: &CommandSpec,
        workdir: &Path,
        _capture: bool,
    ) -> Result<CommandOutput, ShellError> {
        let command = spec.to_string();
        self.calls
            .borrow_mut()
            .push((command.clone(), workdir.to_path_buf()));

        let success = !self
            .failures
            .borrow()
            .iter()
            .any(|pattern| command.contains(pattern.as_str()));

        let args = spec.arguments();
        if spec.program() == "git" && args.len() == 1 && args[0] == "branch" {
            return Ok(CommandOutput {
                stdout: self.branch_listing(),
                success,
                exit_code: Some(self.exit_code(success)),
            });
        }
        if spec.program() == "git" && args.len() == 2 && args[0] == "checkout" && success {
            *self.current_branch.borrow_mut() = args[1].clone();
        }

        let stdout = self
            .responses
            .borrow()
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            stdout,
            success,
            exit_code: Some(self.exit_code(success)),
        })
    }
}

/// Mock `Ui` that records messages and replays scripted answers.
#[derive(Default)]
pub struct ScriptedUi {
    pub notices: RefCell<Vec<String>>,
    pub successes: RefCell<Vec<String>>,
    pub said: RefCell<Vec<String>>,
    pub diffs: RefCell<Vec<String>>,
    pub prompts: RefCell<Vec<String>>,
    answers: RefCell<VecDeque<bool>>,
}

impl ScriptedUi {
    /// Answer every prompt with `answer`.
    pub fn answering(answer: bool) -> Self {
        let ui = Self::default();
        ui.answers.borrow_mut().extend(std::iter::repeat(answer).take(16));
        ui
    }

    /// Answer prompts in order; unanswered prompts take their default.
    pub fn answers(answers: &[bool]) -> Self {
        let ui = Self::default();
        ui.answers.borrow_mut().extend(answers.iter().copied());
        ui
    }
}

impl Ui for ScriptedUi {
    fn notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }

    fn say(&self, message: &str) {
        self.said.borrow_mut().push(message.to_string());
    }

    fn show_diff(&self, diff: &str) {
        self.diffs.borrow_mut().push(diff.to_string());
    }

    fn confirm(&self, prompt: &str, default_yes: bool) -> std::io::Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(default_yes))
    }
}
