//! Terminal implementation of the core [`Ui`] trait.

use console::Term;
use dialoguer::Confirm;

use gitsi_core::Ui;

use crate::style;

/// Writes messages to the terminal and asks questions with `dialoguer`.
pub struct TerminalUi {
    quiet: bool,
    color_diff: bool,
}

impl TerminalUi {
    /// With `quiet`, notices are not shown.
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            color_diff: Term::stdout().is_term(),
        }
    }
}

impl Ui for TerminalUi {
    fn notice(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", style::notice(message));
        }
    }

    fn success(&self, message: &str) {
        eprintln!("{}", style::success(message));
    }

    fn say(&self, message: &str) {
        println!("{message}");
    }

    fn show_diff(&self, diff: &str) {
        if !self.color_diff {
            print!("{diff}");
            return;
        }
        for line in diff.lines() {
            println!("{}", style::diff_line(line));
        }
    }

    fn confirm(&self, prompt: &str, default_yes: bool) -> std::io::Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default_yes)
            .interact()
            .map_err(std::io::Error::other)
    }
}
