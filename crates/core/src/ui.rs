//! User-facing output and confirmation prompts.

/// Everything the engine shows to, or asks of, the user.
///
/// Diagnostics go through `tracing`; this trait carries only the messages a
/// user is meant to read.
pub trait Ui {
    /// Progress information; may be suppressed by a quiet mode.
    fn notice(&self, message: &str);

    /// Completion of an action.
    fn success(&self, message: &str);

    /// Plain output, such as a list of files or `svn status` text.
    fn say(&self, message: &str);

    /// Output of `svn diff`.
    fn show_diff(&self, diff: &str) {
        self.say(diff);
    }

    /// Ask a yes/no question. Blocks until answered.
    fn confirm(&self, prompt: &str, default_yes: bool) -> std::io::Result<bool>;
}
