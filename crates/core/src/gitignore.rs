//! The `.gitignore` patterns git-si maintains in the working copy.
//!
//! The set starts from [`DEFAULT_PATTERNS`], then takes configured extras
//! and the SVN externals found at `init` time. Order is preserved and
//! duplicates are dropped.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::errors::{CoreError, Result};

/// File name, relative to the working copy root.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Patterns every git-si working copy should ignore.
pub const DEFAULT_PATTERNS: &[&str] = &[
    ".*",
    "!.gitignore",
    ".svn",
    "*.sw?",
    ".config",
    "*.err",
    "*.pid",
    "*.log",
    "svn-commit.*",
    "*.orig",
    "node_modules",
];

/// Ordered, duplicate-free set of ignore patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePatternSet {
    patterns: Vec<String>,
}

impl Default for IgnorePatternSet {
    fn default() -> Self {
        let mut set = Self {
            patterns: Vec::new(),
        };
        set.extend(DEFAULT_PATTERNS.iter().copied());
        set
    }
}

impl IgnorePatternSet {
    /// Add patterns not already present, keeping the existing order.
    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if !pattern.is_empty() && !self.contains(pattern) {
                self.patterns.push(pattern.to_string());
            }
        }
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.iter().any(|p| p == pattern.trim())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Patterns that do not appear (ignoring surrounding whitespace) among
    /// `lines`.
    pub fn missing_from<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|pattern| !lines.iter().any(|line| line.as_ref().trim() == pattern.as_str()))
            .cloned()
            .collect()
    }

    /// File content, one pattern per line.
    pub fn render(&self) -> String {
        let mut content = self.patterns.join("\n");
        content.push('\n');
        content
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Lines of an existing ignore file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(content.lines().map(String::from).collect())
}

/// Create (or overwrite) the ignore file with `set`.
pub fn write_new(path: &Path, set: &IgnorePatternSet) -> Result<()> {
    debug!(path = %path.display(), "creating ignore file");
    fs::write(path, set.render()).map_err(|e| io_error(path, e))
}

/// Append `patterns` to an existing ignore file, starting on a fresh line.
pub fn append(path: &Path, patterns: &[String]) -> Result<()> {
    debug!(path = %path.display(), count = patterns.len(), "appending to ignore file");
    let existing = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    let mut text = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&patterns.join("\n"));
    text.push('\n');
    file.write_all(text.as_bytes())
        .map_err(|e| io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_gitignore() {
        assert!(IgnorePatternSet::default().contains("!.gitignore"));
    }

    #[test]
    fn test_extend_skips_duplicates() {
        let mut set = IgnorePatternSet::default();
        let before = set.patterns().len();
        set.extend(["*.log", "vendor/lib", "vendor/lib", "  "]);
        assert_eq!(set.patterns().len(), before + 1);
        assert_eq!(set.patterns().last().map(String::as_str), Some("vendor/lib"));
    }

    #[test]
    fn test_missing_from() {
        let set = IgnorePatternSet::default();
        let missing = set.missing_from(&["svn-commit.*", "*.orig"]);
        assert!(missing.contains(&"*.log".to_string()));
        assert!(!missing.contains(&"*.orig".to_string()));
    }

    #[test]
    fn test_missing_from_complete_file() {
        let set = IgnorePatternSet::default();
        let lines: Vec<String> = set.patterns().iter().map(|p| format!("{p}  ")).collect();
        assert!(set.missing_from(&lines).is_empty());
    }

    #[test]
    fn test_write_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GITIGNORE_FILE);
        fs::write(&path, "build").unwrap();

        append(&path, &["*.log".to_string(), "tmp".to_string()]).unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["build", "*.log", "tmp"]);

        write_new(&path, &IgnorePatternSet::default()).unwrap();
        let lines = read_lines(&path).unwrap();
        assert_eq!(lines.first().map(String::as_str), Some(".*"));
        assert!(IgnorePatternSet::default().missing_from(&lines).is_empty());
    }
}
