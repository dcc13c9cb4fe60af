//! Parsers for `git branch`, `git log` and `git status --porcelain` text.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::revision::Revision;

static CURRENT_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\s+(\S+)").expect("valid branch regex"));

static SYNC_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)svn update to version (\d+)").expect("valid sync marker regex")
});

/// Porcelain status letters that count as uncommitted work.
const DIRTY_CODES: &[char] = &['M', 'A', 'D', 'R', 'C'];

/// The checked-out branch from `git branch` output. A detached HEAD has no
/// branch name.
pub fn parse_current_branch(branches: &str) -> Option<String> {
    CURRENT_BRANCH_RE
        .captures(branches)
        .map(|caps| caps[1].to_string())
        .filter(|name| !name.starts_with('('))
}

/// The most recent revision recorded by a sync marker in `git log` output.
pub fn parse_last_recorded_revision(log: &str) -> Option<Revision> {
    SYNC_MARKER_RE
        .captures(log)
        .and_then(|caps| caps[1].parse().ok())
}

/// Whether `git status --porcelain` output shows uncommitted changes.
/// Untracked (`??`) entries do not count.
pub fn has_pending_changes(porcelain: &str) -> bool {
    porcelain
        .lines()
        .any(|line| line.chars().take(2).any(|c| DIRTY_CODES.contains(&c)))
}
