//! Parsers for `svn info`, `svn status`, `svn update` and `svn list` text.
//!
//! All parsers are lenient: unrecognized lines are skipped, and input with
//! no matches yields an empty result rather than an error.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::revision::Revision;

/// Status of a single path as reported by `svn status` or `svn update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Updated,
    Conflicted,
    Unknown,
    PropertyUpdated,
    Restored,
    ResolvedConflict,
    External,
}

impl FileStatus {
    /// Whether `svn update` left new content for this path that git should
    /// pick up.
    pub fn is_update(self) -> bool {
        matches!(
            self,
            FileStatus::Added
                | FileStatus::Updated
                | FileStatus::PropertyUpdated
                | FileStatus::Restored
                | FileStatus::ResolvedConflict
        )
    }

    /// Whether the path needs to be reverted to the repository version.
    pub fn is_conflict(self) -> bool {
        matches!(self, FileStatus::Conflicted | FileStatus::ResolvedConflict)
    }
}

/// One parsed line of status or update output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatusEntry {
    pub path: String,
    pub status: FileStatus,
}

static REVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Revision:\s+(\d+)").expect("valid revision regex"));

static ROOT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Working Copy Root Path:\s+(\S.*?)\s*$").expect("valid root path regex")
});

static STATUS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^( {0,3})([ACDGMUX?])[ACDGMUX ]*?\s+(\S.*)$").expect("valid status line regex")
});

static RESTORED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Restored '(.+)'").expect("valid restored regex"));

static RESOLVED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Resolved conflicted state of '(.+)'").expect("valid resolved regex")
});

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^X|\.git(/|$)|\.sw[a-p]$)").expect("valid noise regex")
});

/// Extract the revision from `svn info` output.
pub fn parse_last_revision(info: &str) -> Option<Revision> {
    REVISION_RE
        .captures(info)
        .and_then(|caps| caps[1].parse().ok())
}

/// Extract the working copy root from `svn info` output.
pub fn parse_root_path(info: &str) -> Option<String> {
    ROOT_PATH_RE
        .captures(info)
        .map(|caps| caps[1].to_string())
}

/// Parse a single status or update line.
pub fn parse_status_line(line: &str) -> Option<FileStatusEntry> {
    let line = line.trim_end();

    if let Some(caps) = RESTORED_RE.captures(line) {
        return Some(FileStatusEntry {
            path: caps[1].to_string(),
            status: FileStatus::Restored,
        });
    }
    if let Some(caps) = RESOLVED_RE.captures(line) {
        return Some(FileStatusEntry {
            path: caps[1].to_string(),
            status: FileStatus::ResolvedConflict,
        });
    }

    let caps = STATUS_LINE_RE.captures(line)?;
    let indented = !caps[1].is_empty();
    let status = match &caps[2] {
        "A" | "U" | "G" if indented => FileStatus::PropertyUpdated,
        "A" => FileStatus::Added,
        "U" | "G" => FileStatus::Updated,
        "C" => FileStatus::Conflicted,
        "D" => FileStatus::Deleted,
        "M" => FileStatus::Modified,
        "X" => FileStatus::External,
        "?" => FileStatus::Unknown,
        _ => return None,
    };
    Some(FileStatusEntry {
        path: caps[3].to_string(),
        status,
    })
}

/// Parse every recognizable line of `output`.
pub fn parse_status(output: &str) -> Vec<FileStatusEntry> {
    output.lines().filter_map(parse_status_line).collect()
}

fn paths_where(output: &str, keep: impl Fn(FileStatus) -> bool) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for entry in parse_status(output) {
        if keep(entry.status) && !paths.contains(&entry.path) {
            paths.push(entry.path);
        }
    }
    paths
}

/// Paths that `svn update` added, updated, merged, restored, or resolved.
pub fn parse_updated_files(output: &str) -> Vec<String> {
    paths_where(output, FileStatus::is_update)
}

/// Paths still in conflict after `svn update`, plus resolved conflicts.
pub fn parse_conflicted_files(output: &str) -> Vec<String> {
    paths_where(output, FileStatus::is_conflict)
}

/// Paths that `svn update` deleted.
pub fn parse_deleted_files(output: &str) -> Vec<String> {
    paths_where(output, |s| s == FileStatus::Deleted)
}

/// Paths that SVN does not track.
pub fn parse_unknown_files(output: &str) -> Vec<String> {
    paths_where(output, |s| s == FileStatus::Unknown)
}

/// Paths of SVN externals.
pub fn parse_external_paths(output: &str) -> Vec<String> {
    paths_where(output, |s| s == FileStatus::External)
}

/// Files from `svn list -R` output, without directories or hidden entries.
pub fn parse_file_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with('/'))
        .filter(|line| !line.split('/').any(|part| part.starts_with('.')))
        .map(String::from)
        .collect()
}

/// Drop externals, `.git` entries, and editor swap files from status output.
pub fn filter_noise(status: &str) -> String {
    status
        .lines()
        .filter(|line| !NOISE_RE.is_match(line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
