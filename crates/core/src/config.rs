//! Configuration for git-si.
//!
//! Settings are loaded from an optional TOML file and then overridden by
//! command-line flags. The resulting [`SiConfig`] is handed to the
//! [`crate::context::SyncContext`] and flows from there into every command
//! builder; nothing is stored in process-wide state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Default binary names.
pub const DEFAULT_SVN_BINARY: &str = "svn";
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Name of the branch that tracks the latest fetched SVN revision.
pub const DEFAULT_MIRROR_BRANCH: &str = "MIRRORBRANCH";

/// Name of the branch that changes must never be committed from.
pub const DEFAULT_MAINLINE_BRANCH: &str = "master";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Settings threaded through every component of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiConfig {
    /// Path or name of the `svn` executable.
    #[serde(default = "default_svn_binary")]
    pub svn_binary: String,

    /// Path or name of the `git` executable.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// Branch that mirrors the SVN working copy.
    #[serde(default = "default_mirror_branch")]
    pub mirror_branch: String,

    /// Branch that is rebased after a committed branch is deleted.
    #[serde(default = "default_mainline_branch")]
    pub mainline_branch: String,

    /// Patterns appended to the default `.gitignore` set during `init`.
    #[serde(default)]
    pub extra_ignore_patterns: Vec<String>,
}

fn default_svn_binary() -> String {
    DEFAULT_SVN_BINARY.into()
}

fn default_git_binary() -> String {
    DEFAULT_GIT_BINARY.into()
}

fn default_mirror_branch() -> String {
    DEFAULT_MIRROR_BRANCH.into()
}

fn default_mainline_branch() -> String {
    DEFAULT_MAINLINE_BRANCH.into()
}

impl Default for SiConfig {
    fn default() -> Self {
        Self {
            svn_binary: default_svn_binary(),
            git_binary: default_git_binary(),
            mirror_branch: default_mirror_branch(),
            mainline_branch: default_mainline_branch(),
            extra_ignore_patterns: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & overriding
// ---------------------------------------------------------------------------

impl SiConfig {
    /// Load a [`SiConfig`] from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: SiConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// The per-user config file location, e.g. `~/.config/git-si/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("git-si").join("config.toml"))
    }

    /// Load from `explicit` if given, else from [`Self::default_path`] when
    /// that file exists, else fall back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(path)?,
                _ => {
                    debug!("no configuration file found, using defaults");
                    Self::default()
                }
            },
        };
        Ok(config.normalized())
    }

    /// Apply `--svn` / `--git` overrides. An empty override selects the
    /// default binary.
    pub fn with_binaries(mut self, svn: Option<&str>, git: Option<&str>) -> Self {
        if let Some(svn) = svn {
            self.svn_binary = svn.to_string();
        }
        if let Some(git) = git {
            self.git_binary = git.to_string();
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.svn_binary.trim().is_empty() {
            self.svn_binary = default_svn_binary();
        }
        if self.git_binary.trim().is_empty() {
            self.git_binary = default_git_binary();
        }
        self
    }

    /// Validate that the branch settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mirror_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "mirror_branch".into(),
                detail: "mirror branch name must not be empty".into(),
            });
        }
        if self.mainline_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "mainline_branch".into(),
                detail: "mainline branch name must not be empty".into(),
            });
        }
        if self.mirror_branch == self.mainline_branch {
            return Err(ConfigError::InvalidValue {
                field: "mirror_branch".into(),
                detail: format!(
                    "mirror branch must differ from the mainline branch '{}'",
                    self.mainline_branch
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SiConfig::default();
        assert_eq!(config.svn_binary, "svn");
        assert_eq!(config.git_binary, "git");
        assert_eq!(config.mirror_branch, "MIRRORBRANCH");
        assert_eq!(config.mainline_branch, "master");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "svn_binary = \"/opt/svn/bin/svn\"\nmainline_branch = \"trunk\"\nextra_ignore_patterns = [\"target\"]"
        )
        .unwrap();
        let config = SiConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.svn_binary, "/opt/svn/bin/svn");
        assert_eq!(config.git_binary, "git");
        assert_eq!(config.mainline_branch, "trunk");
        assert_eq!(config.extra_ignore_patterns, vec!["target".to_string()]);
    }

    #[test]
    fn test_file_not_found() {
        let result = SiConfig::load_from_file("/nonexistent/git-si.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "svn_binary = [").unwrap();
        let result = SiConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_binary_overrides() {
        let config = SiConfig::default().with_binaries(Some("testbin"), None);
        assert_eq!(config.svn_binary, "testbin");
        assert_eq!(config.git_binary, "git");

        let config = config.with_binaries(Some(""), Some("  "));
        assert_eq!(config.svn_binary, "svn");
        assert_eq!(config.git_binary, "git");
    }

    #[test]
    fn test_validate_rejects_same_branches() {
        let config = SiConfig {
            mirror_branch: "master".into(),
            ..SiConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_mirror() {
        let config = SiConfig {
            mirror_branch: " ".into(),
            ..SiConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
