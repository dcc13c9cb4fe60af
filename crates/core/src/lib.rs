//! git-si core library.
//!
//! Lets a developer work with local git branches on top of an SVN working
//! copy. A dedicated mirror branch tracks the SVN repository; local branches
//! are rebased onto it and committed back through `svn commit`.
//!
//! The crate provides the command builders and output parsers for both
//! VCSs, revision tracking, the scoped branch and directory switches, and
//! the [`SyncEngine`] that runs the user-facing actions.

pub mod config;
pub mod context;
pub mod errors;
pub mod git;
pub mod gitignore;
pub mod revision;
pub mod runner;
pub mod svn;
pub mod sync_engine;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience.
pub use config::SiConfig;
pub use errors::CoreError;
pub use runner::SystemRunner;
pub use sync_engine::{Action, SyncEngine};
pub use ui::Ui;
