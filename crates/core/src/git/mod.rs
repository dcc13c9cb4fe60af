//! Git command builders and output parsers.

pub mod commands;
pub mod parser;

pub use commands::GitCommands;
pub use parser::*;
