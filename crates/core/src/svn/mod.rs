//! SVN command builders and output parsers.

pub mod commands;
pub mod parser;

pub use commands::SvnCommands;
pub use parser::*;
