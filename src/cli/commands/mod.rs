//! CLI command implementations

pub mod calc;
pub mod completions;
pub mod dashboard;
pub mod import;
pub mod init;
pub mod proc;
pub mod project;
pub mod sub;
