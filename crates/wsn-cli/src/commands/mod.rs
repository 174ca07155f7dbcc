//! Subcommand implementations

pub mod init;
pub mod replay;
pub mod run;
