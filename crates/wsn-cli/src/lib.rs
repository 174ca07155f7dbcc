//! WSN CLI library
//!
//! Configuration loading and the subcommands behind the `wsn` binary:
//! - `init` writes a default `wsn.toml`
//! - `run` drives one deployment through the monitoring lifecycle on the
//!   in-memory ledger, optionally saving its journal
//! - `replay` rebuilds controllers from a saved journal

#![allow(missing_docs)]

pub mod commands;
pub mod config;

pub use config::WsnConfig;
