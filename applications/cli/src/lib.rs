//! Cadence CLI
//!
//! Composition root for the Cadence libraries: loads [`CadenceConfig`],
//! opens the content cache and runs maintenance commands against it.

pub mod commands;
pub mod config;
pub mod error;

pub use config::CadenceConfig;
pub use error::{CliError, Result};
