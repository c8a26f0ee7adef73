//! Command line front end for Lagoon config import and export.
//!
//! The domain logic lives in [`lagoon_sync_core`]; this crate supplies the
//! GraphQL executor, configuration, prompts and the command flows.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod prompt;

pub use client::{ClientError, GraphqlClient};
pub use config::{Config, EnvOverrides, ResolvedContext};
pub use error::{CliError, Result};
pub use lagoon_sync_core as engine;
