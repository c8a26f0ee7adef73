use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::client::ClientError;
use lagoon_sync_core::ImportError;

/// Errors surfaced by the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("no input: pass --import <file> or pipe a document on stdin")]
    NoInput,

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("remote request failed: {0}")]
    Remote(String),

    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    #[error("prompt failed: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
