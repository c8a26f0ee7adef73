//! Error taxonomy of the reconciliation engine.
//!
//! Structural problems ([`ImportError`]) abort a run before any remote call.
//! Problems with individual operations ([`ApplyError`]) are collected into the
//! run's result according to the failure policy.

use thiserror::Error;

/// Fatal errors raised while reading or writing documents and snapshots.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("failed to serialize document: {0}")]
    Serialize(String),
}

impl ImportError {
    /// Builds a [`ImportError::MalformedDocument`] from a YAML error, keeping
    /// the position when the parser reports one.
    pub fn from_yaml(err: serde_yaml::Error) -> Self {
        let location = match err.location() {
            Some(loc) => format!(" at line {}, column {}", loc.line(), loc.column()),
            None => String::new(),
        };
        ImportError::MalformedDocument(format!("invalid YAML{location}: {err}"))
    }
}

/// Why a single operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// The operation referenced an entity that exists neither in the document
    /// (successfully created) nor on the platform.
    #[error("unresolved dependency on {}: {message}", references.join(", "))]
    DependencyUnresolved {
        references: Vec<String>,
        message: String,
    },

    #[error("remote operation failed: {message}")]
    RemoteOperationFailed { message: String },

    #[error("could not build request variables: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
