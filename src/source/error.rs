//! Error types for provider resolution.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The configured provider version does not satisfy the requested constraint
    #[error("provider {address} is pinned to {version}, which does not satisfy \"{constraint}\"")]
    VersionIncompatible {
        address: String,
        version: String,
        constraint: String,
    },

    /// No provider is configured for the requested address
    #[error("no provider configured for {address}")]
    ProviderNotFound { address: String },

    /// The provider's schema file has no entry for its address
    #[error("{address}: schema not found")]
    SchemaNotFound { address: String },

    /// Persisted schema data could not be decoded
    #[error("failed to decode {}: at JSON path {path} → {message}", file.display())]
    Decode {
        file: PathBuf,
        path: String,
        message: String,
    },

    #[error("invalid provider source {input:?}: {reason}")]
    InvalidProviderSource { input: String, reason: &'static str },

    #[error("invalid version {input:?}")]
    InvalidVersion { input: String },

    #[error("invalid version constraint {input:?}")]
    InvalidConstraint { input: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceError>;

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io { path: path.into(), source }
    }
}
