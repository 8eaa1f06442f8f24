//! Error types for registry operations.

use std::path::PathBuf;

use ent_types::ErrorKind;
use thiserror::Error;

/// Errors that can occur while loading or querying a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No bucket with this name is registered.
    #[error("bucket not found: {name}")]
    BucketNotFound { name: String },

    /// A policy file could not be decoded or describes an invalid bucket.
    #[error("invalid policy {}: {reason}", path.display())]
    Policy { path: PathBuf, reason: String },

    /// I/O error while reading the policy directory.
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BucketNotFound { .. } => ErrorKind::BucketNotFound,
            Self::Policy { .. } => ErrorKind::InvalidParam,
            Self::Io { .. } | Self::Poisoned(_) => ErrorKind::Storage,
        }
    }

    pub fn is_bucket_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound { .. })
    }
}

/// Convenience type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
