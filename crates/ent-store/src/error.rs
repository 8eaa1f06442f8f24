use std::io;

use ent_types::{ErrorKind, TypeError};

/// Errors from storage engine operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is stored under the key, or the key resolves to a directory.
    #[error("file not found: {bucket}/{key}")]
    FileNotFound { bucket: String, key: String },

    /// Malformed caller input: key, sort token, or limit.
    #[error("invalid param: {0}")]
    InvalidParam(String),

    /// A bucket name was required but empty.
    #[error("bucket not provided")]
    EmptyBucket,

    /// A key was required but empty.
    #[error("key not provided")]
    EmptyKey,

    /// A content source was required but missing.
    #[error("source not provided")]
    EmptySource,

    /// The storage medium rejected the operation.
    #[error("{op} failed for {target}: {source}")]
    Io {
        op: &'static str,
        target: String,
        #[source]
        source: io::Error,
    },

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    pub(crate) fn not_found(bucket: &str, key: &str) -> Self {
        Self::FileNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn io(op: &'static str, target: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            op,
            target: target.into(),
            source,
        }
    }

    /// The error kind surfaced to outer layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::InvalidParam(_) => ErrorKind::InvalidParam,
            Self::EmptyBucket => ErrorKind::EmptyBucket,
            Self::EmptyKey => ErrorKind::EmptyKey,
            Self::EmptySource => ErrorKind::EmptySource,
            Self::Io { .. } | Self::Poisoned(_) => ErrorKind::Storage,
        }
    }

    pub fn is_file_not_found(&self) -> bool {
        self.kind() == ErrorKind::FileNotFound
    }

    pub fn is_invalid_param(&self) -> bool {
        self.kind() == ErrorKind::InvalidParam
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        Self::InvalidParam(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
