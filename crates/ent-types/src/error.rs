use std::fmt;

use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid email address {input:?}: {reason}")]
    InvalidEmail { input: String, reason: String },

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
}

/// The closed set of error kinds that Ent surfaces to its callers.
///
/// Every error type in the workspace maps onto exactly one kind through a
/// `kind()` method. Outer layers (HTTP, CLI) translate kinds, never concrete
/// error values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The bucket name is not registered.
    BucketNotFound,
    /// No object is stored under the key, or the key names a directory.
    FileNotFound,
    /// Malformed input such as a sort token, a limit, or a key.
    InvalidParam,
    /// A bucket name was required but not provided.
    EmptyBucket,
    /// A key was required but not provided.
    EmptyKey,
    /// A content source was required but not provided.
    EmptySource,
    /// The storage medium failed (permissions, disk full, rename failure).
    Storage,
}

impl ErrorKind {
    /// Returns `true` for kinds caused by the caller's input rather than
    /// by the state of the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParam | Self::EmptyBucket | Self::EmptyKey | Self::EmptySource
        )
    }

    /// Returns `true` for the two "does not exist" kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BucketNotFound | Self::FileNotFound)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BucketNotFound => "bucket not found",
            Self::FileNotFound => "file not found",
            Self::InvalidParam => "invalid param",
            Self::EmptyBucket => "bucket not provided",
            Self::EmptyKey => "key not provided",
            Self::EmptySource => "source not provided",
            Self::Storage => "storage failure",
        };
        f.write_str(s)
    }
}
