//! Foundation types for Ent.
//!
//! Ent stores blobs under string keys inside named partitions called buckets.
//! Every other Ent crate depends on `ent-types` for the shared data model.
//!
//! # Key Types
//!
//! - [`Bucket`] - A named partition of the object namespace with one [`Owner`]
//! - [`EmailAddress`] - Identity of the owning person or group
//! - [`ContentHash`] - BLAKE3 digest of an object's content
//! - [`ErrorKind`] - The closed set of error kinds surfaced to callers
//! - [`validate_key`] - Object key rules shared by every storage engine

pub mod bucket;
pub mod error;
pub mod hash;
pub mod key;

pub use bucket::{Bucket, EmailAddress, Owner};
pub use error::{ErrorKind, TypeError};
pub use hash::ContentHash;
pub use key::{validate_bucket_name, validate_key, TEMP_PREFIX};
