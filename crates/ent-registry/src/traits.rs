//! The [`BucketProvider`] trait defining how bucket names are resolved.

use std::sync::Arc;

use ent_types::Bucket;

use crate::error::RegistryResult;

/// Access to a collection of buckets.
///
/// Implementations must be thread-safe (`Send + Sync`). Buckets are handed
/// out as shared read-only views; the provider owns them for its lifetime.
pub trait BucketProvider: Send + Sync {
    /// Resolve a bucket by name.
    ///
    /// Returns `BucketNotFound` if no bucket with this name is registered.
    fn get(&self, name: &str) -> RegistryResult<Arc<Bucket>>;

    /// All registered buckets, in unspecified order.
    fn list(&self) -> RegistryResult<Vec<Arc<Bucket>>>;
}
