use std::fmt;
use std::io::{Read, Seek, Write};

use chrono::{DateTime, Utc};
use ent_types::{Bucket, ContentHash};

use crate::error::{StoreError, StoreResult};
use crate::sort::SortStrategy;

/// Limit meaning "return every match".
pub const DEFAULT_LIMIT: u64 = u64::MAX;

/// Metadata shared by open handles and listing entries.
///
/// Sort strategies only ever look at this surface.
pub trait FileMeta {
    /// Key relative to the bucket, `/`-separated.
    fn key(&self) -> &str;

    /// Set by the storage backend when the content was last written.
    fn last_modified(&self) -> DateTime<Utc>;
}

impl<T: FileMeta + ?Sized> FileMeta for Box<T> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn last_modified(&self) -> DateTime<Utc> {
        (**self).last_modified()
    }
}

/// An open handle to one stored object.
///
/// The handle wraps a seekable byte stream. Handles returned by a
/// [`FileSystem`] are read-only: `write` fails with `PermissionDenied`.
/// Dropping the handle releases the underlying resource.
pub trait File: FileMeta + Read + Write + Seek + Send + fmt::Debug {
    /// Content digest of the whole stream.
    ///
    /// Cached between calls while the content's size and modification time
    /// are unchanged. The stream position is preserved.
    fn hash(&mut self) -> StoreResult<ContentHash>;

    /// Current size of the content in bytes.
    fn size(&self) -> StoreResult<u64>;
}

/// A group of open handles. Order is meaningful only after a
/// [`SortStrategy`] has been applied.
pub type Files = Vec<Box<dyn File>>;

/// CRUD operations for a collection of named files namespaced into buckets.
///
/// All implementations must satisfy these invariants:
/// - Within a bucket, a key identifies at most one file at any time.
/// - `create` replaces prior content atomically; `open` never observes a
///   partially written file.
/// - `delete` of an absent key is `FileNotFound`, never a silent success.
/// - `list` on a bucket with nothing stored yet is empty, not an error.
/// - Safe to call concurrently; no ordering is guaranteed between concurrent
///   writers of the same key.
pub trait FileSystem: Send + Sync {
    /// Store the full content of `src` under `key`, replacing prior content.
    fn create(&self, bucket: &Bucket, key: &str, src: &mut dyn Read) -> StoreResult<Box<dyn File>>;

    /// Open the content stored under `key` for reading.
    fn open(&self, bucket: &Bucket, key: &str) -> StoreResult<Box<dyn File>>;

    /// Remove the object stored under `key`.
    fn delete(&self, bucket: &Bucket, key: &str) -> StoreResult<()>;

    /// Every file whose key starts with `prefix`, ordered by `sort` and
    /// truncated to at most `limit` entries.
    fn list(
        &self,
        bucket: &Bucket,
        prefix: &str,
        limit: u64,
        sort: SortStrategy,
    ) -> StoreResult<Files>;

    /// Check whether an object is stored under `key`.
    ///
    /// Default implementation opens and immediately releases a handle.
    fn exists(&self, bucket: &Bucket, key: &str) -> StoreResult<bool> {
        match self.open(bucket, key) {
            Ok(_) => Ok(true),
            Err(StoreError::FileNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn limit_to_len(limit: u64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}
