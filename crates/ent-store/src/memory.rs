use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use ent_types::{validate_bucket_name, validate_key, Bucket, ContentHash};

use crate::digest::HashState;
use crate::error::{StoreError, StoreResult};
use crate::sort::SortStrategy;
use crate::traits::{limit_to_len, File, FileMeta, FileSystem, Files};

#[derive(Clone)]
struct Entry {
    data: Arc<[u8]>,
    last_modified: DateTime<Utc>,
}

struct Inner {
    buckets: HashMap<String, HashMap<String, Entry>>,
    clock: DateTime<Utc>,
}

impl Inner {
    /// Wall-clock time, bumped so successive writes never share a timestamp.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.clock = if now > self.clock {
            now
        } else {
            self.clock + Duration::nanoseconds(1)
        };
        self.clock
    }
}

/// In-memory, HashMap-based [`FileSystem`].
///
/// Intended for tests and embedding. Content is held behind a `RwLock`;
/// handles share the stored bytes and never observe later writes to the key.
/// Keys are opaque strings here, so a key may be both a file and the prefix
/// of other keys.
pub struct InMemoryFileSystem {
    inner: RwLock<Inner>,
}

impl InMemoryFileSystem {
    /// Create a new empty in-memory file system.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                buckets: HashMap::new(),
                clock: DateTime::<Utc>::MIN_UTC,
            }),
        }
    }

    /// Number of files stored in `bucket`.
    pub fn len(&self, bucket: &Bucket) -> usize {
        self.inner
            .read()
            .map(|inner| inner.buckets.get(&bucket.name).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    /// Returns `true` if nothing is stored in `bucket`.
    pub fn is_empty(&self, bucket: &Bucket) -> bool {
        self.len(bucket) == 0
    }
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Poisoned("in-memory file system".into())
}

fn validate(bucket: &Bucket, key: &str) -> StoreResult<()> {
    validate_bucket_name(&bucket.name)?;
    validate_key(key)?;
    Ok(())
}

impl FileSystem for InMemoryFileSystem {
    fn create(&self, bucket: &Bucket, key: &str, src: &mut dyn Read) -> StoreResult<Box<dyn File>> {
        validate(bucket, key)?;

        // Buffer the whole source before taking the lock so a failed read
        // leaves the previous content in place.
        let mut data = Vec::new();
        src.read_to_end(&mut data)
            .map_err(|e| StoreError::io("write", format!("{}/{}", bucket.name, key), e))?;

        let mut digest = HashState::new();
        digest.record_write(0, &data);

        let entry = {
            let mut inner = self.inner.write().map_err(poisoned)?;
            let entry = Entry {
                data: Arc::from(data),
                last_modified: inner.tick(),
            };
            inner
                .buckets
                .entry(bucket.name.clone())
                .or_default()
                .insert(key.to_string(), entry.clone());
            entry
        };

        tracing::debug!(bucket = %bucket.name, key, bytes = entry.data.len(), "created in-memory file");
        Ok(Box::new(MemoryFile::with_digest(key, entry, digest)))
    }

    fn open(&self, bucket: &Bucket, key: &str) -> StoreResult<Box<dyn File>> {
        validate(bucket, key)?;
        let inner = self.inner.read().map_err(poisoned)?;
        let entry = inner
            .buckets
            .get(&bucket.name)
            .and_then(|files| files.get(key))
            .cloned()
            .ok_or_else(|| StoreError::not_found(&bucket.name, key))?;
        Ok(Box::new(MemoryFile::new(key, entry)))
    }

    fn delete(&self, bucket: &Bucket, key: &str) -> StoreResult<()> {
        validate(bucket, key)?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner
            .buckets
            .get_mut(&bucket.name)
            .and_then(|files| files.remove(key))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(&bucket.name, key))
    }

    fn list(
        &self,
        bucket: &Bucket,
        prefix: &str,
        limit: u64,
        sort: SortStrategy,
    ) -> StoreResult<Files> {
        validate_bucket_name(&bucket.name)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut matches: Vec<MemoryFile> = {
            let inner = self.inner.read().map_err(poisoned)?;
            match inner.buckets.get(&bucket.name) {
                Some(files) => files
                    .iter()
                    .filter(|(key, _)| key.starts_with(prefix))
                    .map(|(key, entry)| MemoryFile::new(key, entry.clone()))
                    .collect(),
                None => Vec::new(),
            }
        };

        sort.sort(&mut matches);
        matches.truncate(limit_to_len(limit));
        Ok(matches.into_iter().map(|f| Box::new(f) as Box<dyn File>).collect())
    }
}

/// Read-only handle to content held by [`InMemoryFileSystem`].
pub struct MemoryFile {
    key: String,
    last_modified: DateTime<Utc>,
    cursor: Cursor<Arc<[u8]>>,
    digest: HashState,
}

impl MemoryFile {
    fn new(key: impl Into<String>, entry: Entry) -> Self {
        Self::with_digest(key, entry, HashState::new())
    }

    fn with_digest(key: impl Into<String>, entry: Entry, digest: HashState) -> Self {
        Self {
            key: key.into(),
            last_modified: entry.last_modified,
            cursor: Cursor::new(entry.data),
            digest,
        }
    }
}

impl FileMeta for MemoryFile {
    fn key(&self) -> &str {
        &self.key
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}

impl File for MemoryFile {
    fn hash(&mut self) -> StoreResult<ContentHash> {
        let size = self.cursor.get_ref().len() as u64;
        if let Some(hash) = self.digest.cached(size, None) {
            return Ok(hash);
        }
        self.digest
            .recompute(&mut self.cursor, None)
            .map_err(|e| StoreError::io("hash", self.key.clone(), e))
    }

    fn size(&self) -> StoreResult<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("file handle for {:?} is read-only", self.key),
        ))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("key", &self.key)
            .field("last_modified", &self.last_modified)
            .field("size", &self.cursor.get_ref().len())
            .finish()
    }
}
