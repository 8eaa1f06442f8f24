//! The Ent service: bucket resolution in front of a storage engine.
//!
//! Every operation resolves its bucket through the [`BucketProvider`] before
//! the [`FileSystem`] is called, so an unregistered bucket fails with
//! `BucketNotFound` without touching storage. Calls are blocking; async
//! callers run them on the blocking pool.

use std::io::Read;
use std::sync::Arc;

use ent_registry::BucketProvider;
use ent_store::{File, FileSystem, Files, SortStrategy, StoreError, DEFAULT_LIMIT};
use ent_types::Bucket;

use crate::error::ServerResult;
use crate::response::ResponseFile;

/// Listing parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListOptions {
    pub prefix: String,
    pub limit: u64,
    pub sort: SortStrategy,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            limit: DEFAULT_LIMIT,
            sort: SortStrategy::NoOp,
        }
    }
}

impl ListOptions {
    /// Decode raw query parameters. Absent parameters take their defaults.
    ///
    /// The sort token is taken as decoded: an unescaped `+` arrives as a space
    /// and is rejected, so clients send `%2B`.
    pub fn from_params(
        prefix: Option<&str>,
        limit: Option<&str>,
        sort: Option<&str>,
    ) -> ServerResult<Self> {
        let limit = match limit {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| StoreError::InvalidParam(format!("limit {raw:?}: {e}")))?,
        };

        let sort = match sort {
            None => SortStrategy::NoOp,
            Some(raw) => SortStrategy::parse_param(raw)?,
        };

        Ok(Self {
            prefix: prefix.unwrap_or_default().to_string(),
            limit,
            sort,
        })
    }
}

/// Bucket-checked access to a storage engine.
#[derive(Clone)]
pub struct Ent {
    provider: Arc<dyn BucketProvider>,
    fs: Arc<dyn FileSystem>,
}

impl Ent {
    pub fn new(provider: Arc<dyn BucketProvider>, fs: Arc<dyn FileSystem>) -> Self {
        Self { provider, fs }
    }

    fn resolve(&self, bucket: &str) -> ServerResult<Arc<Bucket>> {
        if bucket.is_empty() {
            return Err(StoreError::EmptyBucket.into());
        }
        Ok(self.provider.get(bucket)?)
    }

    fn require_key(key: &str) -> ServerResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey.into());
        }
        Ok(())
    }

    /// Every registered bucket, ordered by name.
    pub fn buckets(&self) -> ServerResult<Vec<Arc<Bucket>>> {
        let mut buckets = self.provider.list()?;
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    pub fn create(
        &self,
        bucket: &str,
        key: &str,
        src: &mut dyn Read,
    ) -> ServerResult<(Arc<Bucket>, Box<dyn File>)> {
        let bucket = self.resolve(bucket)?;
        Self::require_key(key)?;
        let file = self.fs.create(&bucket, key, src)?;
        Ok((bucket, file))
    }

    pub fn open(&self, bucket: &str, key: &str) -> ServerResult<(Arc<Bucket>, Box<dyn File>)> {
        let bucket = self.resolve(bucket)?;
        Self::require_key(key)?;
        let file = self.fs.open(&bucket, key)?;
        Ok((bucket, file))
    }

    /// Remove a file, returning its metadata as it was before removal.
    pub fn delete(&self, bucket: &str, key: &str) -> ServerResult<ResponseFile> {
        let (bucket, mut file) = self.open(bucket, key)?;
        let document = file_document(&bucket, file.as_mut(), false)?;
        drop(file);
        self.fs.delete(&bucket, key)?;
        Ok(document)
    }

    pub fn list(&self, bucket: &str, options: &ListOptions) -> ServerResult<(Arc<Bucket>, Files)> {
        let bucket = self.resolve(bucket)?;
        let files = self
            .fs
            .list(&bucket, &options.prefix, options.limit, options.sort)?;
        Ok((bucket, files))
    }
}

/// Describe `file` as a response document, hashing it when `with_hash`.
pub fn file_document(
    bucket: &Arc<Bucket>,
    file: &mut dyn File,
    with_hash: bool,
) -> ServerResult<ResponseFile> {
    let hash = if with_hash {
        Some(file.hash()?.to_hex())
    } else {
        None
    };
    Ok(ResponseFile {
        key: file.key().to_string(),
        hash,
        last_modified: file.last_modified(),
        bucket: Arc::clone(bucket),
    })
}
