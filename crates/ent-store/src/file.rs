use std::fmt;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};

use chrono::{DateTime, Utc};
use ent_types::ContentHash;

use crate::digest::HashState;
use crate::error::{StoreError, StoreResult};
use crate::traits::{File, FileMeta};

/// Handle to a file stored by [`DiskFileSystem`](crate::DiskFileSystem).
///
/// Wraps an open `std::fs::File` and exposes it through the [`File`] trait.
/// While a create is in flight the handle writes to the temporary file and
/// hashes the bytes as they pass; once published it becomes read-only.
pub struct DiskFile {
    inner: fs::File,
    key: String,
    last_modified: DateTime<Utc>,
    digest: HashState,
    writable: bool,
}

impl DiskFile {
    /// Wrap a handle opened for reading.
    pub(crate) fn read_only(inner: fs::File, key: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            inner,
            key: key.into(),
            last_modified,
            digest: HashState::new(),
            writable: false,
        }
    }

    /// Wrap the temporary file a create writes into.
    pub(crate) fn staging(inner: fs::File, key: impl Into<String>) -> Self {
        Self {
            inner,
            key: key.into(),
            last_modified: Utc::now(),
            digest: HashState::new(),
            writable: true,
        }
    }

    /// Flush staged content to stable storage.
    pub(crate) fn sync(&mut self) -> io::Result<()> {
        self.inner.flush()?;
        self.inner.sync_all()
    }

    /// Freeze a fully written staging handle.
    ///
    /// Runs before the rename: nothing may fail once the object is visible,
    /// and a rename leaves the modification time untouched. The descriptor
    /// keeps pointing at the published inode, so a concurrent replace of the
    /// same key never changes what this handle reads. The digest accumulated
    /// while staging is pinned to the modification time.
    pub(crate) fn seal(&mut self) -> io::Result<()> {
        let modified = self.inner.metadata()?.modified()?;
        self.inner.seek(SeekFrom::Start(0))?;
        self.writable = false;
        self.last_modified = DateTime::<Utc>::from(modified);
        self.digest.pin(Some(modified));
        Ok(())
    }
}

impl FileMeta for DiskFile {
    fn key(&self) -> &str {
        &self.key
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}

impl File for DiskFile {
    fn hash(&mut self) -> StoreResult<ContentHash> {
        let metadata = self
            .inner
            .metadata()
            .map_err(|e| StoreError::io("stat", self.key.clone(), e))?;
        let mtime = metadata.modified().ok();

        if let Some(hash) = self.digest.cached(metadata.len(), mtime) {
            return Ok(hash);
        }

        tracing::debug!(key = %self.key, size = metadata.len(), "re-hashing file");
        self.digest
            .recompute(&mut self.inner, mtime)
            .map_err(|e| StoreError::io("hash", self.key.clone(), e))
    }

    fn size(&self) -> StoreResult<u64> {
        self.inner
            .metadata()
            .map(|m| m.len())
            .map_err(|e| StoreError::io("stat", self.key.clone(), e))
    }
}

impl Read for DiskFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for DiskFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Write for DiskFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("file handle for {:?} is read-only", self.key),
            ));
        }
        let position = self.inner.stream_position()?;
        let written = self.inner.write(buf)?;
        self.digest.record_write(position, &buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl fmt::Debug for DiskFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskFile")
            .field("key", &self.key)
            .field("last_modified", &self.last_modified)
            .field("writable", &self.writable)
            .field("digest", &self.digest)
            .finish()
    }
}
