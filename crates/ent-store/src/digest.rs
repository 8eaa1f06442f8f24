use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::SystemTime;

use ent_types::ContentHash;

/// Incremental digest of a handle's content plus the bookkeeping that decides
/// whether the cached value still describes the stream.
///
/// The cache is valid when no out-of-order write went through the handle,
/// the number of hashed bytes equals the current size, and, if a
/// modification time was pinned at hashing time, that time is unchanged.
/// A same-size overwrite by another writer that also preserves the
/// modification time is not detected.
pub(crate) struct HashState {
    hasher: blake3::Hasher,
    hashed: u64,
    pinned_mtime: Option<SystemTime>,
    dirty: bool,
}

impl HashState {
    pub(crate) fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
            hashed: 0,
            pinned_mtime: None,
            dirty: false,
        }
    }

    /// Account for `bytes` written at stream offset `position`.
    ///
    /// Appends at the hashed end extend the digest; anything else marks the
    /// cache dirty so the next `hash()` re-reads the stream.
    pub(crate) fn record_write(&mut self, position: u64, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if !self.dirty && position == self.hashed {
            self.hasher.update(bytes);
            self.hashed += bytes.len() as u64;
        } else {
            self.dirty = true;
        }
        self.pinned_mtime = None;
    }

    /// Remember the modification time of content that was hashed through
    /// writes, once it has been published.
    pub(crate) fn pin(&mut self, mtime: Option<SystemTime>) {
        self.pinned_mtime = mtime;
    }

    pub(crate) fn cached(&self, size: u64, mtime: Option<SystemTime>) -> Option<ContentHash> {
        if self.dirty || self.hashed != size {
            return None;
        }
        match (self.pinned_mtime, mtime) {
            (Some(pinned), Some(current)) if pinned != current => None,
            _ => Some(ContentHash::from(self.hasher.finalize())),
        }
    }

    /// Reset and re-read the whole stream, restoring its position afterwards.
    pub(crate) fn recompute<R: Read + Seek>(
        &mut self,
        stream: &mut R,
        mtime: Option<SystemTime>,
    ) -> io::Result<ContentHash> {
        let position = stream.stream_position()?;
        self.hasher.reset();
        self.hashed = 0;

        stream.seek(SeekFrom::Start(0))?;
        let copied = io::copy(stream, &mut self.hasher)?;
        stream.seek(SeekFrom::Start(position))?;

        self.hashed = copied;
        self.dirty = false;
        self.pinned_mtime = mtime;
        Ok(ContentHash::from(self.hasher.finalize()))
    }
}

impl fmt::Debug for HashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashState")
            .field("hashed", &self.hashed)
            .field("dirty", &self.dirty)
            .field("pinned_mtime", &self.pinned_mtime)
            .finish()
    }
}
