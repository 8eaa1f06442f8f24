//! Bucket-scoped blob storage for Ent.
//!
//! This crate implements the storage engine: a CRUD contract over objects
//! ("files") addressed by a [`Bucket`](ent_types::Bucket) and a string key.
//! Keys may contain `/` to express hierarchy.
//!
//! # Storage Backends
//!
//! All backends implement the [`FileSystem`] trait:
//!
//! - [`DiskFileSystem`] -- `<root>/<bucket>/<key...>` on a local filesystem
//! - [`InMemoryFileSystem`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A create is published by a single atomic rename; readers never observe
//!    a partially written object. Concurrent writers to one key: last wins.
//! 2. Handles returned by the engine are read-only and released on drop.
//! 3. A handle's content hash is computed lazily and cached until the
//!    underlying content changes size or modification time.
//! 4. Listings are filtered by prefix, ordered by a [`SortStrategy`], then
//!    truncated to the limit.
//! 5. The engine never retries. All I/O errors are propagated with the
//!    operation and target that failed.

mod digest;

pub mod disk;
pub mod error;
pub mod file;
pub mod memory;
pub mod sort;
pub mod traits;

pub use disk::DiskFileSystem;
pub use error::{StoreError, StoreResult};
pub use file::DiskFile;
pub use memory::{InMemoryFileSystem, MemoryFile};
pub use sort::{Order, SortStrategy};
pub use traits::{File, FileMeta, FileSystem, Files, DEFAULT_LIMIT};
