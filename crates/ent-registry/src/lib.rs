//! Bucket registry for Ent.
//!
//! The registry is the authoritative set of buckets a process serves. Every
//! storage operation resolves its bucket through a [`BucketProvider`] first;
//! an unknown name fails with [`RegistryError::BucketNotFound`] before any
//! storage is touched.
//!
//! # Modules
//!
//! - [`error`] - Error types for registry operations
//! - [`traits`] - The [`BucketProvider`] trait
//! - [`disk`] - [`DiskProvider`], loaded once from a directory of `.entpolicy` files
//! - [`memory`] - [`InMemoryProvider`] for tests and embedding

pub mod disk;
pub mod error;
pub mod memory;
pub mod traits;

pub use disk::{DiskProvider, POLICY_EXTENSION};
pub use error::{RegistryError, RegistryResult};
pub use memory::InMemoryProvider;
pub use traits::BucketProvider;
