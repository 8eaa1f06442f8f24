//! Registry loaded from a directory of bucket policy files.
//!
//! Each `*.entpolicy` file directly inside the directory is a JSON document
//! describing one bucket:
//!
//! ```json
//! {"name": "bit", "owner": {"email": {"Name": "bit team", "Address": "bit@bucket.io"}}}
//! ```
//!
//! Subdirectories are not descended into. Loading happens once; files added
//! later are not observed.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ent_types::Bucket;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::traits::BucketProvider;

/// File-name suffix marking a bucket policy document.
pub const POLICY_EXTENSION: &str = ".entpolicy";

/// A [`BucketProvider`] backed by policy files on disk.
#[derive(Debug)]
pub struct DiskProvider {
    dir: PathBuf,
    buckets: HashMap<String, Arc<Bucket>>,
}

impl DiskProvider {
    /// Load every policy file in `dir`.
    ///
    /// Files are read in file-name order; when two files declare the same
    /// bucket name the later one wins. A missing directory yields an empty
    /// registry. Any unreadable or invalid policy file fails the whole load.
    pub fn load(dir: impl Into<PathBuf>) -> RegistryResult<Self> {
        let dir = dir.into();
        let mut provider = Self {
            dir,
            buckets: HashMap::new(),
        };

        let entries = match fs::read_dir(&provider.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(dir = %provider.dir.display(), "policy directory does not exist, no buckets loaded");
                return Ok(provider);
            }
            Err(source) => {
                return Err(RegistryError::Io {
                    path: provider.dir.clone(),
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RegistryError::Io {
                path: provider.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() || !is_policy_file(&path) {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        for path in paths {
            let bucket = read_policy(&path)?;
            debug!(bucket = %bucket.name, path = %path.display(), "loaded bucket policy");
            if let Some(previous) = provider.buckets.insert(bucket.name.clone(), Arc::new(bucket)) {
                warn!(
                    bucket = %previous.name,
                    path = %path.display(),
                    "duplicate bucket policy, replacing earlier definition"
                );
            }
        }

        info!(dir = %provider.dir.display(), buckets = provider.buckets.len(), "bucket registry loaded");
        Ok(provider)
    }

    /// The directory policies were loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of registered buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn is_policy_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(POLICY_EXTENSION))
}

fn read_policy(path: &Path) -> RegistryResult<Bucket> {
    let bytes = fs::read(path).map_err(|source| RegistryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bucket: Bucket = serde_json::from_slice(&bytes).map_err(|e| RegistryError::Policy {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    bucket.validate().map_err(|e| RegistryError::Policy {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(bucket)
}

impl BucketProvider for DiskProvider {
    fn get(&self, name: &str) -> RegistryResult<Arc<Bucket>> {
        self.buckets
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::BucketNotFound {
                name: name.to_string(),
            })
    }

    fn list(&self) -> RegistryResult<Vec<Arc<Bucket>>> {
        Ok(self.buckets.values().cloned().collect())
    }
}
