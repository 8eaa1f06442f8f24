//! In-memory bucket registry for tests and embedding.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ent_types::Bucket;

use crate::error::{RegistryError, RegistryResult};
use crate::traits::BucketProvider;

/// A [`BucketProvider`] whose buckets are registered programmatically.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    buckets: RwLock<HashMap<String, Arc<Bucket>>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bucket, replacing any bucket with the same name.
    pub fn insert(&self, bucket: Bucket) -> RegistryResult<()> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))?;
        buckets.insert(bucket.name.clone(), Arc::new(bucket));
        Ok(())
    }

    /// Build a provider holding `buckets`.
    pub fn with_buckets(buckets: impl IntoIterator<Item = Bucket>) -> Self {
        let map = buckets
            .into_iter()
            .map(|b| (b.name.clone(), Arc::new(b)))
            .collect();
        Self {
            buckets: RwLock::new(map),
        }
    }
}

impl BucketProvider for InMemoryProvider {
    fn get(&self, name: &str) -> RegistryResult<Arc<Bucket>> {
        let buckets = self
            .buckets
            .read()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))?;
        buckets
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::BucketNotFound {
                name: name.to_string(),
            })
    }

    fn list(&self) -> RegistryResult<Vec<Arc<Bucket>>> {
        let buckets = self
            .buckets
            .read()
            .map_err(|e| RegistryError::Poisoned(e.to_string()))?;
        Ok(buckets.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ent_types::{EmailAddress, Owner};

    fn bucket(name: &str) -> Bucket {
        Bucket::new(name, Owner::new(EmailAddress::new("", format!("{name}@bucket.io"))))
    }

    #[test]
    fn insert_and_get() {
        let provider = InMemoryProvider::new();
        provider.insert(bucket("bit")).unwrap();
        assert_eq!(provider.get("bit").unwrap().name, "bit");
        assert!(provider.get("doge").unwrap_err().is_bucket_not_found());
    }

    #[test]
    fn insert_replaces() {
        let provider = InMemoryProvider::with_buckets([bucket("bit")]);
        let mut replacement = bucket("bit");
        replacement.owner.email.name = "new owner".into();
        provider.insert(replacement).unwrap();
        assert_eq!(provider.list().unwrap().len(), 1);
        assert_eq!(provider.get("bit").unwrap().owner.email.name, "new owner");
    }

    #[test]
    fn list_returns_all() {
        let provider = InMemoryProvider::with_buckets(["a", "b", "c"].map(bucket));
        let mut names: Vec<_> = provider.list().unwrap().iter().map(|b| b.name.clone()).collect();
        names.sort();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
