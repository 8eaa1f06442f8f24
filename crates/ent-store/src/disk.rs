//! Disk-backed [`FileSystem`].
//!
//! Layout: `<root>/<bucket>/<key...>`. Keys containing `/` map onto nested
//! directories. A create streams into a temporary file named with
//! [`TEMP_PREFIX`] inside the bucket directory, syncs it, and renames it onto
//! the final path. The rename is the single point of publication.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ent_types::{validate_bucket_name, validate_key, Bucket, TEMP_PREFIX};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::file::DiskFile;
use crate::sort::SortStrategy;
use crate::traits::{limit_to_len, File, FileMeta, FileSystem, Files};

/// A [`FileSystem`] storing each bucket as a directory below `root`.
#[derive(Clone, Debug)]
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Create an engine rooted at `root`. Nothing is touched on disk until
    /// the first create.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory holding one directory per bucket.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the given bucket's objects.
    pub fn bucket_dir(&self, bucket: &Bucket) -> PathBuf {
        self.root.join(&bucket.name)
    }

    fn object_path(&self, bucket: &Bucket, key: &str) -> StoreResult<PathBuf> {
        validate_bucket_name(&bucket.name)?;
        validate_key(key)?;
        Ok(self.bucket_dir(bucket).join(key))
    }
}

fn target(bucket: &Bucket, key: &str) -> String {
    format!("{}/{}", bucket.name, key)
}

/// Errors meaning "nothing addressable lives here".
fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Key of `path` relative to `bucket_dir`, `/`-separated. `None` for paths
/// outside the bucket or with non-UTF-8 components.
fn key_for(bucket_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(bucket_dir).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        parts.push(component.as_os_str().to_str()?);
    }
    Some(parts.join("/"))
}

/// Whether any key below the directory `dir_key` can start with `prefix`.
fn may_contain(dir_key: &str, prefix: &str) -> bool {
    let with_slash = format!("{dir_key}/");
    with_slash.starts_with(prefix) || prefix.starts_with(&with_slash)
}

/// A listing candidate, sorted and truncated before any handle is opened.
struct ListEntry {
    key: String,
    last_modified: DateTime<Utc>,
    path: PathBuf,
}

impl FileMeta for ListEntry {
    fn key(&self) -> &str {
        &self.key
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}

impl FileSystem for DiskFileSystem {
    fn create(&self, bucket: &Bucket, key: &str, src: &mut dyn Read) -> StoreResult<Box<dyn File>> {
        let destination = self.object_path(bucket, key)?;
        let bucket_dir = self.bucket_dir(bucket);
        let target = target(bucket, key);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io("mkdir", target.clone(), e))?;
        }

        let staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&bucket_dir)
            .map_err(|e| StoreError::io("tempfile", target.clone(), e))?;
        // The temp path removes the staged file on drop unless it is persisted.
        let (inner, temp_path) = staged.into_parts();

        let mut file = DiskFile::staging(inner, key);
        let written = io::copy(src, &mut file).map_err(|e| StoreError::io("write", target.clone(), e))?;
        file.sync().map_err(|e| StoreError::io("sync", target.clone(), e))?;
        file.seal().map_err(|e| StoreError::io("stat", target.clone(), e))?;

        // Last fallible step; the object is visible only once it succeeds.
        temp_path
            .persist(&destination)
            .map_err(|e| StoreError::io("rename", target.clone(), e.error))?;

        debug!(bucket = %bucket.name, key, bytes = written, "created file");
        Ok(Box::new(file))
    }

    fn open(&self, bucket: &Bucket, key: &str) -> StoreResult<Box<dyn File>> {
        let path = self.object_path(bucket, key)?;
        let target = target(bucket, key);

        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if is_missing(&e) => return Err(StoreError::not_found(&bucket.name, key)),
            Err(e) => return Err(StoreError::io("stat", target, e)),
        };
        if !metadata.is_file() {
            return Err(StoreError::not_found(&bucket.name, key));
        }

        let inner = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if is_missing(&e) => return Err(StoreError::not_found(&bucket.name, key)),
            Err(e) => return Err(StoreError::io("open", target, e)),
        };
        let modified = inner
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| StoreError::io("stat", target, e))?;

        Ok(Box::new(DiskFile::read_only(inner, key, DateTime::<Utc>::from(modified))))
    }

    fn delete(&self, bucket: &Bucket, key: &str) -> StoreResult<()> {
        let path = self.object_path(bucket, key)?;
        let target = target(bucket, key);

        match fs::symlink_metadata(&path) {
            Ok(m) if m.is_file() => {}
            Ok(_) => return Err(StoreError::not_found(&bucket.name, key)),
            Err(e) if is_missing(&e) => return Err(StoreError::not_found(&bucket.name, key)),
            Err(e) => return Err(StoreError::io("stat", target, e)),
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(bucket = %bucket.name, key, "deleted file");
                Ok(())
            }
            Err(e) if is_missing(&e) => Err(StoreError::not_found(&bucket.name, key)),
            Err(e) => Err(StoreError::io("remove", target, e)),
        }
    }

    fn list(
        &self,
        bucket: &Bucket,
        prefix: &str,
        limit: u64,
        sort: SortStrategy,
    ) -> StoreResult<Files> {
        validate_bucket_name(&bucket.name)?;
        let bucket_dir = self.bucket_dir(bucket);
        let target = target(bucket, prefix);

        if limit == 0 {
            return Ok(Vec::new());
        }

        match fs::metadata(&bucket_dir) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                return Err(StoreError::io(
                    "list",
                    target,
                    io::Error::other("bucket path is not a directory"),
                ))
            }
            // Nothing was ever created in this bucket.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io("list", target, e)),
        }

        let walker = WalkDir::new(&bucket_dir)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                match key_for(&bucket_dir, entry.path()) {
                    Some(dir_key) => may_contain(&dir_key, prefix),
                    None => false,
                }
            });

        let mut entries = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.io_error().is_some_and(is_missing) => {
                    debug!(bucket = %bucket.name, error = %e, "entry vanished during listing");
                    continue;
                }
                Err(e) => return Err(StoreError::io("list", target, e.into())),
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            let Some(key) = key_for(&bucket_dir, entry.path()) else {
                warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }

            let modified = match entry.metadata().map(|m| m.modified()) {
                Ok(Ok(modified)) => modified,
                Ok(Err(e)) => return Err(StoreError::io("stat", target, e)),
                Err(e) if e.io_error().is_some_and(is_missing) => continue,
                Err(e) => return Err(StoreError::io("stat", target, e.into())),
            };

            entries.push(ListEntry {
                key,
                last_modified: DateTime::<Utc>::from(modified),
                path: entry.into_path(),
            });
        }

        sort.sort(&mut entries);
        entries.truncate(limit_to_len(limit));

        let mut files: Files = Vec::with_capacity(entries.len());
        for entry in entries {
            let inner = match fs::File::open(&entry.path) {
                Ok(f) => f,
                Err(e) if is_missing(&e) => {
                    debug!(bucket = %bucket.name, key = %entry.key, "file removed before open");
                    continue;
                }
                Err(e) => return Err(StoreError::io("open", target, e)),
            };
            files.push(Box::new(DiskFile::read_only(inner, entry.key, entry.last_modified)));
        }

        debug!(bucket = %bucket.name, prefix, count = files.len(), %sort, "listed files");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::{Cursor, Read, Seek, SeekFrom, Write};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, SystemTime};

    use ent_types::{ContentHash, EmailAddress, Owner};

    use crate::sort::Order;
    use crate::traits::DEFAULT_LIMIT;

    fn bucket(name: &str) -> Bucket {
        Bucket::new(name, Owner::new(EmailAddress::new("", "team@ent.io")))
    }

    fn setup() -> (tempfile::TempDir, DiskFileSystem) {
        let dir = tempfile::tempdir().unwrap();
        let fs = DiskFileSystem::new(dir.path());
        (dir, fs)
    }

    fn put(fs: &DiskFileSystem, b: &Bucket, key: &str, content: &[u8]) {
        fs.create(b, key, &mut Cursor::new(content.to_vec())).unwrap();
    }

    fn read_all(file: &mut Box<dyn File>) -> Vec<u8> {
        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        out
    }

    fn list_keys(fs: &DiskFileSystem, b: &Bucket, prefix: &str, limit: u64, sort: SortStrategy) -> Vec<String> {
        fs.list(b, prefix, limit, sort)
            .unwrap()
            .iter()
            .map(|f| f.key().to_string())
            .collect()
    }

    fn set_mtime(fs: &DiskFileSystem, b: &Bucket, key: &str, secs: u64) {
        let path = fs.bucket_dir(b).join(key);
        let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_400_000_000 + secs);
        fs::File::options().write(true).open(path).unwrap().set_modified(at).unwrap();
    }

    // -----------------------------------------------------------------------
    // Create / open
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_open_roundtrips_content() {
        let (dir, fs) = setup();
        let b = bucket("create");
        let content = b"file content goes here".repeat(1000);

        let mut created = fs.create(&b, "test.zip", &mut Cursor::new(content.clone())).unwrap();
        assert_eq!(created.key(), "test.zip");
        assert!(dir.path().join("create").join("test.zip").is_file());

        let mut opened = fs.open(&b, "test.zip").unwrap();
        assert_eq!(read_all(&mut opened), content);
        assert_eq!(read_all(&mut created), content);
    }

    #[test]
    fn hash_after_create_matches_independent_digest() {
        let (_dir, fs) = setup();
        let b = bucket("hash");
        let content = b"some blob".to_vec();

        let mut created = fs.create(&b, "blob", &mut Cursor::new(content.clone())).unwrap();
        assert_eq!(created.hash().unwrap(), ContentHash::digest(&content));

        let mut opened = fs.open(&b, "blob").unwrap();
        assert_eq!(opened.hash().unwrap(), ContentHash::digest(&content));
        assert_eq!(opened.size().unwrap(), content.len() as u64);
    }

    #[test]
    fn create_with_hierarchical_key() {
        let (dir, fs) = setup();
        let b = bucket("nested");
        put(&fs, &b, "my/big.blob", b"data");
        assert!(dir.path().join("nested/my/big.blob").is_file());
        assert_eq!(read_all(&mut fs.open(&b, "my/big.blob").unwrap()), b"data");
    }

    #[test]
    fn create_replaces_prior_content() {
        let (_dir, fs) = setup();
        let b = bucket("replace");
        put(&fs, &b, "k", b"first version, longer");
        put(&fs, &b, "k", b"second");
        assert_eq!(read_all(&mut fs.open(&b, "k").unwrap()), b"second");
        assert_eq!(list_keys(&fs, &b, "", DEFAULT_LIMIT, SortStrategy::NoOp), ["k"]);
    }

    #[test]
    fn create_empty_content() {
        let (_dir, fs) = setup();
        let b = bucket("empty");
        let mut file = fs.create(&b, "nothing", &mut io::empty()).unwrap();
        assert_eq!(file.size().unwrap(), 0);
        assert_eq!(file.hash().unwrap(), ContentHash::digest(b""));
    }

    #[test]
    fn created_handle_is_read_only() {
        let (_dir, fs) = setup();
        let b = bucket("ro");
        let mut file = fs.create(&b, "k", &mut Cursor::new(b"keep".to_vec())).unwrap();
        assert!(file.write(b"clobber").is_err());
        assert_eq!(read_all(&mut fs.open(&b, "k").unwrap()), b"keep");
    }

    #[test]
    fn last_modified_comes_from_the_published_file() {
        let (dir, fs) = setup();
        let b = bucket("mtime");
        let file = fs.create(&b, "k", &mut Cursor::new(b"x".to_vec())).unwrap();
        let on_disk = fs::metadata(dir.path().join("mtime/k")).unwrap().modified().unwrap();
        assert_eq!(file.last_modified(), DateTime::<Utc>::from(on_disk));
    }

    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"));
            }
            self.sent = true;
            buf[..7].copy_from_slice(b"partial");
            Ok(7)
        }
    }

    #[test]
    fn failed_create_keeps_previous_content_and_leaves_no_temp_files() {
        let (dir, fs) = setup();
        let b = bucket("atomic");
        put(&fs, &b, "k", b"previous");

        let err = fs.create(&b, "k", &mut FailingReader { sent: false }).unwrap_err();
        assert_eq!(err.kind(), ent_types::ErrorKind::Storage);
        assert_eq!(read_all(&mut fs.open(&b, "k").unwrap()), b"previous");

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("atomic"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");
    }

    #[test]
    fn failed_first_create_publishes_nothing() {
        let (_dir, fs) = setup();
        let b = bucket("atomic-new");
        assert!(fs.create(&b, "k", &mut FailingReader { sent: false }).is_err());
        assert!(fs.open(&b, "k").unwrap_err().is_file_not_found());
    }

    #[test]
    fn create_onto_directory_fails_without_damage() {
        let (_dir, fs) = setup();
        let b = bucket("dir-clash");
        put(&fs, &b, "a/1", b"child");
        let err = fs.create(&b, "a", &mut Cursor::new(b"x".to_vec())).unwrap_err();
        assert_eq!(err.kind(), ent_types::ErrorKind::Storage);
        assert_eq!(read_all(&mut fs.open(&b, "a/1").unwrap()), b"child");
    }

    #[test]
    fn concurrent_creates_on_one_key_never_publish_partial_content() {
        let (_dir, fs) = setup();
        let fs = Arc::new(fs);
        let b = bucket("race");
        let versions: Vec<Vec<u8>> = (0..8u8).map(|i| vec![b'a' + i; 64 * 1024]).collect();

        let handles: Vec<_> = versions
            .iter()
            .cloned()
            .map(|content| {
                let fs = Arc::clone(&fs);
                let b = b.clone();
                thread::spawn(move || {
                    fs.create(&b, "hot", &mut Cursor::new(content)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = read_all(&mut fs.open(&b, "hot").unwrap());
        assert!(versions.contains(&content), "published content is not one whole version");
        assert_eq!(list_keys(&fs, &b, "", DEFAULT_LIMIT, SortStrategy::NoOp), ["hot"]);
    }

    #[test]
    fn invalid_keys_are_invalid_params() {
        let (_dir, fs) = setup();
        let b = bucket("keys");
        for key in ["", "../escape", "/abs", "a//b", ".ent-pending-x"] {
            let err = fs.create(&b, key, &mut Cursor::new(b"x".to_vec())).unwrap_err();
            assert!(err.is_invalid_param(), "create {key:?}: {err}");
            assert!(fs.open(&b, key).unwrap_err().is_invalid_param());
            assert!(fs.delete(&b, key).unwrap_err().is_invalid_param());
        }
    }

    // -----------------------------------------------------------------------
    // Open / delete
    // -----------------------------------------------------------------------

    #[test]
    fn open_missing_key_is_file_not_found() {
        let (_dir, fs) = setup();
        let b = bucket("missing");
        assert!(fs.open(&b, "nope").unwrap_err().is_file_not_found());
    }

    #[test]
    fn open_directory_is_file_not_found() {
        let (_dir, fs) = setup();
        let b = bucket("dirs");
        put(&fs, &b, "a/1", b"x");
        assert!(fs.open(&b, "a").unwrap_err().is_file_not_found());
    }

    #[test]
    fn open_below_a_file_is_file_not_found() {
        let (_dir, fs) = setup();
        let b = bucket("below");
        put(&fs, &b, "z", b"x");
        assert!(fs.open(&b, "z/child").unwrap_err().is_file_not_found());
    }

    #[test]
    fn opened_handle_seeks() {
        let (_dir, fs) = setup();
        let b = bucket("seek");
        put(&fs, &b, "k", b"0123456789");
        let mut file = fs.open(&b, "k").unwrap();
        file.seek(SeekFrom::Start(6)).unwrap();
        assert_eq!(read_all(&mut file), b"6789");
    }

    #[test]
    fn delete_then_open_is_file_not_found() {
        let (_dir, fs) = setup();
        let b = bucket("delete");
        put(&fs, &b, "test.zip", b"bytes");
        fs.open(&b, "test.zip").unwrap();

        fs.delete(&b, "test.zip").unwrap();
        assert!(fs.open(&b, "test.zip").unwrap_err().is_file_not_found());
        assert!(!fs.exists(&b, "test.zip").unwrap());
    }

    #[test]
    fn delete_missing_key_is_file_not_found() {
        let (_dir, fs) = setup();
        let b = bucket("delete-missing");
        assert!(fs.delete(&b, "ghost").unwrap_err().is_file_not_found());
        put(&fs, &b, "real", b"x");
        fs.delete(&b, "real").unwrap();
        assert!(fs.delete(&b, "real").unwrap_err().is_file_not_found());
    }

    #[test]
    fn delete_directory_is_file_not_found() {
        let (dir, fs) = setup();
        let b = bucket("delete-dir");
        put(&fs, &b, "a/1", b"x");
        assert!(fs.delete(&b, "a").unwrap_err().is_file_not_found());
        assert!(dir.path().join("delete-dir/a/1").is_file());
    }

    // -----------------------------------------------------------------------
    // List
    // -----------------------------------------------------------------------

    #[test]
    fn list_unknown_bucket_directory_is_empty() {
        let (_dir, fs) = setup();
        let b = bucket("never-written");
        assert!(fs.list(&b, "", DEFAULT_LIMIT, SortStrategy::NoOp).unwrap().is_empty());
    }

    #[test]
    fn list_prefix_and_limit_counts() {
        let (_dir, fs) = setup();
        let b = bucket("counts");
        let keys = [
            "temp1", "temp2", "temp3", "temp4", "temp5", "prefix1", "prefix2", "prefix3",
            "prefix4", "one", "test/prefix",
        ];
        for key in keys {
            put(&fs, &b, key, key.as_bytes());
        }
        let total = keys.len() as u64;

        let cases: &[(&str, u64, usize)] = &[
            ("test", 1, 1),
            ("temp", 1, 1),
            ("temp", 13, 5),
            ("unexistedPrefix", 1000, 0),
            ("", total, total as usize),
            ("", total + 1, total as usize),
            ("", total - 1, total as usize - 1),
            ("", 0, 0),
            ("", DEFAULT_LIMIT, total as usize),
            ("one", 1, 1),
            ("one", 20, 1),
            ("o", 1, 1),
            ("o", 20, 1),
        ];
        for &(prefix, limit, expected) in cases {
            let files = fs.list(&b, prefix, limit, SortStrategy::NoOp).unwrap();
            assert_eq!(files.len(), expected, "prefix {prefix:?} limit {limit}");
            for file in &files {
                assert!(file.key().starts_with(prefix));
            }
        }
    }

    #[test]
    fn list_example_scenario() {
        let (_dir, fs) = setup();
        let b = bucket("b");
        for key in ["a/1", "a/2", "z"] {
            put(&fs, &b, key, b"x");
        }

        let unordered: BTreeSet<String> =
            list_keys(&fs, &b, "a/", DEFAULT_LIMIT, SortStrategy::NoOp).into_iter().collect();
        assert_eq!(unordered, BTreeSet::from(["a/1".to_string(), "a/2".to_string()]));

        assert_eq!(
            list_keys(&fs, &b, "a/", DEFAULT_LIMIT, SortStrategy::ByKey(Order::Ascending)),
            ["a/1", "a/2"]
        );
        assert_eq!(
            list_keys(&fs, &b, "", 1, SortStrategy::ByKey(Order::Descending)),
            ["z"]
        );
    }

    #[test]
    fn list_prefix_spanning_directory_and_file_names() {
        let (_dir, fs) = setup();
        let b = bucket("span");
        for key in ["ab", "a/x", "abc/y", "b/a"] {
            put(&fs, &b, key, b"x");
        }
        assert_eq!(
            list_keys(&fs, &b, "a", DEFAULT_LIMIT, SortStrategy::ByKey(Order::Ascending)),
            ["a/x", "ab", "abc/y"]
        );
        assert_eq!(
            list_keys(&fs, &b, "abc/", DEFAULT_LIMIT, SortStrategy::ByKey(Order::Ascending)),
            ["abc/y"]
        );
    }

    #[test]
    fn list_skips_directories_and_temp_files() {
        let (dir, fs) = setup();
        let b = bucket("skip");
        put(&fs, &b, "a/1", b"x");
        fs::create_dir_all(dir.path().join("skip/empty-dir")).unwrap();
        fs::write(dir.path().join("skip").join(format!("{TEMP_PREFIX}stale")), b"half").unwrap();

        assert_eq!(list_keys(&fs, &b, "", DEFAULT_LIMIT, SortStrategy::NoOp), ["a/1"]);
    }

    #[test]
    fn list_sorted_by_key() {
        let (_dir, fs) = setup();
        let b = bucket("by-key");
        for key in ["m", "a", "z/1", "c", "b/2"] {
            put(&fs, &b, key, b"x");
        }
        assert_eq!(
            list_keys(&fs, &b, "", DEFAULT_LIMIT, SortStrategy::ByKey(Order::Ascending)),
            ["a", "b/2", "c", "m", "z/1"]
        );
        assert_eq!(
            list_keys(&fs, &b, "", DEFAULT_LIMIT, SortStrategy::ByKey(Order::Descending)),
            ["z/1", "m", "c", "b/2", "a"]
        );
    }

    #[test]
    fn list_sorted_by_last_modified() {
        let (_dir, fs) = setup();
        let b = bucket("by-time");
        for (i, key) in ["old", "newest", "middle"].iter().enumerate() {
            put(&fs, &b, key, b"x");
            set_mtime(&fs, &b, key, [10, 30, 20][i]);
        }

        let files = fs
            .list(&b, "", DEFAULT_LIMIT, SortStrategy::ByLastModified(Order::Ascending))
            .unwrap();
        let keys: Vec<_> = files.iter().map(|f| f.key()).collect();
        assert_eq!(keys, ["old", "middle", "newest"]);
        for pair in files.windows(2) {
            assert!(pair[0].last_modified() < pair[1].last_modified());
        }

        assert_eq!(
            list_keys(&fs, &b, "", 2, SortStrategy::ByLastModified(Order::Descending)),
            ["newest", "middle"]
        );
    }

    #[test]
    fn listed_handles_read_content_and_hash() {
        let (_dir, fs) = setup();
        let b = bucket("handles");
        put(&fs, &b, "k", b"listed content");
        let mut files = fs.list(&b, "", DEFAULT_LIMIT, SortStrategy::NoOp).unwrap();
        assert_eq!(read_all(&mut files[0]), b"listed content");
        assert_eq!(files[0].hash().unwrap(), ContentHash::digest(b"listed content"));
    }

    #[test]
    fn buckets_are_isolated() {
        let (_dir, fs) = setup();
        let one = bucket("one");
        let two = bucket("two");
        put(&fs, &one, "shared", b"from one");
        put(&fs, &two, "shared", b"from two");
        fs.delete(&one, "shared").unwrap();
        assert_eq!(read_all(&mut fs.open(&two, "shared").unwrap()), b"from two");
        assert!(fs.list(&one, "", DEFAULT_LIMIT, SortStrategy::NoOp).unwrap().is_empty());
    }

    #[test]
    fn may_contain_prunes_unrelated_directories() {
        assert!(may_contain("a", "a/"));
        assert!(may_contain("a", ""));
        assert!(may_contain("a", "a"));
        assert!(may_contain("a/b", "a/"));
        assert!(may_contain("abc", "a"));
        assert!(!may_contain("a", "ab"));
        assert!(!may_contain("b", "a/"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn any_content_reads_back_with_its_digest(content in proptest::collection::vec(any::<u8>(), 0..8192)) {
                let (_dir, fs) = setup();
                let b = bucket("roundtrip");

                let mut created = fs.create(&b, "blob", &mut Cursor::new(content.clone())).unwrap();
                prop_assert_eq!(created.hash().unwrap(), ContentHash::digest(&content));
                prop_assert_eq!(read_all(&mut created), content.clone());

                let mut opened = fs.open(&b, "blob").unwrap();
                prop_assert_eq!(read_all(&mut opened), content.clone());
                prop_assert_eq!(opened.hash().unwrap(), ContentHash::digest(&content));
            }
        }
    }
}
