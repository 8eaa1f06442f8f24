//! JSON documents returned by the HTTP API.
//!
//! Durations are nanoseconds. Timestamps are RFC 3339 in UTC.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ent_types::Bucket;
use serde::{Deserialize, Serialize};

/// Metadata of one stored file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFile {
    pub key: String,
    /// Hex content digest. Omitted where computing it would mean reading
    /// the content (listings, deletes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub bucket: Arc<Bucket>,
}

/// Reply to a successful upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseCreated {
    pub duration: u64,
    pub file: ResponseFile,
}

/// Reply to a successful delete.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseDeleted {
    pub duration: u64,
    pub file: ResponseFile,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseFileList {
    pub count: usize,
    pub duration: u64,
    pub bucket: Arc<Bucket>,
    pub files: Vec<ResponseFile>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseBucketList {
    pub count: usize,
    pub duration: u64,
    pub buckets: Vec<Arc<Bucket>>,
}

/// Body of every non-HEAD error reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: u16,
    pub error: String,
    pub description: String,
}

/// Elapsed time in whole nanoseconds, saturating.
pub fn nanos(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}
