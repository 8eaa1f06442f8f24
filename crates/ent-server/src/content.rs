//! Conditional and byte-range reads of a stored blob.
//!
//! Follows RFC 9110 closely enough for download clients: `If-None-Match`
//! and `If-Modified-Since` answer `304`, a single `bytes=` range answers
//! `206`, and `If-Range` falls back to the full content when the validator
//! is stale. Multi-range requests are served in full.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

/// An inclusive byte range within content of a known size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for content of `size` bytes.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// What part of the content a read should return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadPlan {
    Full,
    Partial(ByteRange),
    /// The range cannot be served; answer `416`.
    Unsatisfiable,
}

fn header_str<'a>(headers: &'a HeaderMap, name: header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn opaque_tag(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix("W/").unwrap_or(raw).trim_matches('"')
}

/// Whether the client's cached copy is still current.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` compares at whole
/// second resolution since HTTP dates carry no fraction.
pub fn not_modified(headers: &HeaderMap, etag: &str, last_modified: DateTime<Utc>) -> bool {
    if let Some(tags) = header_str(headers, header::IF_NONE_MATCH) {
        return tags
            .split(',')
            .any(|tag| tag.trim() == "*" || opaque_tag(tag) == etag);
    }
    match header_str(headers, header::IF_MODIFIED_SINCE).and_then(parse_http_date) {
        Some(since) => last_modified.timestamp() <= since.timestamp(),
        None => false,
    }
}

/// Whether an `If-Range` validator, if any, still matches the content.
fn range_applies(headers: &HeaderMap, etag: &str, last_modified: DateTime<Utc>) -> bool {
    let Some(validator) = header_str(headers, header::IF_RANGE) else {
        return true;
    };
    if validator.starts_with('"') || !validator.contains(' ') {
        return !validator.starts_with("W/") && opaque_tag(validator) == etag;
    }
    parse_http_date(validator).is_some_and(|date| date.timestamp() == last_modified.timestamp())
}

/// Resolve a `Range` request against content of `size` bytes.
pub fn read_plan(headers: &HeaderMap, size: u64, etag: &str, last_modified: DateTime<Utc>) -> ReadPlan {
    let Some(raw) = header_str(headers, header::RANGE) else {
        return ReadPlan::Full;
    };
    if raw.is_empty() || !range_applies(headers, etag, last_modified) {
        return ReadPlan::Full;
    }
    let Some(spec) = raw.strip_prefix("bytes=") else {
        return ReadPlan::Unsatisfiable;
    };
    if spec.contains(',') {
        return ReadPlan::Full;
    }
    match parse_range(spec.trim(), size) {
        Some(range) => ReadPlan::Partial(range),
        None => ReadPlan::Unsatisfiable,
    }
}

fn parse_range(spec: &str, size: u64) -> Option<ByteRange> {
    let (start, end) = spec.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        // Suffix form: the final `end` bytes.
        let suffix = end.parse::<u64>().ok()?;
        if suffix == 0 || size == 0 {
            return None;
        }
        let suffix = suffix.min(size);
        return Some(ByteRange {
            start: size - suffix,
            end: size - 1,
        });
    }

    let start = start.parse::<u64>().ok()?;
    if start >= size {
        return None;
    }
    let end = if end.is_empty() {
        size - 1
    } else {
        let end = end.parse::<u64>().ok()?;
        if end < start {
            return None;
        }
        end.min(size - 1)
    };
    Some(ByteRange { start, end })
}
