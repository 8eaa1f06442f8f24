use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use ent_store::{File, FileMeta};
use futures::TryStreamExt;
use serde::Deserialize;
use tokio_util::io::{ReaderStream, StreamReader, SyncIoBridge};

use crate::content::{self, ReadPlan};
use crate::error::{ServerError, ServerResult};
use crate::response::{
    nanos, ResponseBucketList, ResponseCreated, ResponseDeleted, ResponseFile, ResponseFileList,
};
use crate::service::{file_document, Ent, ListOptions};

/// Shared state handed to every handler.
pub type AppState = Arc<Ent>;

/// Pipe capacity between the blocking reader and the response body.
const STREAM_CHUNK: usize = 64 * 1024;

/// Query parameters of a file listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub prefix: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

/// Run blocking storage work off the async executor.
async fn blocking<T, F>(work: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

fn blob_headers(hash: &str, last_modified: DateTime<Utc>) -> [(header::HeaderName, String); 2] {
    [
        (header::ETAG, hash.to_string()),
        (
            header::LAST_MODIFIED,
            last_modified.to_rfc3339_opts(SecondsFormat::Nanos, true),
        ),
    ]
}

/// `GET /`
pub async fn list_buckets(State(ent): State<AppState>) -> ServerResult<Json<ResponseBucketList>> {
    let start = Instant::now();
    let buckets = blocking(move || ent.buckets()).await?;
    Ok(Json(ResponseBucketList {
        count: buckets.len(),
        duration: nanos(start.elapsed()),
        buckets,
    }))
}

/// `GET /{bucket}`
pub async fn list_files(
    State(ent): State<AppState>,
    Path(bucket): Path<String>,
    Query(query): Query<ListQuery>,
) -> ServerResult<Json<ResponseFileList>> {
    let start = Instant::now();
    let (bucket, files) = blocking(move || {
        let options = ListOptions::from_params(
            query.prefix.as_deref(),
            query.limit.as_deref(),
            query.sort.as_deref(),
        )?;
        let (bucket, mut files) = ent.list(&bucket, &options)?;
        let documents = files
            .iter_mut()
            .map(|file| file_document(&bucket, file.as_mut(), false))
            .collect::<ServerResult<Vec<ResponseFile>>>()?;
        Ok((bucket, documents))
    })
    .await?;

    Ok(Json(ResponseFileList {
        count: files.len(),
        duration: nanos(start.elapsed()),
        bucket,
        files,
    }))
}

/// `POST /{bucket}/{key}`
///
/// The body is streamed into the storage engine as it arrives. A client that
/// disconnects mid-upload fails the create and nothing is published.
pub async fn create_file(
    State(ent): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    body: Body,
) -> ServerResult<Response> {
    let start = Instant::now();
    let stream = body.into_data_stream().map_err(io::Error::other);
    let mut src = SyncIoBridge::new(StreamReader::new(stream));
    let document = blocking(move || {
        let (bucket, mut file) = ent.create(&bucket, &key, &mut src)?;
        file_document(&bucket, file.as_mut(), true)
    })
    .await?;

    tracing::info!(bucket = %document.bucket.name, key = %document.key, "file created");
    let headers = blob_headers(document.hash.as_deref().unwrap_or_default(), document.last_modified);
    let reply = ResponseCreated {
        duration: nanos(start.elapsed()),
        file: document,
    };
    Ok((StatusCode::CREATED, headers, Json(reply)).into_response())
}

/// An opened blob with everything needed to answer a read.
struct Blob {
    file: Box<dyn File>,
    etag: String,
    last_modified: DateTime<Utc>,
    size: u64,
}

async fn open_blob(ent: AppState, bucket: String, key: String) -> ServerResult<Blob> {
    blocking(move || {
        let (bucket, mut file) = ent.open(&bucket, &key)?;
        let document = file_document(&bucket, file.as_mut(), true)?;
        let size = file.size()?;
        Ok(Blob {
            file,
            etag: document.hash.unwrap_or_default(),
            last_modified: document.last_modified,
            size,
        })
    })
    .await
}

/// Stream `length` bytes of `file` from `offset` into a response body.
///
/// The copy runs on the blocking pool and stops as soon as the client goes
/// away and the pipe closes.
fn stream_body(mut file: Box<dyn File>, offset: u64, length: u64) -> Body {
    let (writer, reader) = tokio::io::duplex(STREAM_CHUNK);
    let mut sink = SyncIoBridge::new(writer);
    tokio::task::spawn_blocking(move || {
        let copied = file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| io::copy(&mut Read::take(&mut file, length), &mut sink));
        match copied {
            Ok(n) if n == length => {}
            Ok(n) => tracing::warn!(key = file.key(), sent = n, expected = length, "blob shrank while streaming"),
            Err(e) => tracing::debug!(key = file.key(), error = %e, "blob stream ended early"),
        }
    });
    Body::from_stream(ReaderStream::new(reader))
}

/// `GET /{bucket}/{key}`
///
/// Honours `If-None-Match`, `If-Modified-Since`, `If-Range` and a single
/// `bytes=` range.
pub async fn get_file(
    State(ent): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    request_headers: HeaderMap,
) -> ServerResult<Response> {
    let blob = open_blob(ent, bucket, key).await?;
    let headers = blob_headers(&blob.etag, blob.last_modified);

    if content::not_modified(&request_headers, &blob.etag, blob.last_modified) {
        return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
    }

    let (status, offset, length, content_range) =
        match content::read_plan(&request_headers, blob.size, &blob.etag, blob.last_modified) {
            ReadPlan::Full => (StatusCode::OK, 0, blob.size, None),
            ReadPlan::Partial(range) => (
                StatusCode::PARTIAL_CONTENT,
                range.start,
                range.length(),
                Some(range.content_range(blob.size)),
            ),
            ReadPlan::Unsatisfiable => {
                return Ok((
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    headers,
                    [(header::CONTENT_RANGE, format!("bytes */{}", blob.size))],
                )
                    .into_response());
            }
        };

    let mut response = (
        status,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::ACCEPT_RANGES, "bytes".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        headers,
        stream_body(blob.file, offset, length),
    )
        .into_response();
    if let Some(value) = content_range.and_then(|v| HeaderValue::from_str(&v).ok()) {
        response.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    Ok(response)
}

/// `HEAD /{bucket}/{key}`: status and blob headers only.
pub async fn head_file(
    State(ent): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    request_headers: HeaderMap,
) -> Response {
    match open_blob(ent, bucket, key).await {
        Ok(blob) => {
            let headers = blob_headers(&blob.etag, blob.last_modified);
            if content::not_modified(&request_headers, &blob.etag, blob.last_modified) {
                return (StatusCode::NOT_MODIFIED, headers).into_response();
            }
            (
                StatusCode::OK,
                [
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                    (header::CONTENT_LENGTH, blob.size.to_string()),
                ],
                headers,
            )
                .into_response()
        }
        Err(e) => e.status().into_response(),
    }
}

/// `DELETE /{bucket}/{key}`
pub async fn delete_file(
    State(ent): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> ServerResult<Json<ResponseDeleted>> {
    let start = Instant::now();
    let document = blocking(move || ent.delete(&bucket, &key)).await?;
    tracing::info!(bucket = %document.bucket.name, key = %document.key, "file deleted");
    Ok(Json(ResponseDeleted {
        duration: nanos(start.elapsed()),
        file: document,
    }))
}
