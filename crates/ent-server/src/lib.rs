//! HTTP server for Ent.
//!
//! Exposes bucket-scoped blob storage over a small REST API:
//!
//! | Method | Path               | Action                              |
//! |--------|--------------------|-------------------------------------|
//! | GET    | `/`                | list buckets                        |
//! | GET    | `/{bucket}`        | list files (`prefix`, `limit`, `sort`) |
//! | POST   | `/{bucket}/{key}`  | create or replace a file            |
//! | GET    | `/{bucket}/{key}`  | file content, ranges, conditionals  |
//! | HEAD   | `/{bucket}/{key}`  | existence, `ETag`, `Last-Modified`  |
//! | DELETE | `/{bucket}/{key}`  | delete a file                       |

pub mod config;
pub mod content;
pub mod error;
pub mod handler;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use response::{
    ResponseBucketList, ResponseCreated, ResponseDeleted, ResponseError, ResponseFile,
    ResponseFileList,
};
pub use server::EntServer;
pub use service::{file_document, Ent, ListOptions};
