use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use ent_registry::RegistryError;
use ent_store::StoreError;
use ent_types::ErrorKind;
use thiserror::Error;

use crate::response::ResponseError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => ErrorKind::Storage,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        status_for(self.kind())
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    if kind.is_not_found() {
        StatusCode::NOT_FOUND
    } else if kind.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures carry paths and OS detail; clients only see the kind.
        let error = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            self.kind().to_string()
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };
        let body = ResponseError {
            code: status.as_u16(),
            error,
            description: status.canonical_reason().unwrap_or_default().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ErrorKind::BucketNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::FileNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::InvalidParam), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::EmptyKey), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::EmptyBucket), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::EmptySource), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Storage), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn wrapped_errors_keep_their_kind() {
        let err = ServerError::from(RegistryError::BucketNotFound { name: "x".into() });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err = ServerError::from(StoreError::InvalidParam("limit".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServerError::Internal("join".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
