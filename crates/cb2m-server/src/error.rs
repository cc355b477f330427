//! Error types for the cb2m server.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cb2m_core::CompilerResult;
use cb2m_core::classify::Rejection;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request the server does not accept.
    #[error("{0}")]
    BadRequest(String),

    /// No such route, snippet or revision.
    #[error("{0}")]
    NotFound(String),

    /// The classifier did not accept the revision's source.
    #[error("{0}")]
    RejectedSource(Rejection),

    /// javac exited with a non-zero code.
    #[error("{}", .0.diagnostics)]
    CompileFailed(CompilerResult),

    /// Core pipeline error.
    #[error("Core error: {0}")]
    Core(#[from] cb2m_core::Error),

    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The snippet snapshot could not be loaded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RejectedSource(_)
            | Self::CompileFailed(_)
            | Self::Core(_)
            | Self::Io { .. }
            | Self::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::CompileFailed(result) => {
                tracing::warn!("Compilation failed with exit code {}", result.exit_code);
                serde_json::json!({
                    "error": result.diagnostics,
                    "exitCode": result.exit_code,
                })
            }
            Self::BadRequest(_) | Self::NotFound(_) | Self::RejectedSource(_) => {
                tracing::info!("Responding {}: {}", status.as_u16(), self);
                serde_json::json!({ "error": self.to_string() })
            }
            _ => {
                tracing::error!("Request failed: {}", self);
                serde_json::json!({ "error": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(
            ServerError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::RejectedSource(Rejection::UnrecognizedShape).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::Core(cb2m_core::Error::PackagingFailed("empty".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_compile_failure_message_is_diagnostics() {
        let err = ServerError::CompileFailed(CompilerResult {
            exit_code: 1,
            diagnostics: "Snippet.java:1: error".to_string(),
        });
        assert_eq!(err.to_string(), "Snippet.java:1: error");
    }
}
