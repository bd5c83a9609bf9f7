use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failures that can abort a page request.
///
/// None of these are retried. A request that hits one of them is answered
/// with a plain 500 and the details only go to the log.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Missing or invalid configuration (connection string, lookup table).
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data does not have the expected shape.
    #[error("Malformed data in {origin}: {message}")]
    MalformedData { origin: String, message: String },

    /// Document store or speech provider failed.
    #[error("{service} error: {message}")]
    ExternalService {
        service: &'static str,
        message: String,
    },

    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),
}

impl SiteError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        SiteError::ExternalService {
            service: "Document store",
            message: err.to_string(),
        }
    }

    pub fn speech(err: impl std::fmt::Display) -> Self {
        SiteError::ExternalService {
            service: "Speech provider",
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for SiteError {
    fn from(err: rusqlite::Error) -> Self {
        SiteError::store(err)
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", anyhow::Error::new(self));
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub type SiteResult<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_as_generic_500() {
        let resp = SiteError::speech("quota exceeded").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_external_service_message_names_service() {
        let err = SiteError::store("connection refused");
        assert_eq!(err.to_string(), "Document store error: connection refused");
    }
}
