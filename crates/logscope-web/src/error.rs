//! Error types for the web server.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

use logscope_logs::{BufferError, ScanError};

use crate::render;

/// Result type alias for request handlers.
pub type WebResult<T> = Result<T, WebError>;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// Failed to bind to the listen address.
    #[error("failed to bind to {0}")]
    Bind(SocketAddr, #[source] std::io::Error),

    /// The rule configuration file could not be read.
    #[error("reading config {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rule configuration file is not valid JSON of the expected shape.
    #[error("config {} is malformed", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The requested directory name cannot be used.
    #[error("invalid directory name {0:?}")]
    InvalidDir(String),

    /// The directory scan failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidDir(_) | Self::Scan(ScanError::Buffer(BufferError::ZeroLimit)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Scan(ScanError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                StatusCode::NOT_FOUND
            }
            Self::Bind(_, _)
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::Scan(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = error_chain(&self);
        warn!(status = %status, error = %message, "request failed");
        (status, Html(render::message_page(&message))).into_response()
    }
}

/// Join an error with its sources into one readable line
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
