//! Error types.
//!
//! Two families live here and they never mix:
//!
//! - [`Error`] is returned synchronously while the application is being
//!   assembled (bad method, conflicting route, unsafe group path) or while the
//!   server binds its socket.
//! - [`HttpError`] is what a handler or middleware returns at request time when
//!   it wants a specific status and message to reach the client. It travels as
//!   a [`BoxError`] and is decoded by the
//!   [error handler](crate::error_handler::default_error_handler).

use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::handler::BoxError;
use crate::method::Method;

/// Setup and infrastructure failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("[{method}] {path} is already used")]
    RouteConflict { method: Method, path: String },

    #[error("{path}: parametric segment `{declared}` conflicts with existing `{existing}`")]
    ParamConflict { path: String, existing: String, declared: String },

    #[error("path traversal is not allowed: {0}")]
    PathTraversal(String),

    #[error("path length {0} exceeds the limit")]
    PathTooLong(usize),

    #[error("invalid socket address: {0}")]
    InvalidAddress(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure carrying an HTTP status and a client-facing message.
///
/// ```rust
/// use http::StatusCode;
/// use sprout::HttpError;
///
/// let err = HttpError::new(StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "code=400, message=Bad Request");
/// ```
#[derive(Debug)]
pub struct HttpError {
    code: StatusCode,
    message: String,
    internal: Option<BoxError>,
}

impl HttpError {
    /// An error whose message is the status's canonical reason phrase.
    pub fn new(code: StatusCode) -> Self {
        let message = code.canonical_reason().unwrap_or_default().to_owned();
        Self { code, message, internal: None }
    }

    pub fn with_message(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), internal: None }
    }

    /// Attaches the underlying cause. It is logged, never sent to the client.
    pub fn with_internal(mut self, cause: impl Into<BoxError>) -> Self {
        self.internal = Some(cause.into());
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn internal(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.internal.as_deref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={}, message={}", self.code.as_u16(), self.message)?;
        if let Some(internal) = &self.internal {
            write!(f, ", internal={internal}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.internal.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
