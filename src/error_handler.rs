//! Central mapping from handler failures to responses.

use std::sync::Arc;

use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::context::Context;
use crate::error::HttpError;
use crate::handler::BoxError;

/// Receives every error returned by a composed handler chain.
///
/// Install one with [`App::set_error_handler`](crate::App::set_error_handler).
pub type ErrorHandler = Arc<dyn Fn(BoxError, &mut Context) + Send + Sync>;

/// The error handler an [`App`](crate::App) starts with.
///
/// - Does nothing if the handler already committed a response.
/// - An [`HttpError`] is answered with its own status and message. If its
///   internal cause is itself an `HttpError`, the inner one is reported.
/// - Anything else becomes `500 Internal Server Error` with the generic
///   reason phrase; the real cause is only logged.
///
/// The body is always `{"message": "..."}`.
pub fn default_error_handler(err: BoxError, ctx: &mut Context) {
    if ctx.response().is_committed() {
        return;
    }

    let (code, message) = match err.downcast::<HttpError>() {
        Ok(http) => match http.internal().and_then(|cause| cause.downcast_ref::<HttpError>()) {
            Some(inner) => (inner.code(), inner.message().to_owned()),
            None => (http.code(), http.message().to_owned()),
        },
        Err(other) => {
            error!(error = %other, path = ctx.path(), "unhandled handler error");
            let code = StatusCode::INTERNAL_SERVER_ERROR;
            (code, code.canonical_reason().unwrap_or_default().to_owned())
        }
    };

    if let Err(e) = ctx.json(code, &json!({ "message": message })) {
        error!(error = %e, "failed to write error response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handled(err: BoxError) -> Context {
        let mut ctx = Context::default();
        default_error_handler(err, &mut ctx);
        ctx
    }

    #[test]
    fn unknown_error_is_internal_server_error() {
        let ctx = handled("database went away".into());
        assert_eq!(ctx.response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.response().text(), r#"{"message":"Internal Server Error"}"#);
    }

    #[test]
    fn http_error_is_surfaced_verbatim() {
        let ctx = handled(HttpError::with_message(StatusCode::BAD_REQUEST, "name is required").into());
        assert_eq!(ctx.response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.response().text(), r#"{"message":"name is required"}"#);
    }

    #[test]
    fn wrapped_http_error_wins() {
        let inner = HttpError::with_message(StatusCode::NOT_FOUND, "no such user");
        let outer = HttpError::new(StatusCode::INTERNAL_SERVER_ERROR).with_internal(inner);
        let ctx = handled(outer.into());
        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
        assert_eq!(ctx.response().text(), r#"{"message":"no such user"}"#);
    }

    #[test]
    fn plain_internal_cause_is_not_unwrapped() {
        let err = HttpError::new(StatusCode::CONFLICT).with_internal("duplicate key");
        let ctx = handled(err.into());
        assert_eq!(ctx.response().status(), StatusCode::CONFLICT);
        assert_eq!(ctx.response().text(), r#"{"message":"Conflict"}"#);
    }

    #[test]
    fn committed_response_is_left_alone() {
        let mut ctx = Context::default();
        ctx.text(StatusCode::ACCEPTED, "partial").unwrap();
        default_error_handler(HttpError::new(StatusCode::BAD_REQUEST).into(), &mut ctx);
        assert_eq!(ctx.response().status(), StatusCode::ACCEPTED);
        assert_eq!(ctx.response().text(), "partial");
    }
}
