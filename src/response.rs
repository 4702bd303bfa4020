//! Buffered outgoing response.
//!
//! Handlers never touch the socket. They fill a [`Response`] held by the
//! request [`Context`](crate::Context); the dispatcher converts it into an
//! `http::Response` once the middleware chain has returned.
//!
//! The first status write *commits* the response. After that the status is
//! frozen, which is how the error handler knows a handler already answered.

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue, IntoHeaderName};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            committed: false,
        }
    }
}

impl Response {
    /// Sets the status and commits. A second call is ignored with a warning.
    pub fn write_header(&mut self, code: StatusCode) {
        if self.committed {
            warn!(current = %self.status, ignored = %code, "response has already been committed");
            return;
        }
        self.status = code;
        self.committed = true;
    }

    /// Sets the status without committing; the next body write commits it.
    pub fn set_status(&mut self, code: StatusCode) {
        if !self.committed {
            self.status = code;
        }
    }

    /// Appends to the body, committing the current status on the first write.
    pub fn write(&mut self, chunk: &[u8]) {
        self.committed = true;
        self.body.extend_from_slice(chunk);
    }

    /// Sets a header only if it is not already present.
    pub fn set_header<K: IntoHeaderName>(&mut self, key: K, value: HeaderValue) {
        if let header::Entry::Vacant(slot) = self.headers.entry(key) {
            slot.insert(value);
        }
    }

    /// Replaces any existing values for `key`.
    pub fn insert_header<K: IntoHeaderName>(&mut self, key: K, value: HeaderValue) {
        self.headers.insert(key, value);
    }

    pub fn add_header<K: IntoHeaderName>(&mut self, key: K, value: HeaderValue) {
        self.headers.append(key, value);
    }

    pub fn header<K: header::AsHeaderName>(&self, key: K) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, lossily. Handy in tests.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Back to a fresh, uncommitted `200 OK` with no headers and no body.
    /// Header and body buffers keep their capacity.
    pub(crate) fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
        self.committed = false;
    }

    /// Moves the buffered response out, leaving a reset one behind.
    pub(crate) fn take(&mut self) -> Response {
        std::mem::take(self)
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let Response { status, headers, body, committed: _ } = self;
        let mut res = http::Response::new(Full::new(Bytes::from(body)));
        *res.status_mut() = status;
        *res.headers_mut() = headers;
        res
    }

    pub(crate) fn content_type(&mut self, value: &'static str) {
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static(value));
    }
}

pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
