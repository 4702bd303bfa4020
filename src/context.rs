//! Request-scoped context.
//!
//! One [`Context`] carries everything a handler sees: the request head and
//! body, captured parameters, a typed key-value store shared along the
//! middleware chain, and the buffered [`Response`].
//!
//! Contexts are recycled through the [`ContextPool`](crate::pool::ContextPool).
//! [`Context::reset`] is the only thing standing between one request's data
//! and the next request, so it destructures `Self` without `..`: adding a
//! field and forgetting to clear it is a compile error, not a leak.

use std::any::Any;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bytes::Bytes;
use http::header::{AsHeaderName, HeaderMap, HeaderValue};
use http::{StatusCode, Uri};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::handler::HandlerResult;
use crate::ip::{ProxyTrust, X_FORWARDED_FOR, X_REAL_IP};
use crate::params::{HttpParams, ParamKind, ParamUnit};
use crate::response::{APPLICATION_JSON, Response, TEXT_PLAIN};

/// Store key under which the dispatcher keeps the request id.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Request header read (and response header written) for correlation ids.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct Context {
    method: http::Method,
    uri: Uri,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    proxy_trust: Option<Arc<ProxyTrust>>,
    params: HttpParams,
    store: HashMap<String, Box<dyn Any + Send + Sync>>,
    response: Response,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            method: http::Method::GET,
            uri: Uri::default(),
            path: String::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
            proxy_trust: None,
            params: HttpParams::default(),
            store: HashMap::new(),
            response: Response::default(),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("store_keys", &self.store.keys().collect::<Vec<_>>())
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Restores the state of a freshly constructed context.
    ///
    /// Maps and buffers are cleared in place so their capacity survives.
    pub fn reset(&mut self) {
        let Self { method, uri, path, headers, body, remote_addr, proxy_trust, params, store, response } = self;
        *method = http::Method::GET;
        *uri = Uri::default();
        path.clear();
        headers.clear();
        *body = Bytes::new();
        *remote_addr = None;
        *proxy_trust = None;
        params.clear();
        store.clear();
        response.reset();
    }

    /// Loads a request head and body into a reset context.
    pub(crate) fn bind(&mut self, request: http::Request<Bytes>, remote_addr: Option<SocketAddr>) {
        let (parts, body) = request.into_parts();
        self.method = parts.method;
        self.uri = parts.uri;
        self.headers = parts.headers;
        self.body = body;
        self.remote_addr = remote_addr;
    }

    // ── Request ──────────────────────────────────────────────────────────────

    pub fn method(&self) -> &http::Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The routed path, set by the dispatcher before the handler runs.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.path.clear();
        self.path.push_str(path);
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request header value, if present and valid ASCII.
    pub fn header<K: AsHeaderName>(&self, key: K) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Address of the connected peer, which may be a proxy.
    pub fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_addr.map(|addr| addr.ip())
    }

    pub(crate) fn set_proxy_trust(&mut self, trust: Arc<ProxyTrust>) {
        self.proxy_trust = Some(trust);
    }

    /// Client address from `X-Forwarded-For`, skipping trusted proxies.
    ///
    /// See [`ProxyTrust::client_ip`]. Falls back to [`remote_ip`](Self::remote_ip).
    pub fn ip_from_xff(&self) -> Option<IpAddr> {
        // A value that is not visible ASCII counts as an unparsable hop.
        let forwarded = self.headers.get_all(X_FORWARDED_FOR).iter().map(|v| v.to_str().unwrap_or(""));
        match &self.proxy_trust {
            Some(trust) => trust.client_ip(forwarded, self.remote_ip()),
            None => ProxyTrust::default().client_ip(forwarded, self.remote_ip()),
        }
    }

    /// Best guess at the client address: a valid `X-Real-Ip`, else
    /// [`ip_from_xff`](Self::ip_from_xff).
    pub fn real_ip(&self) -> Option<IpAddr> {
        self.header(X_REAL_IP)
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
            .or_else(|| self.ip_from_xff())
    }

    // ── Parameters ───────────────────────────────────────────────────────────

    pub fn set_param(&mut self, kind: ParamKind, unit: ParamUnit) {
        self.params.add(kind, unit);
    }

    /// Parses a raw query string into query parameters.
    ///
    /// At most `max` distinct keys are kept, in the order they appear. A
    /// repeated key keeps its first value. Pairs are decoded one at a time,
    /// and once the bound is reached the rest are only counted.
    pub fn set_query_params(&mut self, query: &str, max: usize) {
        let mut pairs = form_urlencoded::parse(query.as_bytes());
        while self.params.query_len() < max {
            let Some((key, value)) = pairs.next() else {
                return;
            };
            if !self.params.contains_query(&key) {
                self.params.add(ParamKind::Query, ParamUnit::new(key.into_owned(), value.into_owned()));
            }
        }

        let dropped = pairs.filter(|(key, _)| !self.params.contains_query(key)).count();
        if dropped > 0 {
            warn!(max, dropped, "too many query parameters");
        }
    }

    /// Path capture by bare name: `/users/:id` → `ctx.path_param("id")`.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.params.path_param(name)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.params.query_param(name)
    }

    pub fn params(&self) -> &HttpParams {
        &self.params
    }

    // ── Store ────────────────────────────────────────────────────────────────

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.store.insert(key.into(), Box::new(value));
    }

    /// Typed read; `None` if the key is absent or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.store.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// The correlation id for this request: the stored one, else the
    /// `X-Request-Id` request header, else a fresh UUID v4.
    pub fn request_id(&self) -> String {
        if let Some(id) = self.get::<String>(REQUEST_ID_KEY) {
            return id.clone();
        }
        if let Some(id) = self.header(REQUEST_ID_HEADER).filter(|id| !id.is_empty()) {
            return id.to_owned();
        }
        Uuid::new_v4().to_string()
    }

    // ── Response ─────────────────────────────────────────────────────────────

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn write_header(&mut self, code: StatusCode) {
        self.response.write_header(code);
    }

    pub fn set_response_header(&mut self, key: &'static str, value: HeaderValue) {
        self.response.insert_header(key, value);
    }

    /// Serializes `value` as the JSON body with status `code`.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) -> HandlerResult {
        let bytes = serde_json::to_vec(value)?;
        self.response.content_type(APPLICATION_JSON);
        self.response.set_status(code);
        self.response.write(&bytes);
        Ok(())
    }

    pub fn text(&mut self, code: StatusCode, body: impl AsRef<str>) -> HandlerResult {
        self.response.content_type(TEXT_PLAIN);
        self.response.set_status(code);
        self.response.write(body.as_ref().as_bytes());
        Ok(())
    }

    pub fn no_content(&mut self) -> HandlerResult {
        self.response.write_header(StatusCode::NO_CONTENT);
        Ok(())
    }

    pub(crate) fn take_response(&mut self) -> Response {
        self.response.take()
    }
}
