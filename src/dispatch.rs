//! Per-request dispatch.
//!
//! ```text
//! acquire ctx ─► request id ─► method trie ─► decode path ─► search
//!                                              │
//!                      no handler ◄────────────┤ 404, no middleware
//!                                              ▼
//!                 params ─► search middlewares ─► chain ─► call ─► error handler
//!                                                                     │
//! release ctx ◄─ take response ◄───────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderValue, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::app::App;
use crate::context::{Context, REQUEST_ID_HEADER, REQUEST_ID_KEY};
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::chain;
use crate::params::ParamKind;
use crate::response::Response;

impl App {
    /// Serves one request and returns its buffered response.
    ///
    /// Never fails: a miss becomes `404`, an unsupported method `405`, and a
    /// handler error whatever the error handler makes of it.
    pub async fn dispatch(&self, request: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Response {
        let mut ctx = self.pool.acquire(request, remote_addr);
        self.serve_context(&mut ctx).await;
        let response = ctx.take_response();
        self.pool.release(ctx);
        response
    }

    /// Dispatches an in-memory request, no socket involved.
    ///
    /// ```rust
    /// # use http::StatusCode;
    /// # use sprout::{App, Method, handler_fn};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let mut app = App::new();
    /// app.get("/ping", handler_fn(|ctx| Box::pin(async move { ctx.text(StatusCode::OK, "pong") })))
    ///     .unwrap();
    ///
    /// let res = app.play(Method::Get, "/ping", "").await.unwrap();
    /// assert_eq!(res.text(), "pong");
    /// # }
    /// ```
    pub async fn play(&self, method: Method, url: &str, body: impl Into<Bytes>) -> Result<Response, http::Error> {
        let request = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url)
            .body(body.into())?;
        Ok(self.dispatch(request, None).await)
    }

    async fn serve_context(&self, ctx: &mut Context) {
        if self.options.with_request_id {
            assign_request_id(ctx);
        }

        let Some(trie) = self.router.routes_by_method(ctx.method()) else {
            debug!(method = %ctx.method(), "method not allowed");
            ctx.write_header(StatusCode::METHOD_NOT_ALLOWED);
            return;
        };

        // Routes are registered decoded, so `/users/john%20doe` captures
        // `john doe`. Invalid UTF-8 becomes U+FFFD rather than a 400.
        let path = percent_decode_str(ctx.uri().path()).decode_utf8_lossy().into_owned();
        let (route, params) = trie.search(&path);
        let Some(handler) = route.and_then(|route| route.handler()) else {
            debug!(method = %ctx.method(), path = %path, "no route");
            ctx.write_header(StatusCode::NOT_FOUND);
            return;
        };

        ctx.set_path(&path);
        ctx.set_proxy_trust(Arc::clone(&self.proxy_trust));
        if let Some(query) = ctx.uri().query().map(str::to_owned) {
            ctx.set_query_params(&query, self.options.max_query_params);
        }
        for unit in params {
            ctx.set_param(ParamKind::Path, unit);
        }

        let handler = chain(self.middlewares.search(&path), Arc::clone(handler));
        if let Err(err) = handler.call(ctx).await {
            (self.error_handler)(err, ctx);
        }
    }
}

fn assign_request_id(ctx: &mut Context) {
    let id = ctx.request_id();
    match HeaderValue::from_str(&id) {
        Ok(value) => ctx.set_response_header(REQUEST_ID_HEADER, value),
        Err(_) => warn!(request_id = %id, "request id is not a valid header value"),
    }
    ctx.set(REQUEST_ID_KEY, id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::ip::X_FORWARDED_FOR;
    use crate::options::Options;

    #[tokio::test]
    async fn unsupported_method_is_405() {
        let app = App::new();
        let request = http::Request::builder()
            .method(http::Method::from_bytes(b"PURGE").unwrap())
            .uri("/")
            .body(Bytes::new())
            .unwrap();
        let res = app.dispatch(request, None).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn contexts_return_to_the_pool() {
        let mut app = App::new();
        app.get("/", handler_fn(|ctx| Box::pin(async move { ctx.no_content() }))).unwrap();

        app.play(Method::Get, "/", "").await.unwrap();
        app.play(Method::Get, "/missing", "").await.unwrap();
        assert_eq!(app.pool.idle(), 1);
    }

    #[tokio::test]
    async fn request_id_can_be_disabled() {
        let app = App::with_options(Options { with_request_id: false, ..Options::default() });
        let res = app.play(Method::Get, "/", "").await.unwrap();
        assert!(res.header(REQUEST_ID_HEADER).is_none());
    }

    #[tokio::test]
    async fn remote_addr_reaches_the_handler() {
        let mut app = App::new();
        app.get(
            "/ip",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let ip = ctx.remote_addr().map(|a| a.ip().to_string()).unwrap_or_default();
                    ctx.text(StatusCode::OK, ip)
                })
            }),
        )
        .unwrap();

        let request = http::Request::builder().uri("/ip").body(Bytes::new()).unwrap();
        let res = app.dispatch(request, Some("10.0.0.7:4000".parse().unwrap())).await;
        assert_eq!(res.text(), "10.0.0.7");
    }

    #[tokio::test]
    async fn trusted_proxy_ranges_reach_the_context() {
        let mut app = App::new();
        app.set_trust_private_ip(false);
        app.trust_proxy_range("198.51.100.0/24".parse().unwrap());
        app.get(
            "/ip",
            handler_fn(|ctx| {
                Box::pin(async move {
                    let ip = ctx.real_ip().map(|ip| ip.to_string()).unwrap_or_default();
                    ctx.text(StatusCode::OK, ip)
                })
            }),
        )
        .unwrap();

        let request = http::Request::builder()
            .uri("/ip")
            .header(X_FORWARDED_FOR, "203.0.113.5, 10.0.0.3, 198.51.100.2")
            .body(Bytes::new())
            .unwrap();
        let res = app.dispatch(request, Some("198.51.100.1:443".parse().unwrap())).await;
        assert_eq!(res.text(), "10.0.0.3");
        assert!(!app.config().trust_private_ip);
        assert_eq!(app.config().trusted_proxies.len(), 1);
    }
}
