//! # sprout
//!
//! A small HTTP framework built around two tries.
//!
//! - The **route trie**: one per HTTP method, one edge per path segment.
//!   Static segments beat parametric ones (`/users/active` before
//!   `/users/:id`), and lookup cost grows with path depth only.
//! - The **middleware trie**: middleware hangs off path prefixes. A request
//!   collects everything registered along its path, root first, and runs it
//!   outermost-first around the matched handler.
//!
//! Around them sit a pooled request [`Context`], a central error handler and
//! a hyper-based [`Server`] with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use sprout::{App, HttpError, Server, handler_fn, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sprout::Error> {
//!     let mut app = App::new();
//!     app.register(middleware::trace());
//!
//!     app.get("/users/:id", handler_fn(|ctx| Box::pin(async move {
//!         let id = ctx.path_param("id").unwrap_or_default().to_owned();
//!         ctx.json(StatusCode::OK, &serde_json::json!({ "id": id }))
//!     })))?;
//!
//!     app.post("/users", handler_fn(|ctx| Box::pin(async move {
//!         if ctx.body().is_empty() {
//!             return Err(HttpError::with_message(StatusCode::BAD_REQUEST, "empty body").into());
//!         }
//!         ctx.no_content()
//!     })))?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod app;
mod context;
mod dispatch;
mod error;
mod handler;
mod ip;
mod leaf;
mod method;
mod options;
mod params;
mod pool;
mod response;
mod route;
mod router;
mod server;
mod trie;

pub mod error_handler;
pub mod middleware;
pub mod path;

pub use app::App;
pub use context::{Context, REQUEST_ID_HEADER, REQUEST_ID_KEY};
pub use error::{Error, HttpError};
pub use handler::{BoxError, BoxFuture, BoxedHandler, FnHandler, Handler, HandlerResult, handler_fn};
pub use ip::{ProxyTrust, X_FORWARDED_FOR, X_REAL_IP};
pub use ipnet::IpNet;
pub use leaf::Leaf;
pub use method::Method;
pub use options::Options;
pub use params::{HttpParams, ParamKind, ParamUnit};
pub use pool::ContextPool;
pub use response::Response;
pub use route::{Route, RouteTrie};
pub use router::Router;
pub use server::Server;
pub use trie::{Linear, PARAM_PREFIX};
