//! The application value: routes, middleware, context pool and options.

use std::sync::Arc;

use ipnet::IpNet;

use crate::context::Context;
use crate::error::Error;
use crate::error_handler::{ErrorHandler, default_error_handler};
use crate::handler::{BoxError, Handler};
use crate::ip::ProxyTrust;
use crate::leaf::Leaf;
use crate::method::Method;
use crate::middleware::{Middleware, MiddlewareNode, MiddlewareTree};
use crate::options::Options;
use crate::path;
use crate::pool::ContextPool;
use crate::router::Router;

/// An application under construction, and later the thing that serves it.
///
/// Everything is registered through `&mut self` before the app is handed to
/// [`Server::serve`](crate::Server::serve). Apps are plain values: several
/// can live in one process, which is what the tests do.
///
/// ```rust
/// use http::StatusCode;
/// use sprout::{App, handler_fn, middleware};
///
/// let mut app = App::new();
/// app.register(middleware::trace());
/// app.get("/users/:id", handler_fn(|ctx| Box::pin(async move {
///     let id = ctx.path_param("id").unwrap_or_default().to_owned();
///     ctx.text(StatusCode::OK, id)
/// })))
/// .unwrap();
/// ```
pub struct App {
    pub(crate) router: Router,
    pub(crate) middlewares: MiddlewareTree,
    pub(crate) pool: ContextPool,
    pub(crate) options: Options,
    pub(crate) proxy_trust: Arc<ProxyTrust>,
    pub(crate) error_handler: ErrorHandler,
}

impl App {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            router: Router::new(),
            middlewares: MiddlewareTree::new(),
            pool: ContextPool::new(options.pool_capacity),
            proxy_trust: Arc::new(ProxyTrust::from(&options)),
            options,
            error_handler: Arc::new(default_error_handler),
        }
    }

    pub fn config(&self) -> &Options {
        &self.options
    }

    /// Whether private-range hops in `X-Forwarded-For` are trusted proxies.
    pub fn set_trust_private_ip(&mut self, flag: bool) {
        self.options.trust_private_ip = flag;
        self.proxy_trust = Arc::new(ProxyTrust::from(&self.options));
    }

    /// Trusts `range` as proxies when resolving [`Context::real_ip`].
    pub fn trust_proxy_range(&mut self, range: IpNet) {
        self.options.trusted_proxies.push(range);
        self.proxy_trust = Arc::new(ProxyTrust::from(&self.options));
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn middlewares(&self) -> &MiddlewareTree {
        &self.middlewares
    }

    // ── Routes ───────────────────────────────────────────────────────────────

    /// Registers a handler for a method given by name. See [`Router::add`].
    pub fn add(&mut self, method: &str, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.add(method, path, handler)
    }

    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.on(method, path, handler)
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.get(path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.post(path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.put(path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.patch(path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.delete(path, handler)
    }

    pub fn head(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.head(path, handler)
    }

    pub fn options(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.options(path, handler)
    }

    pub fn trace(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.trace(path, handler)
    }

    pub fn connect(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.router.connect(path, handler)
    }

    /// Whether a request for `method` and `path` would reach a handler.
    pub fn check(&self, method: &http::Method, path: &str) -> bool {
        self.router
            .routes_by_method(method)
            .and_then(|trie| trie.search(path).0)
            .is_some_and(|route| route.handler().is_some())
    }

    /// Every registered `(method, path)`, sorted.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.router.routes()
    }

    // ── Middleware ───────────────────────────────────────────────────────────

    /// Adds middleware that runs for every routed request.
    pub fn register(&mut self, middleware: impl Middleware) -> &mut Self {
        self.middlewares.register(middleware.into_boxed_middleware());
        self
    }

    /// Adds middleware that runs for every routed request whose path starts
    /// with the segments of `path`, and returns that node for deeper scopes.
    pub fn combine(&mut self, path: &str, middleware: impl Middleware) -> MiddlewareNode<'_> {
        self.middlewares.insert(path, [middleware.into_boxed_middleware()])
    }

    // ── Composition ──────────────────────────────────────────────────────────

    /// Opens a route group under `base`.
    ///
    /// ```rust
    /// use http::StatusCode;
    /// use sprout::{App, handler_fn};
    ///
    /// let mut app = App::new();
    /// app.leaf("/users", |users| {
    ///     users.get("/", handler_fn(|ctx| Box::pin(async move { ctx.text(StatusCode::OK, "all") })))?;
    ///     users.get("/:id", handler_fn(|ctx| Box::pin(async move { ctx.no_content() })))
    /// })
    /// .unwrap();
    /// assert_eq!(app.routes().len(), 2);
    /// ```
    pub fn leaf<F>(&mut self, base: &str, build: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Leaf<'_>) -> Result<(), Error>,
    {
        let base = path::join(base, "")?;
        build(&mut Leaf::new(self, base))
    }

    /// Moves every route and middleware of `other` into `self`.
    ///
    /// Stops at the first route that conflicts with one already registered
    /// here; routes merged before it stay merged.
    pub fn merge(&mut self, other: App) -> Result<(), Error> {
        for method in Method::ALL {
            for (path, handler) in other.router.linearize(method) {
                self.router.on(method, &path, handler)?;
            }
        }
        for entry in other.middlewares.linearize() {
            self.middlewares.insert(&entry.path, [entry.value]);
        }
        Ok(())
    }

    /// Replaces the [default error handler](default_error_handler).
    pub fn set_error_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(BoxError, &mut Context) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
