//! Method-qualified route registration.
//!
//! One [`RouteTrie`] per supported HTTP method, held in a fixed array indexed
//! by [`Method`]. Lookup is one array index plus one hash lookup per path
//! segment, never a scan over registered routes.

use tracing::warn;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::path;
use crate::route::RouteTrie;

/// The application router.
///
/// Registration happens during setup through `&mut self`; once the router is
/// shared behind an `Arc` only lookups remain reachable.
pub struct Router {
    tries: [RouteTrie; 9],
}

impl Router {
    pub fn new() -> Self {
        Self { tries: Method::ALL.map(RouteTrie::new) }
    }

    /// Registers `handler` for a method given by name, e.g. `"GET"`.
    ///
    /// Fails with [`Error::UnsupportedMethod`] if the name is not one of the
    /// nine supported methods, otherwise behaves like [`on`](Self::on).
    pub fn add(&mut self, method: &str, path: &str, handler: impl Handler) -> Result<(), Error> {
        let method: Method = method.parse()?;
        self.on(method, path, handler)
    }

    /// Registers `handler` at `path` for `method`.
    ///
    /// A single trailing `/` is ignored. Binding a path that already has a
    /// handler fails with [`Error::RouteConflict`] and leaves the first one
    /// in place. The root path is the exception: re-registering `/`
    /// overwrites the previous handler.
    ///
    /// ```rust
    /// # use http::StatusCode;
    /// # use sprout::{Method, Router, handler_fn};
    /// let mut router = Router::new();
    /// router.on(Method::Get, "/users/:id", handler_fn(|ctx| Box::pin(async move {
    ///     let id = ctx.path_param("id").unwrap_or_default().to_owned();
    ///     ctx.text(StatusCode::OK, id)
    /// }))).unwrap();
    /// assert!(router.trie(Method::Get).contains("/users/:id"));
    /// ```
    pub fn on(&mut self, method: Method, path: &str, handler: impl Handler) -> Result<(), Error> {
        let path = path::normalize(path);
        let handler = handler.into_boxed_handler();
        let trie = &mut self.tries[method.index()];

        if path == "/" {
            return trie.replace(path, handler);
        }
        if trie.contains(path) {
            warn!(%method, path, "route already registered");
            return Err(Error::RouteConflict { method, path: path.to_owned() });
        }
        trie.insert(path, handler)
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Delete, path, handler)
    }

    pub fn head(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Head, path, handler)
    }

    pub fn options(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Options, path, handler)
    }

    pub fn trace(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Trace, path, handler)
    }

    pub fn connect(&mut self, path: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Connect, path, handler)
    }

    pub fn trie(&self, method: Method) -> &RouteTrie {
        &self.tries[method.index()]
    }

    /// The trie serving `method`, or `None` for a method outside the
    /// supported nine.
    pub fn routes_by_method(&self, method: &http::Method) -> Option<&RouteTrie> {
        Method::try_from(method).ok().map(|m| self.trie(m))
    }

    /// Every bound `(path, handler)` pair for `method`.
    pub fn linearize(&self, method: Method) -> Vec<(String, BoxedHandler)> {
        self.trie(method).linearize().into_iter().map(|l| (l.path, l.value)).collect()
    }

    /// Every registered `(method, path)`, sorted by method then path.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut routes: Vec<_> = self
            .tries
            .iter()
            .flat_map(|trie| trie.linearize().into_iter().map(move |l| (trie.method(), l.path)))
            .collect();
        routes.sort();
        routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
