//! Route groups sharing a base path.

use crate::app::App;
use crate::error::Error;
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::Middleware;
use crate::path;

/// A scope handed out by [`App::leaf`].
///
/// Every path given to a leaf is joined onto its base with
/// [`path::join`], so `leaf("/users", ..)` followed by `get("/", ..)`
/// registers `/users`, and `..` anywhere is refused.
pub struct Leaf<'a> {
    app: &'a mut App,
    base: String,
}

impl<'a> Leaf<'a> {
    pub(crate) fn new(app: &'a mut App, base: String) -> Self {
        Self { app, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Adds middleware scoped to the base path.
    pub fn register(&mut self, middleware: impl Middleware) -> &mut Self {
        self.app.combine(&self.base, middleware);
        self
    }

    pub fn on(&mut self, method: Method, sub: &str, handler: impl Handler) -> Result<(), Error> {
        let path = path::join(&self.base, sub)?;
        self.app.on(method, &path, handler)
    }

    pub fn get(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Get, sub, handler)
    }

    pub fn post(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Post, sub, handler)
    }

    pub fn put(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Put, sub, handler)
    }

    pub fn patch(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Patch, sub, handler)
    }

    pub fn delete(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Delete, sub, handler)
    }

    pub fn head(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Head, sub, handler)
    }

    pub fn options(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Options, sub, handler)
    }

    pub fn trace(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Trace, sub, handler)
    }

    pub fn connect(&mut self, sub: &str, handler: impl Handler) -> Result<(), Error> {
        self.on(Method::Connect, sub, handler)
    }
}
