//! Path trie: one per HTTP method, mapping paths to handlers.

use tracing::warn;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::params::ParamUnit;
use crate::trie::{Linear, Node};

type RouteNode = Node<Option<BoxedHandler>>;

/// Handler bindings for a single method.
///
/// Static segments always win over a parametric sibling at the same depth,
/// so with `/users/active` and `/users/:id` both registered, `/users/active`
/// never reaches the `:id` handler.
pub struct RouteTrie {
    method: Method,
    root: RouteNode,
}

/// A node reached by [`RouteTrie::search`].
///
/// Reaching a node does not mean a route is bound there: `/users` exists as
/// soon as `/users/:id` is registered, but has no handler of its own.
#[derive(Clone, Copy)]
pub struct Route<'t> {
    node: &'t RouteNode,
}

impl<'t> Route<'t> {
    pub fn handler(&self) -> Option<&'t BoxedHandler> {
        self.node.value.as_ref()
    }
}

impl RouteTrie {
    pub fn new(method: Method) -> Self {
        Self { method, root: RouteNode::default() }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Binds `handler` at `path`.
    ///
    /// Fails with [`Error::RouteConflict`] if a handler is already bound there
    /// (the first one stays), or [`Error::ParamConflict`] if the path declares
    /// a parametric segment whose sibling already has another name.
    pub fn insert(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        let node = self.root.insert_route(path)?;
        if node.value.is_some() {
            warn!(method = %self.method, path, "handler collision");
            return Err(Error::RouteConflict { method: self.method, path: path.to_owned() });
        }
        node.value = Some(handler);
        Ok(())
    }

    /// Binds `handler` at `path`, overwriting whatever was there.
    pub(crate) fn replace(&mut self, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        let node = self.root.insert_route(path)?;
        if node.value.is_some() {
            warn!(method = %self.method, path, "overwriting existing handler");
        }
        node.value = Some(handler);
        Ok(())
    }

    /// Resolves a request path.
    ///
    /// Returns the matched node (or `None`) together with every parametric
    /// capture made on the way, in path order. On a miss the captures made
    /// before the miss are still returned.
    pub fn search(&self, path: &str) -> (Option<Route<'_>>, Vec<ParamUnit>) {
        let mut params = Vec::new();
        let node = self.root.walk(path, |key, value| params.push(ParamUnit::new(key, value)));
        (node.map(|node| Route { node }), params)
    }

    /// Whether a handler is bound at exactly this registration path.
    pub fn contains(&self, path: &str) -> bool {
        self.root.find_exact(path).is_some_and(|node| node.value.is_some())
    }

    /// Every bound `(path, handler)` pair, depth-first, in unspecified order.
    pub fn linearize(&self) -> Vec<Linear<BoxedHandler>> {
        self.root
            .linearize()
            .into_iter()
            .filter_map(|(path, handler)| handler.clone().map(|value| Linear { path, value }))
            .collect()
    }
}
