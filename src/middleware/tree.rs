//! Middleware trie keyed by path prefix.

use std::sync::Arc;

use crate::middleware::BoxedMiddleware;
use crate::trie::{Linear, Node};

type MiddlewareList = Vec<BoxedMiddleware>;

/// Path-scoped middleware, shared by every method.
///
/// Segments are matched literally: scoping is by static prefix, so middleware
/// registered under `/users/:id` only applies to a request whose path really
/// contains the segment `:id`.
#[derive(Default)]
pub struct MiddlewareTree {
    root: Node<MiddlewareList>,
}

/// A node of a [`MiddlewareTree`], returned by registration so deeper scopes
/// can be added fluently.
pub struct MiddlewareNode<'t> {
    node: &'t mut Node<MiddlewareList>,
}

impl MiddlewareNode<'_> {
    /// Appends middleware to this node.
    pub fn register(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.node.value.push(middleware);
        self
    }

    /// Descends to `pattern` below this node, creating it if needed, and
    /// appends `middlewares` there.
    pub fn insert(
        self,
        pattern: &str,
        middlewares: impl IntoIterator<Item = BoxedMiddleware>,
    ) -> Self {
        let node = self.node.insert_path(pattern);
        node.value.extend(middlewares);
        MiddlewareNode { node }
    }

    pub fn len(&self) -> usize {
        self.node.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.value.is_empty()
    }
}

impl MiddlewareTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends global middleware at the root; it runs for every request.
    pub fn register(&mut self, middleware: BoxedMiddleware) -> &mut Self {
        self.root.value.push(middleware);
        self
    }

    /// Appends `middlewares` at `pattern` and returns that node.
    ///
    /// `""` and `"/"` both mean the root.
    pub fn insert(
        &mut self,
        pattern: &str,
        middlewares: impl IntoIterator<Item = BoxedMiddleware>,
    ) -> MiddlewareNode<'_> {
        MiddlewareNode { node: &mut self.root }.insert(pattern, middlewares)
    }

    /// Collects every middleware registered on a prefix of `path`.
    ///
    /// Root middleware comes first, then each deeper prefix in order, each
    /// node's list in registration order. The walk stops quietly at the first
    /// segment without a child, so this never fails.
    pub fn search(&self, path: &str) -> Vec<&BoxedMiddleware> {
        let mut found = Vec::new();
        self.root.walk_prefix(path, |node| found.extend(node.value.iter()));
        found
    }

    /// Every `(path, middleware)` pair, depth-first. A node with several
    /// middlewares yields one pair per middleware, in registration order.
    pub fn linearize(&self) -> Vec<Linear<BoxedMiddleware>> {
        self.root
            .linearize()
            .into_iter()
            .flat_map(|(path, list)| {
                list.iter().map(move |mw| Linear { path: path.clone(), value: Arc::clone(mw) })
            })
            .collect()
    }
}
