//! Segment trie shared by the route and middleware trees.
//!
//! A path such as `/users/:id/posts` is split on `/` into segments and each
//! segment is one edge. Both trees walk the same way: one hash lookup per
//! segment, so lookup cost grows with path depth and not with the number of
//! registered routes.
//!
//! ```text
//! (root)
//!   └── "users"
//!         ├── "active"        literal child
//!         └── ":id"           literal key AND the node's `param_key`
//!               └── "posts"
//! ```
//!
//! A parametric segment is stored under its declared name (`:id`) like any
//! other child. The node also remembers that name as its single `param_key`,
//! which lookup falls back to only when no literal child matches.

use std::collections::{HashMap, HashSet};

use crate::error::Error;

/// Marker that turns a registered segment into a capture.
pub const PARAM_PREFIX: char = ':';

/// Splits a path into its segments.
///
/// Empty segments are skipped, so the root path (`/` or `""`) has none and a
/// trailing `/` never produces an extra edge.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

pub(crate) fn is_param(segment: &str) -> bool {
    segment.starts_with(PARAM_PREFIX)
}

/// One `(reconstructed path, bound value)` pair produced by flattening a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Linear<T> {
    pub path: String,
    pub value: T,
}

#[derive(Debug)]
pub(crate) struct Node<V> {
    children: HashMap<String, Node<V>>,
    param_key: Option<String>,
    pub(crate) value: V,
}

impl<V: Default> Default for Node<V> {
    fn default() -> Self {
        Self { children: HashMap::new(), param_key: None, value: V::default() }
    }
}

impl<V: Default> Node<V> {
    /// Walks `path`, creating missing nodes, and returns the terminal node.
    /// Every segment, `:name` included, is a plain literal edge.
    pub(crate) fn insert_path(&mut self, path: &str) -> &mut Self {
        segments(path).fold(self, |node, segment| node.children.entry(segment.to_owned()).or_default())
    }

    /// Like [`insert_path`](Self::insert_path), but a `:name` segment also
    /// becomes its parent's `param_key`. A second, differently named
    /// parametric sibling is rejected and nothing below the clash is created.
    pub(crate) fn insert_route(&mut self, path: &str) -> Result<&mut Self, Error> {
        let mut node = self;
        for segment in segments(path) {
            if is_param(segment) {
                match &node.param_key {
                    Some(existing) if existing != segment => {
                        return Err(Error::ParamConflict {
                            path: path.to_owned(),
                            existing: existing.clone(),
                            declared: segment.to_owned(),
                        });
                    }
                    Some(_) => {}
                    None => node.param_key = Some(segment.to_owned()),
                }
            }
            node = node.children.entry(segment.to_owned()).or_default();
        }
        Ok(node)
    }
}

impl<V> Node<V> {
    pub(crate) fn child(&self, segment: &str) -> Option<&Self> {
        self.children.get(segment)
    }

    /// Resolves `path`, trying the literal child first and the parametric
    /// child second at every depth. `on_capture(key, value)` fires for each
    /// parametric step. Returns `None` as soon as a segment matches neither.
    pub(crate) fn walk<'t>(
        &'t self,
        path: &str,
        mut on_capture: impl FnMut(&'t str, &str),
    ) -> Option<&'t Self> {
        let mut node = self;
        for segment in segments(path) {
            node = match node.children.get(segment) {
                Some(next) => next,
                None => {
                    let key = node.param_key.as_deref()?;
                    let next = node.children.get(key)?;
                    on_capture(key, segment);
                    next
                }
            };
        }
        Some(node)
    }

    /// Resolves `path` through literal children only.
    pub(crate) fn find_exact(&self, path: &str) -> Option<&Self> {
        segments(path).try_fold(self, |node, segment| node.child(segment))
    }

    /// Visits the root and then every node along the longest literal prefix
    /// of `path`, stopping quietly at the first segment with no child.
    pub(crate) fn walk_prefix<'t>(&'t self, path: &str, mut visit: impl FnMut(&'t Self)) {
        let mut node = self;
        visit(node);
        for segment in segments(path) {
            match node.child(segment) {
                Some(next) => {
                    node = next;
                    visit(node);
                }
                None => break,
            }
        }
    }

    /// Flattens the tree depth-first into `(path, &value)` pairs, one per node.
    ///
    /// The root is reported as `/`. Sibling order follows the child map and is
    /// not stable. An explicit stack keeps deep trees off the call stack, and
    /// a visited set keyed by reconstructed path guarantees each path is
    /// emitted once.
    pub(crate) fn linearize(&self) -> Vec<(String, &V)> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(String::new(), self)];

        while let Some((path, node)) = stack.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }
            for (key, child) in &node.children {
                stack.push((format!("{path}/{key}"), child));
            }
            let shown = if path.is_empty() { "/".to_owned() } else { path };
            out.push((shown, &node.value));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(paths: &[&str]) -> Node<u32> {
        let mut root = Node::<u32>::default();
        for (i, path) in paths.iter().enumerate() {
            root.insert_route(path).unwrap().value = i as u32 + 1;
        }
        root
    }

    #[test]
    fn segments_skip_empty_parts() {
        assert_eq!(segments("/").count(), 0);
        assert_eq!(segments("").count(), 0);
        assert_eq!(segments("/users/").collect::<Vec<_>>(), ["users"]);
        assert_eq!(segments("/users/:id/name").collect::<Vec<_>>(), ["users", ":id", "name"]);
    }

    #[test]
    fn literal_wins_over_param() {
        let root = tree(&["/users/:id", "/users/active"]);
        let mut captured = Vec::new();

        let node = root.walk("/users/active", |k, v| captured.push((k, v.to_owned()))).unwrap();
        assert_eq!(node.value, 2);
        assert!(captured.is_empty());

        let node = root.walk("/users/42", |k, v| captured.push((k, v.to_owned()))).unwrap();
        assert_eq!(node.value, 1);
        assert_eq!(captured, [(":id", "42".to_owned())]);
    }

    #[test]
    fn walk_misses_without_literal_or_param() {
        let root = tree(&["/users/:id/name"]);
        assert!(root.walk("/posts", |_, _| {}).is_none());
        assert!(root.walk("/users/1/age", |_, _| {}).is_none());
        assert_eq!(root.walk("/users/1/name", |_, _| {}).unwrap().value, 1);
    }

    #[test]
    fn second_param_name_is_rejected() {
        let mut root = tree(&["/users/:id"]);
        let err = root.insert_route("/users/:name/posts").unwrap_err();
        assert!(matches!(err, Error::ParamConflict { ref existing, ref declared, .. }
            if existing == ":id" && declared == ":name"));
        assert!(root.find_exact("/users/:name").is_none());

        // Same name again is fine.
        assert!(root.insert_route("/users/:id/posts").is_ok());
    }

    #[test]
    fn untracked_params_are_plain_literals() {
        let mut root = Node::<u32>::default();
        root.insert_path("/users/:id");
        root.insert_path("/users/:name");
        assert!(root.walk("/users/7", |_, _| {}).is_none());
    }

    #[test]
    fn find_exact_ignores_param_fallback() {
        let root = tree(&["/users/:id"]);
        assert!(root.find_exact("/users/:id").is_some());
        assert!(root.find_exact("/users/42").is_none());
    }

    #[test]
    fn walk_prefix_stops_at_first_miss() {
        let root = tree(&["/a/b/c"]);
        let mut seen = 0;
        root.walk_prefix("/a/b/x/c", |_| seen += 1);
        assert_eq!(seen, 3); // root, a, b
    }

    #[test]
    fn linearize_reports_every_node_once() {
        let root = tree(&["/", "/users/:id", "/users/:id/name", "/posts"]);
        let mut paths: Vec<_> = root.linearize().into_iter().map(|(p, _)| p).collect();
        paths.sort();
        assert_eq!(paths, ["/", "/posts", "/users", "/users/:id", "/users/:id/name"]);
    }
}
