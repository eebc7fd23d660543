//! Public router API and concurrency wrapper.
//!
//! # Responsibilities
//! - Guard the route tree with a read/write lock
//! - Registration: compile, duplicate-check and insert under one write lock
//! - Lookup: walk the tree under a shared read lock
//! - Resolve partial matches into redirect / enclosing handler / not-found
//!
//! # Design Decisions
//! - Compilation runs outside the critical section; registration either
//!   fully completes under the lock or fails before mutating shared state
//! - Lookups briefly stall during a registration but never observe a
//!   partially mutated tree
//! - Routers are independently instantiable; no process-global table

use std::sync::RwLock;

use crate::routing::error::RouteError;
use crate::routing::matcher::{RouteMatch, RouteVars};
use crate::routing::pattern;
use crate::routing::tree::RouteTree;

/// Decision derived from a match result, the way an HTTP layer consumes
/// the fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<H> {
    /// An exact or nearest-enclosing handler, with its route variables.
    Handler { handler: H, vars: RouteVars },
    /// The requested path has a trailing-slash sibling; redirect to it.
    Redirect { location: String },
    /// Nothing registered can serve the path.
    NotFound,
}

/// URL-pattern router: maps normalized request paths to opaque handlers.
///
/// The handler type is opaque to the router; it is stored on registration
/// and cloned back out of match results. Registration takes exclusive
/// access, lookups share a read lock.
///
/// ```
/// use pattern_router::Router;
///
/// let router = Router::new();
/// router.register("/files/{name}", "files").unwrap();
/// let m = router.match_path("/files/report.pdf");
/// assert_eq!(m.handler, Some("files"));
/// assert_eq!(m.vars["name"], "report.pdf");
/// ```
pub struct Router<H> {
    tree: RwLock<RouteTree<H>>,
}

impl<H: Clone> Router<H> {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(RouteTree::new()),
        }
    }

    /// Register `pattern` to `handler`.
    ///
    /// Fails with a malformed-pattern error when the pattern does not
    /// compile, and with `DuplicatePattern` when an exact match for it is
    /// already registered. The caller is expected to surface either as a
    /// configuration mistake.
    pub fn register(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        let pattern = pattern.trim();
        // Compilation needs no lock; keep the critical section small.
        let segments = pattern::compile(pattern)?;

        let mut tree = self.tree.write().expect("route tree lock poisoned");
        if tree.lookup(pattern, true).handler.is_some() {
            return Err(RouteError::DuplicatePattern(pattern.to_owned()));
        }
        tree.insert(pattern, segments, handler)?;
        tracing::debug!(pattern = %pattern, "route registered");
        Ok(())
    }

    /// Match a normalized path (no `..`, single leading slash).
    ///
    /// Never errors: an unmatched path comes back with an absent handler
    /// plus whatever fallback chain could be assembled.
    pub fn match_path(&self, path: &str) -> RouteMatch<H> {
        let tree = self.tree.read().expect("route tree lock poisoned");
        let result = tree.lookup(path, false);
        tracing::trace!(path = %path, matched = result.handler.is_some(), "route lookup");
        result
    }

    /// True if an exact compiled match for `pattern` already terminates
    /// at a node with a handler.
    pub fn pattern_exists(&self, pattern: &str) -> bool {
        let tree = self.tree.read().expect("route tree lock poisoned");
        tree.lookup(pattern.trim(), true).handler.is_some()
    }

    /// Resolve a path the way an HTTP layer would: the exact handler
    /// first; else a redirect when the most specific fallback entry is
    /// the path's own trailing-slash form ("/a/b" redirects to "/a/b/",
    /// never the other way around); else the nearest enclosing
    /// slash-terminated handler; else not-found.
    pub fn resolve(&self, path: &str) -> Resolution<H> {
        let result = self.match_path(path);

        if let Some(handler) = result.handler {
            return Resolution::Handler {
                handler,
                vars: result.vars,
            };
        }

        if let Some(last) = result.fallback.last() {
            if last.path == format!("{path}/") {
                return Resolution::Redirect {
                    location: last.path.clone(),
                };
            }
            for entry in result.fallback.iter().rev() {
                if entry.path.ends_with('/') {
                    return Resolution::Handler {
                        handler: entry.handler.clone(),
                        vars: result.vars,
                    };
                }
            }
        }

        Resolution::NotFound
    }

    /// Render the route tree as an indented diagnostic listing.
    pub fn dump_tree(&self) -> String {
        self.tree.read().expect("route tree lock poisoned").dump()
    }
}

impl<H: Clone> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}
