//! Path matching.
//!
//! # Responsibilities
//! - Walk the route tree against a normalized request path
//! - Attempt siblings in their stored priority order, backtracking
//!   across alternate branches
//! - Bind capture names to the matched segment text
//! - Record the fallback chain used for trailing-slash redirects and
//!   nearest-ancestor handlers
//!
//! # Design Decisions
//! - Explicit loop with index bookkeeping, no recursion
//! - Bindings made on an abandoned branch are discarded
//! - The fallback trace is first-write-wins per (depth, slot)
//! - Lookup never errors: an unmatched path yields an absent handler

use std::collections::{BTreeMap, HashMap};

use crate::routing::pattern::{split_capture, PriorityClass};
use crate::routing::tree::{NodeId, RouteTree, ROOT};

/// Route variables extracted from capture segments. Pattern
/// `/{category}/{file}/{line}\d+?` matching `/golang/main.go/13` binds
/// `category`, `file` and `line`.
pub type RouteVars = HashMap<String, String>;

/// One entry of the fallback chain: a handler passed on the way to the
/// requested path, keyed by the sub-path it terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEntry<H> {
    pub path: String,
    pub handler: H,
}

/// Result of matching one path against the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<H> {
    /// The path that was looked up.
    pub path: String,
    /// Handler of the node reached by consuming every segment, if any.
    pub handler: Option<H>,
    /// Non-absent handlers recorded along the walk, most specific last.
    pub fallback: Vec<FallbackEntry<H>>,
    /// Capture bindings from the accepted branch.
    pub vars: RouteVars,
}

const SLOT_EXACT: usize = 0;
const SLOT_SLASH: usize = 1;

/// Fallback handlers keyed by path depth. Two slots per depth: the node
/// terminating exactly at that segment, and its trailing-slash (or
/// any-wildcard) terminal child.
struct TraceTable<H>(BTreeMap<isize, [Option<FallbackEntry<H>>; 2]>);

impl<H: Clone> TraceTable<H> {
    fn new() -> Self {
        Self(BTreeMap::new())
    }

    fn try_insert(&mut self, depth: isize, slot: usize, path: String, handler: Option<&H>) {
        let Some(handler) = handler else { return };
        let row = self.0.entry(depth).or_insert([None, None]);
        if row[slot].is_none() {
            row[slot] = Some(FallbackEntry {
                path,
                handler: handler.clone(),
            });
        }
    }

    /// Depth-ascending, exact slot before slash slot: most specific last.
    fn into_chain(self) -> Vec<FallbackEntry<H>> {
        self.0
            .into_values()
            .flat_map(|row| row.into_iter().flatten())
            .collect()
    }
}

impl<H: Clone> RouteTree<H> {
    /// Walk the tree against `path`.
    ///
    /// With `route_level` set, segments are compared structurally against
    /// node patterns instead of being matched as request text; this is
    /// how duplicate registrations are detected.
    pub(crate) fn lookup(&self, path: &str, route_level: bool) -> RouteMatch<H> {
        let mut result = RouteMatch {
            path: path.to_owned(),
            handler: None,
            fallback: Vec::new(),
            vars: RouteVars::new(),
        };

        // The root resolves directly.
        if path.is_empty() || path == "/" {
            result.handler = self.node(ROOT).handler.clone();
            return result;
        }

        // A doubled trailing slash is a dirty path; no match, no fallback.
        if path.ends_with("//") {
            return result;
        }

        let rest = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = rest.split('/').collect();
        let len = parts.len() as isize;

        let mut trace = TraceTable::new();
        let mut bindings: Vec<(isize, String, String)> = Vec::new();
        // Node whose child level (or right sibling, after a backtrack) is
        // attempted next.
        let mut cursor = ROOT;
        let mut backtrack = false;
        let mut terminal = None;
        let mut i: isize = 0;

        while i < len {
            if i < 0 {
                // Backtracked past the root: no branch left to explore.
                terminal = None;
                break;
            }
            let part = parts[i as usize];

            let next = if backtrack {
                self.node(cursor).right
            } else {
                self.node(cursor).child
            };
            backtrack = false;
            let Some(first) = next else {
                terminal = None;
                break;
            };

            // Attempt siblings in their stored priority order; the first
            // acceptance wins.
            let mut p = first;
            let mut matched = false;
            loop {
                if self.accepts(p, part, route_level) {
                    matched = true;
                    break;
                }
                match self.node(p).right {
                    Some(r) => p = r,
                    None => break,
                }
            }

            if matched {
                if !route_level {
                    let name = &self.node(p).name;
                    if !name.is_empty() {
                        bindings.push((i, name.clone(), part.to_owned()));
                    }
                }
                self.record(&mut trace, p, &parts, i);
                cursor = p;
                terminal = Some(p);
                i += 1;
            } else {
                // Climb to the nearest ancestor that still has an
                // unexplored right sibling, rewinding one path segment
                // per level.
                let mut q = p;
                loop {
                    if self.node(q).right.is_some() {
                        break;
                    }
                    let Some(parent) = self.node(q).parent else { break };
                    i -= 1;
                    q = parent;
                }
                backtrack = true;
                cursor = q;
                terminal = None;
                // Bindings made on the abandoned branch are dead.
                while bindings.last().is_some_and(|(lvl, _, _)| *lvl >= i) {
                    bindings.pop();
                }
            }
        }

        if let Some(id) = terminal {
            result.handler = self.node(id).handler.clone();
        }
        result.fallback = trace.into_chain();
        for (_, name, value) in bindings {
            result.vars.insert(name, value);
        }
        result
    }

    fn accepts(&self, id: NodeId, part: &str, route_level: bool) -> bool {
        let node = self.node(id);

        if route_level {
            let (_, body, is_regex) = split_capture(part);
            if is_regex && node.regex.is_none() {
                return false;
            }
            return node.pattern == body;
        }

        match node.class {
            // The any-segment class only matches non-empty parts.
            PriorityClass::AnyNonEmpty => !part.is_empty(),
            PriorityClass::Regex => node.regex.as_ref().is_some_and(|re| re.is_match(part)),
            // Paths are case-sensitive.
            PriorityClass::Literal => node.pattern == part,
        }
    }

    /// Record the accepted node into the fallback trace: the exact slot
    /// for the sub-path ending at this segment, and the slash slot when
    /// an immediate child is a trailing-slash or any-wildcard terminal.
    fn record(&self, trace: &mut TraceTable<H>, id: NodeId, parts: &[&str], i: isize) {
        let sub = format!("/{}", parts[..=(i as usize)].join("/"));
        let node = self.node(id);

        if sub.ends_with('/') {
            trace.try_insert(i - 1, SLOT_SLASH, sub, node.handler.as_ref());
        } else {
            trace.try_insert(i, SLOT_EXACT, sub.clone(), node.handler.as_ref());
            if let Some(c) = node.child {
                let child = self.node(c);
                if child.is_slash_tail() || child.is_any_tail() {
                    trace.try_insert(i, SLOT_SLASH, sub + "/", child.handler.as_ref());
                }
            }
        }
    }
}
