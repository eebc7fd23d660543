//! Route tree storage, insertion and rebalancing.
//!
//! # Responsibilities
//! - Own every route node in an index-addressed arena
//! - Merge an incoming segment chain with structurally-equal nodes
//! - Keep each sibling level sorted in match-attempt order
//! - Render the tree for diagnostics
//!
//! # Design Decisions
//! - `child` is the sole owning edge; `parent` and the sibling links are
//!   plain indices, so the cyclic parent/child/sibling web stays safe
//! - Nodes are merged in place and never deleted (append-only table)
//! - Sibling order: priority class descending, then pattern length
//!   ascending, then pattern text ascending

use regex::Regex;

use crate::routing::error::RouteError;
use crate::routing::pattern::{PriorityClass, Segment};

pub(crate) type NodeId = usize;

/// Index of the virtual root node; it anchors the tree and carries the
/// handler registered for `/`.
pub(crate) const ROOT: NodeId = 0;

#[derive(Debug)]
pub(crate) struct RouteNode<H> {
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,

    /// Capture name, or empty.
    pub name: String,
    /// Literal text to compare against, or the anchored regex source;
    /// empty for the any-segment class and for slash tails.
    pub pattern: String,
    /// Compiled matcher, present only for regex-class nodes.
    pub regex: Option<Regex>,

    /// Position within the registered pattern; -1 for the root.
    pub ordinal: i32,
    pub class: PriorityClass,
    /// Shallowest remaining depth among patterns through this node.
    pub min_depth: usize,
    /// Deepest remaining depth among patterns through this node.
    pub max_depth: usize,

    /// Present only when this node is the registered tail of a pattern.
    pub handler: Option<H>,
}

impl<H> RouteNode<H> {
    fn from_segment(seg: Segment) -> Self {
        RouteNode {
            parent: None,
            child: None,
            left: None,
            right: None,
            name: seg.name,
            pattern: seg.pattern,
            regex: seg.regex,
            ordinal: seg.ordinal,
            class: seg.class,
            min_depth: seg.depth,
            max_depth: seg.depth,
            handler: None,
        }
    }

    fn is_tail(&self) -> bool {
        self.child.is_none()
    }

    /// A childless bare-capture node, e.g. the `{file}` of `/files/{file}`.
    pub fn is_any_tail(&self) -> bool {
        self.is_tail() && self.class == PriorityClass::AnyNonEmpty
    }

    /// The childless empty node produced by a trailing `/`.
    pub fn is_slash_tail(&self) -> bool {
        self.is_tail() && self.name.is_empty() && self.pattern.is_empty()
    }
}

pub(crate) struct RouteTree<H> {
    nodes: Vec<RouteNode<H>>,
}

impl<H> RouteTree<H> {
    pub fn new() -> Self {
        let root = RouteNode {
            parent: None,
            child: None,
            left: None,
            right: None,
            name: String::new(),
            pattern: String::new(),
            regex: None,
            ordinal: -1,
            class: PriorityClass::Literal,
            min_depth: 0,
            max_depth: 0,
            handler: None,
        };
        Self { nodes: vec![root] }
    }

    pub fn node(&self, id: NodeId) -> &RouteNode<H> {
        &self.nodes[id]
    }

    /// Insert a compiled segment chain, attaching `handler` to its tail.
    ///
    /// Each level either merges with a structurally-equal sibling or
    /// appends a fresh node, and is then re-sorted into match order.
    pub fn insert(
        &mut self,
        pattern: &str,
        segments: Vec<Segment>,
        handler: H,
    ) -> Result<(), RouteError> {
        let mut handler = Some(handler);
        let last = segments.len() - 1;
        let mut parent = ROOT;

        for (i, seg) in segments.into_iter().enumerate() {
            let tail_handler = if i == last { handler.take() } else { None };

            if seg.ordinal == -1 {
                // Registration of "/" binds the virtual root itself.
                if self.nodes[ROOT].handler.is_some() {
                    return Err(RouteError::DuplicatePattern(pattern.to_owned()));
                }
                self.nodes[ROOT].handler = tail_handler;
                continue;
            }

            parent = self.insert_child(pattern, parent, seg, tail_handler)?;
        }
        Ok(())
    }

    fn insert_child(
        &mut self,
        pattern: &str,
        parent: NodeId,
        seg: Segment,
        tail_handler: Option<H>,
    ) -> Result<NodeId, RouteError> {
        let mut last = None;
        let mut sib = self.nodes[parent].child;
        while let Some(id) = sib {
            if self.equivalent(id, &seg) {
                let node = &mut self.nodes[id];
                node.min_depth = node.min_depth.min(seg.depth);
                node.max_depth = node.max_depth.max(seg.depth);
                if let Some(handler) = tail_handler {
                    if node.handler.is_some() {
                        // Exact duplicates are rejected, never overwritten.
                        return Err(RouteError::DuplicatePattern(pattern.to_owned()));
                    }
                    // Guards against registering "/a" after "/a/b" and
                    // losing either handler.
                    node.handler = Some(handler);
                }
                self.rearrange(parent);
                return Ok(id);
            }
            last = Some(id);
            sib = self.nodes[id].right;
        }

        let id = self.nodes.len();
        let mut node = RouteNode::from_segment(seg);
        node.parent = Some(parent);
        node.handler = tail_handler;
        node.left = last;
        self.nodes.push(node);
        match last {
            Some(prev) => self.nodes[prev].right = Some(id),
            None => self.nodes[parent].child = Some(id),
        }
        self.rearrange(parent);
        Ok(id)
    }

    /// Structural equality: same ordinal, pattern text, name and class.
    fn equivalent(&self, id: NodeId, seg: &Segment) -> bool {
        let node = &self.nodes[id];
        node.ordinal == seg.ordinal
            && node.pattern == seg.pattern
            && node.name == seg.name
            && node.class == seg.class
    }

    /// Restore the ordering invariant on `parent`'s child level. The
    /// resulting sibling order is the match-attempt order.
    fn rearrange(&mut self, parent: NodeId) {
        let mut kids = Vec::new();
        let mut p = self.nodes[parent].child;
        while let Some(id) = p {
            kids.push(id);
            p = self.nodes[id].right;
        }
        if kids.is_empty() {
            return;
        }

        kids.sort_by(|&a, &b| {
            let (na, nb) = (&self.nodes[a], &self.nodes[b]);
            nb.class
                .cmp(&na.class)
                .then(na.pattern.len().cmp(&nb.pattern.len()))
                .then(na.pattern.cmp(&nb.pattern))
        });

        for (i, &id) in kids.iter().enumerate() {
            self.nodes[id].left = if i == 0 { None } else { Some(kids[i - 1]) };
            self.nodes[id].right = kids.get(i + 1).copied();
        }
        self.nodes[parent].child = Some(kids[0]);
    }

    /// Render the tree as an indented diagnostic listing. Not part of the
    /// functional contract.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.label(ROOT));
        out.push('\n');
        self.dump_level(&mut out, self.nodes[ROOT].child, "");
        out
    }

    fn label(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        format!(
            "/{}{{n:{};[{},{:?},{},{}];h:{}}}",
            node.pattern,
            node.name,
            node.ordinal,
            node.class,
            node.min_depth,
            node.max_depth,
            if node.handler.is_some() { "*" } else { "-" },
        )
    }

    fn dump_level(&self, out: &mut String, first: Option<NodeId>, prefix: &str) {
        let mut p = first;
        while let Some(id) = p {
            let is_last = self.nodes[id].right.is_none();
            out.push_str(prefix);
            out.push_str(if is_last { "└── " } else { "├── " });
            out.push_str(&self.label(id));
            out.push('\n');

            let deeper = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            self.dump_level(out, self.nodes[id].child, &deeper);
            p = self.nodes[id].right;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::compile;

    fn insert(tree: &mut RouteTree<u32>, pattern: &str, handler: u32) {
        tree.insert(pattern, compile(pattern).unwrap(), handler)
            .unwrap();
    }

    fn child_patterns(tree: &RouteTree<u32>, parent: NodeId) -> Vec<String> {
        let mut out = Vec::new();
        let mut p = tree.node(parent).child;
        while let Some(id) = p {
            out.push(tree.node(id).pattern.clone());
            p = tree.node(id).right;
        }
        out
    }

    #[test]
    fn siblings_sorted_by_class_then_length_then_text() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/{any}", 1);
        insert(&mut tree, r"/{id}\d+", 2);
        insert(&mut tree, "/zz", 3);
        insert(&mut tree, "/b", 4);
        insert(&mut tree, "/a", 5);

        // Literals first (shortest, then lexicographic), regex next,
        // bare capture last.
        assert_eq!(
            child_patterns(&tree, ROOT),
            vec!["a", "b", "zz", r"^\d+$", ""],
        );

        // Sibling links stay doubly linked after the re-sort.
        let mut prev = None;
        let mut p = tree.node(ROOT).child;
        while let Some(id) = p {
            assert_eq!(tree.node(id).left, prev);
            prev = Some(id);
            p = tree.node(id).right;
        }
    }

    #[test]
    fn shared_prefix_merges_into_one_node() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/a/b", 1);
        insert(&mut tree, "/a/c", 2);

        assert_eq!(child_patterns(&tree, ROOT), vec!["a"]);
        let a = tree.node(ROOT).child.unwrap();
        assert_eq!(child_patterns(&tree, a), vec!["b", "c"]);
        // Depth span widens as chains of different length pass through.
        insert(&mut tree, "/a", 3);
        assert_eq!(tree.node(a).min_depth, 1);
        assert_eq!(tree.node(a).max_depth, 2);
    }

    #[test]
    fn merge_keeps_existing_handler() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/admin", 1);
        insert(&mut tree, "/admin/tag", 2);

        let admin = tree.node(ROOT).child.unwrap();
        assert_eq!(tree.node(admin).handler, Some(1));
    }

    #[test]
    fn merge_attaches_late_handler_to_intermediate_node() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/admin/tag", 2);
        insert(&mut tree, "/admin", 1);

        let admin = tree.node(ROOT).child.unwrap();
        assert_eq!(tree.node(admin).handler, Some(1));
    }

    #[test]
    fn tail_handler_collision_is_rejected() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/a/b", 1);
        let err = tree
            .insert("/a/b", compile("/a/b").unwrap(), 2)
            .unwrap_err();
        assert!(matches!(err, RouteError::DuplicatePattern(_)));
    }

    #[test]
    fn root_registration_binds_virtual_root() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/", 7);
        assert_eq!(tree.node(ROOT).handler, Some(7));

        let err = tree.insert("/", compile("/").unwrap(), 8).unwrap_err();
        assert!(matches!(err, RouteError::DuplicatePattern(_)));
    }

    #[test]
    fn dump_renders_every_node() {
        let mut tree = RouteTree::new();
        insert(&mut tree, "/a/b", 1);
        insert(&mut tree, "/a/", 2);
        let dump = tree.dump();
        assert!(dump.contains("/a{"));
        assert!(dump.contains("/b{"));
        assert!(dump.contains("└── "));
    }
}
