//! The schema-node arena.
//!
//! Nodes live in a [`SchemaTree`] and are addressed by [`NodeId`] handles.
//! Parents are stored as handles and children as handle lists, so ancestor
//! walks are O(1) per step and the tree has no ownership cycles.

use std::fmt;
use std::ops::Index;

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::schema::{Status, Typedef};

/// Handle of one node within a [`SchemaTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Kind tag of a schema node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
    Anyxml,
    Anydata,
    /// Covers both `rpc` (top level) and `action` (nested) bodies.
    Action,
    Notification,
    /// The input side of an RPC/action body.
    Input,
    /// The output side of an RPC/action body.
    Output,
    Grouping,
}

impl NodeKind {
    /// Display name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::List => "list",
            NodeKind::Leaf => "leaf",
            NodeKind::LeafList => "leaf-list",
            NodeKind::Choice => "choice",
            NodeKind::Case => "case",
            NodeKind::Anyxml => "anyxml",
            NodeKind::Anydata => "anydata",
            NodeKind::Action => "RPC/action",
            NodeKind::Notification => "notification",
            NodeKind::Input => "RPC input",
            NodeKind::Output => "RPC output",
            NodeKind::Grouping => "grouping",
        }
    }

    /// The singleton [`NodeKindSet`] holding this kind.
    pub const fn as_set(self) -> NodeKindSet {
        match self {
            NodeKind::Container => NodeKindSet::CONTAINER,
            NodeKind::List => NodeKindSet::LIST,
            NodeKind::Leaf => NodeKindSet::LEAF,
            NodeKind::LeafList => NodeKindSet::LEAF_LIST,
            NodeKind::Choice => NodeKindSet::CHOICE,
            NodeKind::Case => NodeKindSet::CASE,
            NodeKind::Anyxml => NodeKindSet::ANYXML,
            NodeKind::Anydata => NodeKindSet::ANYDATA,
            NodeKind::Action => NodeKindSet::ACTION,
            NodeKind::Notification => NodeKindSet::NOTIFICATION,
            NodeKind::Input => NodeKindSet::INPUT,
            NodeKind::Output => NodeKindSet::OUTPUT,
            NodeKind::Grouping => NodeKindSet::GROUPING,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of node kinds, used as the accepted-kind mask when resolving a
    /// schema node-id. The empty set means "any kind accepted".
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct NodeKindSet: u16 {
        const CONTAINER = 1 << 0;
        const LIST = 1 << 1;
        const LEAF = 1 << 2;
        const LEAF_LIST = 1 << 3;
        const CHOICE = 1 << 4;
        const CASE = 1 << 5;
        const ANYXML = 1 << 6;
        const ANYDATA = 1 << 7;
        const ACTION = 1 << 8;
        const NOTIFICATION = 1 << 9;
        const INPUT = 1 << 10;
        const OUTPUT = 1 << 11;
        const GROUPING = 1 << 12;
        /// Either side of an RPC/action body.
        const INOUT = Self::INPUT.bits() | Self::OUTPUT.bits();
    }
}

bitflags! {
    /// Options for child lookup in a [`SchemaTree`].
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct ChildLookup: u8 {
        /// Choice nodes are themselves addressable results.
        const WITH_CHOICE = 1 << 0;
        /// Case nodes are themselves addressable results.
        const WITH_CASE = 1 << 1;
        /// Search the output side of an RPC/action body instead of the input.
        const OUTPUT = 1 << 2;
    }
}

/// One schema node, under construction or compiled.
#[derive(Clone, Debug)]
pub struct SchemaNode {
    pub kind: NodeKind,
    pub name: SmolStr,
    /// Name of the module this node belongs to. Usually the module owning the
    /// tree, but grafted (augment-origin) nodes keep their defining module.
    pub module: SmolStr,
    pub status: Status,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Typedefs scoped to this node's subtree.
    pub typedefs: Vec<Typedef>,
    /// Groupings scoped to this node's subtree (handles of `Grouping` nodes).
    pub groupings: Vec<NodeId>,
}

/// An arena of schema nodes.
///
/// Top-level handles (data roots and module-level groupings) are recorded by
/// the owning module or submodule; the tree itself only stores nodes and their
/// parent/child linkage.
#[derive(Clone, Debug, Default)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id.index() as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.index() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Adds a node. With a parent, the node is linked as its next child; with
    /// none, the caller records the returned handle as a top-level root.
    pub fn add_child(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        module: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
    ) -> NodeId {
        let id = self.push(parent, kind, module.into(), name.into());
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        id
    }

    /// Adds a grouping scoped to `parent` (or module-level when `None`, in
    /// which case the caller records the handle). Groupings are not children:
    /// they are never found by child lookup, only by scope walks.
    pub fn add_grouping(
        &mut self,
        parent: Option<NodeId>,
        module: impl Into<SmolStr>,
        name: impl Into<SmolStr>,
    ) -> NodeId {
        let id = self.push(parent, NodeKind::Grouping, module.into(), name.into());
        if let Some(parent) = parent {
            self.node_mut(parent).groupings.push(id);
        }
        id
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        module: SmolStr,
        name: SmolStr,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(SchemaNode {
            kind,
            name,
            module,
            status: Status::Current,
            parent,
            children: Vec::new(),
            typedefs: Vec::new(),
            groupings: Vec::new(),
        });
        id
    }

    /// Walks the strictly enclosing ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self[id].parent, move |&p| self[p].parent)
    }

    /// The child list searched when resolving a segment below `parent`.
    ///
    /// For an RPC/action this is the child list of the selected input or
    /// output side; for every other kind it is the node's own children.
    pub fn lookup_base(&self, parent: NodeId, opts: ChildLookup) -> &[NodeId] {
        let node = &self[parent];
        if node.kind != NodeKind::Action {
            return &node.children;
        }
        let side = if opts.contains(ChildLookup::OUTPUT) {
            NodeKind::Output
        } else {
            NodeKind::Input
        };
        node.children
            .iter()
            .find(|&&c| self[c].kind == side)
            .map(|&c| self[c].children.as_slice())
            .unwrap_or(&[])
    }

    /// Searches `scope` for a node matching `(module, name)`.
    ///
    /// Choice and case wrappers are transparent: when one does not match it is
    /// descended into, so a node inside them is reachable without naming the
    /// wrapper. The wrappers themselves only match when the corresponding
    /// `WITH_CHOICE`/`WITH_CASE` option is set.
    pub fn find_child(
        &self,
        scope: &[NodeId],
        module: &str,
        name: &str,
        opts: ChildLookup,
    ) -> Option<NodeId> {
        for &id in scope {
            let node = &self[id];
            let named = node.module == module && node.name == name;
            match node.kind {
                NodeKind::Choice => {
                    if named && opts.contains(ChildLookup::WITH_CHOICE) {
                        return Some(id);
                    }
                    if let Some(found) = self.find_child(&node.children, module, name, opts) {
                        return Some(found);
                    }
                }
                NodeKind::Case => {
                    if named && opts.contains(ChildLookup::WITH_CASE) {
                        return Some(id);
                    }
                    if let Some(found) = self.find_child(&node.children, module, name, opts) {
                        return Some(found);
                    }
                }
                _ => {
                    if named {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Pre-order walk of the subtrees rooted at `roots`: each node is visited
    /// before its scoped groupings, which precede its data children. This is
    /// the discovery order of node-level scopes.
    pub fn preorder<'t>(&'t self, roots: &[NodeId]) -> impl Iterator<Item = NodeId> + 't {
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self[id];
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
            for &grouping in node.groupings.iter().rev() {
                stack.push(grouping);
            }
            Some(id)
        })
    }
}

impl Index<NodeId> for SchemaTree {
    type Output = SchemaNode;

    fn index(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut SchemaTree, parent: NodeId, name: &str) -> NodeId {
        tree.add_child(Some(parent), NodeKind::Leaf, "m", name)
    }

    #[test]
    fn test_add_links_parent_and_children() {
        let mut tree = SchemaTree::new();
        let top = tree.add_child(None, NodeKind::Container, "m", "top");
        let a = leaf(&mut tree, top, "a");
        let b = leaf(&mut tree, top, "b");

        assert_eq!(tree[top].children, vec![a, b]);
        assert_eq!(tree[a].parent, Some(top));
        assert_eq!(tree[top].parent, None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut tree = SchemaTree::new();
        let top = tree.add_child(None, NodeKind::Container, "m", "top");
        let mid = tree.add_child(Some(top), NodeKind::List, "m", "mid");
        let bottom = leaf(&mut tree, mid, "bottom");

        let chain: Vec<NodeId> = tree.ancestors(bottom).collect();
        assert_eq!(chain, vec![mid, top]);
        assert_eq!(tree.ancestors(top).count(), 0);
    }

    #[test]
    fn test_find_child_matches_module_and_name() {
        let mut tree = SchemaTree::new();
        let top = tree.add_child(None, NodeKind::Container, "m", "top");
        let a = leaf(&mut tree, top, "a");

        let scope = [top];
        assert_eq!(tree.find_child(&scope, "m", "top", ChildLookup::empty()), Some(top));
        assert_eq!(tree.find_child(&tree[top].children, "m", "a", ChildLookup::empty()), Some(a));
        assert_eq!(tree.find_child(&tree[top].children, "other", "a", ChildLookup::empty()), None);
        assert_eq!(tree.find_child(&tree[top].children, "m", "c", ChildLookup::empty()), None);
    }

    #[test]
    fn test_choice_case_are_transparent() {
        let mut tree = SchemaTree::new();
        let top = tree.add_child(None, NodeKind::Container, "m", "top");
        let choice = tree.add_child(Some(top), NodeKind::Choice, "m", "how");
        let case = tree.add_child(Some(choice), NodeKind::Case, "m", "one");
        let inner = leaf(&mut tree, case, "inner");

        let scope = &tree[top].children;
        // reachable without naming the wrappers
        assert_eq!(tree.find_child(scope, "m", "inner", ChildLookup::empty()), Some(inner));
        // the wrappers only match when asked for
        assert_eq!(tree.find_child(scope, "m", "how", ChildLookup::empty()), None);
        assert_eq!(
            tree.find_child(scope, "m", "how", ChildLookup::WITH_CHOICE),
            Some(choice)
        );
        assert_eq!(tree.find_child(scope, "m", "one", ChildLookup::WITH_CASE), Some(case));
    }

    #[test]
    fn test_lookup_base_selects_action_side() {
        let mut tree = SchemaTree::new();
        let act = tree.add_child(None, NodeKind::Action, "m", "reset");
        let input = tree.add_child(Some(act), NodeKind::Input, "m", "input");
        let output = tree.add_child(Some(act), NodeKind::Output, "m", "output");
        let delay = leaf(&mut tree, input, "delay");
        let result = leaf(&mut tree, output, "result");

        assert_eq!(tree.lookup_base(act, ChildLookup::empty()), &[delay][..]);
        assert_eq!(tree.lookup_base(act, ChildLookup::OUTPUT), &[result][..]);
        // non-action nodes expose their own children
        assert_eq!(tree.lookup_base(input, ChildLookup::OUTPUT), &[delay][..]);
    }

    #[test]
    fn test_groupings_invisible_to_child_lookup() {
        let mut tree = SchemaTree::new();
        let top = tree.add_child(None, NodeKind::Container, "m", "top");
        let grp = tree.add_grouping(Some(top), "m", "reusable");

        assert_eq!(tree[top].groupings, vec![grp]);
        assert!(tree[top].children.is_empty());
        assert_eq!(
            tree.find_child(&tree[top].children, "m", "reusable", ChildLookup::all()),
            None
        );
    }

    #[test]
    fn test_preorder_visits_groupings_before_children() {
        let mut tree = SchemaTree::new();
        let top = tree.add_child(None, NodeKind::Container, "m", "top");
        let grp = tree.add_grouping(Some(top), "m", "g");
        let grp_leaf = leaf(&mut tree, grp, "gl");
        let child = tree.add_child(Some(top), NodeKind::Container, "m", "child");
        let child_leaf = leaf(&mut tree, child, "cl");

        let order: Vec<NodeId> = tree.preorder(&[top]).collect();
        assert_eq!(order, vec![top, grp, grp_leaf, child, child_leaf]);
    }
}
