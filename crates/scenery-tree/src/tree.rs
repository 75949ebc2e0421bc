use std::fmt;
use std::ops::{Index, Range};

use text_size::{TextRange, TextSize};

use crate::node::{Node, NodeData, NodeId, NodeKind};
use crate::walk::{Preorder, WalkEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub severity: Severity,
    pub message: String,
    pub range: TextRange,
}

/// An immutable, position-annotated tree for one version of a document.
///
/// Nodes live in a flat arena and refer to each other by [`NodeId`]. A re-parse
/// builds a fresh tree and drops the old one as a unit, which also drops every
/// alias edge into it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SceneTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    errors: Vec<SyntaxError>,
    /// Children of every node, flattened in source order with holes skipped.
    edges: Vec<NodeId>,
    /// `edges` range of each node.
    spans: Vec<Range<u32>>,
    /// Position of each node among its parent's children.
    slots: Vec<u32>,
}

impl SceneTree {
    /// `None` for an empty document or one with no recoverable structure.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self[id].kind()
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self[id].range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&id| self.parent(id))
    }

    pub fn scalar(&self, id: NodeId) -> Option<&str> {
        self[id].scalar()
    }

    /// The key text of a `Mapping` node.
    pub fn mapping_key(&self, id: NodeId) -> Option<&str> {
        match self[id].data {
            NodeData::Mapping { key, .. } => self.scalar(key),
            _ => None,
        }
    }

    pub fn mapping_value(&self, id: NodeId) -> Option<NodeId> {
        match self[id].data {
            NodeData::Mapping { value, .. } => value,
            _ => None,
        }
    }

    /// `true` for the key scalar of a `Mapping`.
    pub fn is_key(&self, id: NodeId) -> bool {
        self.parent(id).is_some_and(|parent| {
            matches!(self[parent].data, NodeData::Mapping { key, .. } if key == id)
        })
    }

    /// Follows alias edges until a non-alias node is reached.
    pub fn resolve(&self, mut id: NodeId) -> NodeId {
        while let NodeData::AnchorRef { target, .. } = self[id].data {
            id = target;
        }
        id
    }

    /// Children of `id` in source order; their ranges never overlap.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        let span = &self.spans[id.index() as usize];
        &self.edges[span.start as usize..span.end as usize]
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let slot = self.slots[id.index() as usize] as usize;
        self.children(self.parent(id)?).get(slot + 1).copied()
    }

    /// The first child of `id` whose range contains `offset`, ends included.
    pub fn child_at(&self, id: NodeId, offset: TextSize) -> Option<NodeId> {
        let children = self.children(id);
        let first = children.partition_point(|&child| self.range(child).end() < offset);
        children
            .get(first)
            .copied()
            .filter(|&child| self.range(child).start() <= offset)
    }

    /// Children of `id` touching `range`, ends included.
    pub fn children_in(&self, id: NodeId, range: TextRange) -> &[NodeId] {
        let children = self.children(id);
        let start = children.partition_point(|&child| self.range(child).end() < range.start());
        let end = children.partition_point(|&child| self.range(child).start() <= range.end());
        &children[start..end.max(start)]
    }

    pub fn preorder(&self, start: NodeId) -> Preorder<'_> {
        Preorder::new(self, start)
    }

    /// Every node reachable from the root, parents before children.
    pub fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root.into_iter().flat_map(|root| {
            self.preorder(root).filter_map(|event| match event {
                WalkEvent::Enter(id) => Some(id),
                WalkEvent::Leave(_) => None,
            })
        })
    }
}

impl Index<NodeId> for SceneTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index() as usize]
    }
}

/// Indented outline of the tree, used by snapshot tests and the CLI.
impl fmt::Display for SceneTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root else {
            return writeln!(f, "<empty>");
        };

        let mut depth = 0;
        for event in self.preorder(root) {
            let id = match event {
                WalkEvent::Enter(id) => id,
                WalkEvent::Leave(_) => {
                    depth -= 1;
                    continue;
                }
            };

            let node = &self[id];
            let range = node.range;
            write!(f, "{:indent$}{}@{:?}", "", node.kind().name(), range, indent = depth * 2)?;
            if let Some(anchor) = &node.anchor {
                write!(f, " &{anchor}")?;
            }
            match &node.data {
                NodeData::Scalar { value, .. } => write!(f, " {value:?}")?,
                NodeData::AnchorRef { name, target } => {
                    let target_kind = self.kind(*target).name();
                    write!(f, " *{name} -> {target_kind}@{:?}", self.range(*target))?
                }
                NodeData::Mapping { value: None, .. } => write!(f, " <no value>")?,
                _ => {}
            }
            writeln!(f)?;
            depth += 1;
        }

        Ok(())
    }
}

/// Append-only construction of a [`SceneTree`].
///
/// Nodes are allocated once their children are complete, so a freshly
/// allocated node adopts its children by setting their parent handles.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    errors: Vec<SyntaxError>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, data: NodeData, range: TextRange) -> NodeId {
        let id = NodeId::new(self.len());
        for child in data.children() {
            let child = &mut self.nodes[child.index() as usize];
            debug_assert!(child.parent.is_none(), "node adopted twice");
            debug_assert!(range.contains_range(child.range), "child escapes its parent");
            child.parent = Some(id);
        }
        self.nodes.push(Node { data, range, parent: None, anchor: None });
        id
    }

    pub fn set_anchor(&mut self, id: NodeId, name: impl Into<String>) {
        self.nodes[id.index() as usize].anchor = Some(name.into());
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index() as usize].range
    }

    pub fn scalar(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.index() as usize].scalar()
    }

    /// Discards every node allocated after the builder had `len` nodes.
    pub fn truncate(&mut self, len: u32) {
        self.nodes.truncate(len as usize);
    }

    pub fn error(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(SyntaxError { severity: Severity::Error, message: message.into(), range });
    }

    pub fn warning(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(SyntaxError {
            severity: Severity::Warning,
            message: message.into(),
            range,
        });
    }

    pub fn finish(self, root: Option<NodeId>) -> SceneTree {
        let mut edges = Vec::with_capacity(self.nodes.len());
        let mut spans = Vec::with_capacity(self.nodes.len());
        let mut slots = vec![0; self.nodes.len()];

        for node in &self.nodes {
            let start = edges.len() as u32;
            for (slot, child) in node.children().enumerate() {
                slots[child.index() as usize] = slot as u32;
                edges.push(child);
            }
            spans.push(start..edges.len() as u32);
        }

        SceneTree { nodes: self.nodes, root, errors: self.errors, edges, spans, slots }
    }
}
