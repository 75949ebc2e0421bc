use text_size::{TextRange, TextSize};

use crate::arena::Idx;

pub type NodeId = Idx<Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    /// A single `key: value` pair.
    Mapping,
    /// An ordered collection of mappings.
    Map,
    Sequence,
    /// An `*alias` pointing back at an `&anchor`ed node.
    AnchorRef,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Mapping => "MAPPING",
            Self::Map => "MAP",
            Self::Sequence => "SEQUENCE",
            Self::AnchorRef => "ANCHOR_REF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Scalar { value: String, style: ScalarStyle },
    /// `key` is always a scalar; `value` is `None` for `key:` with nothing
    /// after it and for values that failed to parse.
    Mapping { key: NodeId, value: Option<NodeId> },
    Map { mappings: Vec<NodeId>, flow: bool },
    Sequence { items: Vec<Option<NodeId>>, flow: bool },
    /// `target` is the original node, never a copy.
    AnchorRef { name: String, target: NodeId },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar { .. } => NodeKind::Scalar,
            Self::Mapping { .. } => NodeKind::Mapping,
            Self::Map { .. } => NodeKind::Map,
            Self::Sequence { .. } => NodeKind::Sequence,
            Self::AnchorRef { .. } => NodeKind::AnchorRef,
        }
    }

    pub fn children(&self) -> Children<'_> {
        match self {
            Self::Scalar { .. } | Self::AnchorRef { .. } => Children::Leaf,
            Self::Mapping { key, value } => Children::Pair(Some(*key), *value),
            Self::Map { mappings, .. } => Children::Map(mappings.iter()),
            Self::Sequence { items, .. } => Children::Sequence(items.iter()),
        }
    }
}

/// A tree node: its data, source range and a non-owning handle to its parent.
///
/// Ranges are half-open UTF-8 byte ranges. A parent's range always contains the
/// ranges of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) range: TextRange,
    pub(crate) parent: Option<NodeId>,
    pub(crate) anchor: Option<String>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn start_position(&self) -> TextSize {
        self.range.start()
    }

    pub fn end_position(&self) -> TextSize {
        self.range.end()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Name of the `&anchor` declared on this node.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn scalar(&self) -> Option<&str> {
        match &self.data {
            NodeData::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> Children<'_> {
        self.data.children()
    }
}

pub enum Children<'a> {
    Leaf,
    Pair(Option<NodeId>, Option<NodeId>),
    Map(std::slice::Iter<'a, NodeId>),
    Sequence(std::slice::Iter<'a, Option<NodeId>>),
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self {
            Children::Leaf => None,
            Children::Pair(key, value) => key.take().or_else(|| value.take()),
            Children::Map(mappings) => mappings.next().copied(),
            Children::Sequence(items) => items.by_ref().flatten().next().copied(),
        }
    }
}
