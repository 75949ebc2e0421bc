use scenery_inputs::LineIndex;
use scenery_tree::{NodeData, NodeId, NodeKind, SceneTree};
use text_size::{TextRange, TextSize};

use crate::Address;

/// The most specific node at `offset`.
///
/// A range's end counts as inside it, so a cursor right after a value still
/// finds that value. Offsets between the entries of a map resolve to `None`;
/// offsets between sequence items resolve to the sequence, and dead space
/// after a key to its mapping.
pub fn node_at_offset(tree: &SceneTree, offset: TextSize) -> Option<NodeId> {
    let mut node = tree.root()?;
    if !tree.range(node).contains_inclusive(offset) {
        return None;
    }

    loop {
        node = match tree[node].data() {
            NodeData::Map { .. } => tree.child_at(node, offset)?,
            NodeData::Mapping { value, .. } => match value {
                Some(value) if tree.range(*value).contains_inclusive(offset) => *value,
                _ => return Some(node),
            },
            NodeData::Sequence { .. } => match tree.child_at(node, offset) {
                Some(item) => item,
                None => return Some(node),
            },
            NodeData::Scalar { .. } | NodeData::AnchorRef { .. } => return Some(node),
        };
    }
}

/// Keys of every mapping from the root down to `node`, the node included.
pub fn address_for_node(tree: &SceneTree, node: NodeId) -> Address {
    let mut segments = tree
        .ancestors(node)
        .filter_map(|id| tree.mapping_key(id))
        .map(str::to_owned)
        .collect::<Vec<_>>();
    segments.reverse();
    Address::from_segments(segments)
}

/// Key of the closest mapping around `node`.
pub fn key_for_node(tree: &SceneTree, node: NodeId) -> Option<&str> {
    tree.ancestors(node).find_map(|id| tree.mapping_key(id))
}

/// Value-bearing nodes starting inside `range`, in source order.
///
/// Value-bearing means scalars that are not keys, sequences and aliases.
/// Only children touching `range` are entered, found by binary search.
pub fn nodes_in_range(tree: &SceneTree, range: TextRange) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let Some(root) = tree.root() else {
        return nodes;
    };
    if tree.range(root).start() > range.end() || tree.range(root).end() < range.start() {
        return nodes;
    }

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let bears_value = match tree.kind(id) {
            NodeKind::Scalar => !tree.is_key(id),
            NodeKind::Sequence | NodeKind::AnchorRef => true,
            NodeKind::Map | NodeKind::Mapping => false,
        };
        if bears_value && range.contains_inclusive(tree.range(id).start()) {
            nodes.push(id);
        }
        stack.extend(tree.children_in(id, range).iter().rev());
    }

    nodes
}

/// [`nodes_in_range`] over the 0-based `line` of `text`.
pub fn nodes_on_line(tree: &SceneTree, index: &LineIndex, text: &str, line: u32) -> Vec<NodeId> {
    match scenery_inputs::line_range(index, text, line) {
        Some(range) => nodes_in_range(tree, range),
        None => Vec::new(),
    }
}
