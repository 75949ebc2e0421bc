use std::fmt;

use scenery_tree::{NodeData, NodeId, SceneTree};

pub const ADDRESS_DELIMITER: char = ':';

/// Key path from the root to a node, e.g. `sources:mapzen:url`.
///
/// Only mapping keys take part; sequence positions are not recorded, so an
/// address stays the same while the text around a node is edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        Self { segments: text.split(ADDRESS_DELIMITER).map(str::to_owned).collect() }
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{ADDRESS_DELIMITER}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for Address {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

/// Finds the mapping named by `address`.
///
/// Each segment selects the first mapping with that key in the current map.
/// Values that are aliases are followed to their anchored node, and
/// sequences are searched item by item since addresses skip them. The empty
/// address resolves to the root.
pub fn node_at_address(tree: &SceneTree, address: &Address) -> Option<NodeId> {
    let mut current = tree.root()?;
    let mut mapping = None;

    for segment in address.segments() {
        if let Some(mapping) = mapping {
            current = tree.resolve(tree.mapping_value(mapping)?);
        }
        mapping = Some(find_mapping(tree, current, segment)?);
    }

    Some(mapping.unwrap_or(current))
}

fn find_mapping(tree: &SceneTree, node: NodeId, key: &str) -> Option<NodeId> {
    match tree[node].data() {
        NodeData::Map { mappings, .. } => {
            mappings.iter().copied().find(|&mapping| tree.mapping_key(mapping) == Some(key))
        }
        NodeData::Sequence { items, .. } => {
            items.iter().flatten().find_map(|&item| find_mapping(tree, tree.resolve(item), key))
        }
        _ => None,
    }
}

/// Keys of the map found at `address`, in source order.
pub fn keys_at_address(tree: &SceneTree, address: &Address) -> Vec<String> {
    let Some(mut node) = node_at_address(tree, address) else {
        return Vec::new();
    };
    if !address.is_root() {
        let Some(value) = tree.mapping_value(node) else {
            return Vec::new();
        };
        node = tree.resolve(value);
    }

    match tree[node].data() {
        NodeData::Map { mappings, .. } => mappings
            .iter()
            .filter_map(|&mapping| tree.mapping_key(mapping))
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}
