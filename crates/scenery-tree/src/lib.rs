//! Node model for scene documents: an arena of typed nodes with parent handles.

mod arena;
mod node;
mod tree;
mod walk;

pub use arena::Idx;
pub use node::{Children, Node, NodeData, NodeId, NodeKind, ScalarStyle};
pub use text_size::{TextRange, TextSize};
pub use tree::{SceneTree, Severity, SyntaxError, TreeBuilder};
pub use walk::{Preorder, WalkEvent};

#[cfg(test)]
mod tests;
