//! Position and key-path queries over a [`SceneTree`](scenery_tree::SceneTree).
//!
//! Every lookup returns `None` (or an empty list) for structural gaps; a
//! missing node is an ordinary outcome, not an error.

mod address;
mod offset;

pub use address::{ADDRESS_DELIMITER, Address, keys_at_address, node_at_address};
pub use offset::{address_for_node, key_for_node, node_at_offset, nodes_in_range, nodes_on_line};
