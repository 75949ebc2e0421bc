//! Table of rules deciding which annotation, if any, belongs to a node.

mod builtin;
mod entry;
mod error;
mod matcher;

use scenery_query::keys_at_address;
use scenery_tree::{NodeId, SceneTree};

pub use entry::{AnnotationKind, Choices, RegistryEntry};
pub use error::RegistryError;
pub use matcher::{AddressMatcher, KeyMatcher, MatchTarget, Matcher};

/// Position of an entry in its registry; earlier entries take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryIndex(pub u32);

#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(builtin::entries())
    }

    /// Loads a JSON array of `{ matchKey | matchAddress, type, options?, source? }`.
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        let configs: Vec<entry::EntryConfig> = serde_json::from_str(text)?;
        let entries = configs
            .into_iter()
            .enumerate()
            .map(|(index, config)| config.into_entry(index))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(entries = entries.len(), "loaded registry");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: EntryIndex) -> Option<&RegistryEntry> {
        self.entries.get(index.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryIndex, &RegistryEntry)> {
        self.entries.iter().enumerate().map(|(index, entry)| (EntryIndex(index as u32), entry))
    }

    /// The first entry, in table order, matching `target`.
    pub fn find_target(&self, target: &MatchTarget<'_>) -> Option<(EntryIndex, &RegistryEntry)> {
        self.iter().find(|(_, entry)| entry.matches(target))
    }

    pub fn find(&self, tree: &SceneTree, node: NodeId) -> Option<(EntryIndex, &RegistryEntry)> {
        self.find_target(&MatchTarget::of(tree, node))
    }

    /// Dropdown choices of `entry` against the current tree.
    pub fn resolve_options(tree: &SceneTree, entry: &RegistryEntry) -> Vec<String> {
        match entry.choices() {
            Choices::None => Vec::new(),
            Choices::Fixed(options) => options.clone(),
            Choices::KeysAt(address) => keys_at_address(tree, address),
        }
    }
}
