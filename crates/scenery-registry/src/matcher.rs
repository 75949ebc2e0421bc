use std::fmt;

use regex::Regex;
use scenery_query::{address_for_node, key_for_node};
use scenery_tree::{NodeId, SceneTree};

/// What a registry entry is tested against: the key of the closest mapping
/// and the full address of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTarget<'a> {
    pub key: Option<&'a str>,
    pub address: String,
}

impl<'a> MatchTarget<'a> {
    pub fn of(tree: &'a SceneTree, node: NodeId) -> Self {
        Self { key: key_for_node(tree, node), address: address_for_node(tree, node).to_string() }
    }
}

pub trait Matcher: fmt::Debug + Send + Sync {
    fn matches(&self, target: &MatchTarget<'_>) -> bool;
}

/// Exact key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatcher {
    key: String,
}

impl KeyMatcher {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Matcher for KeyMatcher {
    fn matches(&self, target: &MatchTarget<'_>) -> bool {
        target.key == Some(self.key.as_str())
    }
}

/// Regular expression over the `:`-joined address. Anchors are only
/// applied where the pattern spells them out.
#[derive(Debug, Clone)]
pub struct AddressMatcher {
    pattern: Regex,
}

impl AddressMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { pattern: Regex::new(pattern)? })
    }
}

impl Matcher for AddressMatcher {
    fn matches(&self, target: &MatchTarget<'_>) -> bool {
        self.pattern.is_match(&target.address)
    }
}
