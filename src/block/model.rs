//! The block tree: named scalar values and nested blocks.

use serde::Serialize;
use std::collections::BTreeMap;

/// What a local name inside a block refers to.
///
/// A name holds either a scalar or a child block, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Value(String),
    Block(ConfigBlock),
}

impl Entry {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&ConfigBlock> {
        match self {
            Entry::Block(b) => Some(b),
            Entry::Value(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut ConfigBlock> {
        match self {
            Entry::Block(b) => Some(b),
            Entry::Value(_) => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Entry::Value(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Entry::Block(_))
    }

    /// Turn this slot into a block (dropping a scalar held here) and return it.
    pub(crate) fn make_block(&mut self, name: &str) -> &mut ConfigBlock {
        if self.is_value() {
            *self = Entry::Block(ConfigBlock::named(name));
        }
        match self {
            Entry::Block(b) => b,
            Entry::Value(_) => unreachable!("scalar replaced by a block above"),
        }
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Entry::Value(value)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Value(value.to_string())
    }
}

impl From<&String> for Entry {
    fn from(value: &String) -> Self {
        Entry::Value(value.clone())
    }
}

impl From<ConfigBlock> for Entry {
    fn from(block: ConfigBlock) -> Self {
        Entry::Block(block)
    }
}

/// A node of the configuration tree.
///
/// Entries are kept in a `BTreeMap`, so iteration (and therefore every
/// serialized form) is ordered lexicographically by local name. The block's
/// own `name` is informational; lookups go through the parent's keys.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigBlock {
    #[serde(skip)]
    pub(crate) name: Option<String>,
    pub(crate) entries: BTreeMap<String, Entry>,
}

impl ConfigBlock {
    /// Create an empty, unnamed block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty block carrying its own local name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Scalars held directly by this block, sorted by name.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            Entry::Value(v) => Some((name.as_str(), v.as_str())),
            Entry::Block(_) => None,
        })
    }

    /// Child blocks held directly by this block, sorted by name.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &ConfigBlock)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            Entry::Block(b) => Some((name.as_str(), b)),
            Entry::Value(_) => None,
        })
    }

    /// All direct entries, sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of direct entries (values plus child blocks).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Two trees are equal when they hold the same entries; the informational
// block name does not take part.
impl PartialEq for ConfigBlock {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ConfigBlock {}
