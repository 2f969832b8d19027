//! Path-addressed lookup, mutation and flattening.

use super::model::{ConfigBlock, Entry};
use super::path::{self, split_first};
use crate::error::{CfgError, Result};
use std::collections::BTreeMap;
use std::fmt::Display;

impl ConfigBlock {
    /// Look up a value or block by path.
    ///
    /// Returns `CfgError::NotFound` naming the full `path` when any segment
    /// is missing, or when an intermediate segment names a scalar.
    pub fn get(&self, path: &str) -> Result<&Entry> {
        self.lookup(path).ok_or_else(|| CfgError::not_found(path))
    }

    /// Look up a scalar by path.
    pub fn get_value(&self, path: &str) -> Result<&str> {
        self.get(path)?.as_value().ok_or_else(|| CfgError::WrongKind {
            path: path.to_string(),
            expected: "value",
        })
    }

    /// Look up a child block by path.
    pub fn get_block(&self, path: &str) -> Result<&ConfigBlock> {
        self.get(path)?.as_block().ok_or_else(|| CfgError::WrongKind {
            path: path.to_string(),
            expected: "block",
        })
    }

    /// Look up a child block by path for in-place mutation.
    pub fn get_block_mut(&mut self, path: &str) -> Result<&mut ConfigBlock> {
        let entry = self
            .lookup_mut(path)
            .ok_or_else(|| CfgError::not_found(path))?;
        entry.as_block_mut().ok_or_else(|| CfgError::WrongKind {
            path: path.to_string(),
            expected: "block",
        })
    }

    /// Whether `path` resolves to a value or block.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Set a scalar or graft a block at `path`.
    ///
    /// Missing intermediate blocks are created. The terminal name is replaced
    /// whatever it held before: a scalar assignment drops a same-named block
    /// and a block assignment drops a same-named scalar. Traversing through
    /// an existing scalar is a `WrongKind` error.
    pub fn set(&mut self, path: &str, value: impl Into<Entry>) -> Result<()> {
        let entry = value.into();
        path::validate(path)?;
        if let Entry::Value(v) = &entry {
            path::validate_value(path, v)?;
        }
        self.insert_at(path, path, entry)
    }

    /// Set a scalar from anything displayable (numbers, booleans, paths...).
    pub fn set_value(&mut self, path: &str, value: impl Display) -> Result<()> {
        self.set(path, value.to_string())
    }

    /// Remove the value or block at `path` and return it.
    ///
    /// Never creates intermediate blocks.
    pub fn delete(&mut self, path: &str) -> Result<Entry> {
        self.remove_at(path)
            .ok_or_else(|| CfgError::not_found(path))
    }

    /// Every scalar reachable from this block with its fully qualified path.
    ///
    /// Order matches the serialized layouts: a block's own values (sorted)
    /// come before its children (sorted), depth first.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    /// `flatten` collected into a map keyed by full path.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.flatten().into_iter().collect()
    }

    /// Overlay `other` onto this block.
    ///
    /// Blocks present on both sides are merged recursively; everything else
    /// from `other` replaces what is here.
    pub fn merge(&mut self, other: &ConfigBlock) {
        for (name, incoming) in &other.entries {
            match incoming {
                Entry::Block(src) => {
                    let slot = self
                        .entries
                        .entry(name.clone())
                        .or_insert_with(|| Entry::Block(ConfigBlock::named(name.as_str())));
                    slot.make_block(name).merge(src);
                }
                Entry::Value(v) => {
                    self.entries.insert(name.clone(), Entry::Value(v.clone()));
                }
            }
        }
    }

    /// Return the block at `path`, creating it (and every missing or scalar
    /// segment on the way) when needed.
    pub(crate) fn ensure_block(&mut self, path: &str) -> &mut ConfigBlock {
        let (head, rest) = split_first(path);
        let child = self
            .entries
            .entry(head.to_string())
            .or_insert_with(|| Entry::Block(ConfigBlock::named(head)))
            .make_block(head);
        match rest {
            Some(rest) => child.ensure_block(rest),
            None => child,
        }
    }

    fn lookup(&self, path: &str) -> Option<&Entry> {
        match split_first(path) {
            (head, Some(rest)) => self.entries.get(head)?.as_block()?.lookup(rest),
            (name, None) => self.entries.get(name),
        }
    }

    fn lookup_mut(&mut self, path: &str) -> Option<&mut Entry> {
        match split_first(path) {
            (head, Some(rest)) => self.entries.get_mut(head)?.as_block_mut()?.lookup_mut(rest),
            (name, None) => self.entries.get_mut(name),
        }
    }

    fn insert_at(&mut self, path: &str, full: &str, entry: Entry) -> Result<()> {
        match split_first(path) {
            (head, Some(rest)) => {
                let slot = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(|| Entry::Block(ConfigBlock::named(head)));
                match slot {
                    Entry::Block(child) => child.insert_at(rest, full, entry),
                    Entry::Value(_) => {
                        let consumed = &full[..full.len() - path.len()];
                        Err(CfgError::WrongKind {
                            path: format!("{}{}", consumed, head),
                            expected: "block",
                        })
                    }
                }
            }
            (name, None) => {
                let entry = match entry {
                    Entry::Block(mut block) => {
                        block.name = Some(name.to_string());
                        Entry::Block(block)
                    }
                    value => value,
                };
                self.entries.insert(name.to_string(), entry);
                Ok(())
            }
        }
    }

    fn remove_at(&mut self, path: &str) -> Option<Entry> {
        match split_first(path) {
            (head, Some(rest)) => self.entries.get_mut(head)?.as_block_mut()?.remove_at(rest),
            (name, None) => self.entries.remove(name),
        }
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for (name, value) in self.values() {
            out.push((path::join(prefix, name), value.to_string()));
        }
        for (name, block) in self.blocks() {
            block.flatten_into(&path::join(prefix, name), out);
        }
    }
}
