//! Comparison of two config trees.
//!
//! Trees are compared through their flattened `path = value` views, so
//! layout differences (colon paths vs. nested blocks, ordering, comments)
//! never show up as changes.

use crate::block::ConfigBlock;
use serde::Serialize;
use std::collections::BTreeMap;

/// A parameter whose value differs between the two trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedValue {
    pub path: String,
    pub old: String,
    pub new: String,
}

/// Differences between a left ("old") and right ("new") tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigDiff {
    /// Paths only present on the right, with their values.
    pub added: Vec<(String, String)>,
    /// Paths only present on the left, with their values.
    pub removed: Vec<(String, String)>,
    pub changed: Vec<ChangedValue>,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Render as `+ path = value`, `- path = value` and
    /// `~ path = old -> new` lines, sorted by path.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines: BTreeMap<&str, String> = BTreeMap::new();
        for (path, value) in &self.added {
            lines.insert(path, format!("+ {} = {}", path, value));
        }
        for (path, value) in &self.removed {
            lines.insert(path, format!("- {} = {}", path, value));
        }
        for change in &self.changed {
            lines.insert(
                &change.path,
                format!("~ {} = {} -> {}", change.path, change.old, change.new),
            );
        }
        lines.into_values().collect()
    }
}

/// Compare two trees by their flattened values.
pub fn compare(old: &ConfigBlock, new: &ConfigBlock) -> ConfigDiff {
    let left = old.to_map();
    let mut right = new.to_map();
    let mut diff = ConfigDiff::default();

    for (path, old_value) in left {
        match right.remove(&path) {
            Some(new_value) if new_value == old_value => {}
            Some(new_value) => diff.changed.push(ChangedValue {
                path,
                old: old_value,
                new: new_value,
            }),
            None => diff.removed.push((path, old_value)),
        }
    }
    diff.added = right.into_iter().collect();

    diff
}
