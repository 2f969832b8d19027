//! Text rendering of a block tree.
//!
//! Two layouts are produced:
//! - **Nested**: `block <name>` / indented body / `endblock`. This is the
//!   layout external executables read with `-c <file>`.
//! - **Flat**: one fully qualified `path = value` line per scalar, with no
//!   block delimiters.
//!
//! Within a block, scalars come first, then child blocks, both sorted by
//! name. Blank lines separate the scalar group from each child block.

use super::model::ConfigBlock;
use crate::error::Result;
use crate::fs::atomic_write_file;
use std::fmt;
use std::path::Path;

/// Indentation used by `Display` and by default options.
pub const DEFAULT_INDENT: &str = "  ";

/// Which textual layout to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `block`/`endblock` delimited, indented bodies.
    #[default]
    Nested,
    /// Fully qualified `a:b:c = value` lines.
    Flat,
}

impl Layout {
    /// Parse a layout name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "nested" => Some(Self::Nested),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

/// Options for [`ConfigBlock::to_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub layout: Layout,
    /// Prefix added to each body line per nesting level (nested layout only).
    pub indent: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Nested,
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl SerializeOptions {
    pub fn nested(indent: impl Into<String>) -> Self {
        Self {
            layout: Layout::Nested,
            indent: indent.into(),
        }
    }

    pub fn flat() -> Self {
        Self {
            layout: Layout::Flat,
            ..Self::default()
        }
    }
}

impl ConfigBlock {
    /// Render the tree with the given options.
    ///
    /// Output ends with exactly one newline, or is empty for an empty tree.
    pub fn to_text(&self, options: &SerializeOptions) -> String {
        let lines = match options.layout {
            Layout::Nested => self.nested_lines(&options.indent),
            Layout::Flat => self.flat_lines(),
        };
        finish(lines)
    }

    /// Render in the nested layout with the given indent string.
    pub fn to_nested_string(&self, indent: &str) -> String {
        finish(self.nested_lines(indent))
    }

    /// Render in the flat layout.
    pub fn to_flat_string(&self) -> String {
        finish(self.flat_lines())
    }

    /// Write the tree to `path` atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P, options: &SerializeOptions) -> Result<()> {
        atomic_write_file(path, &self.to_text(options))
    }

    fn nested_lines(&self, indent: &str) -> Vec<String> {
        let mut lines: Vec<String> = self.values().map(|(k, v)| assignment(k, v)).collect();

        for (name, block) in self.blocks() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("block {}", name));
            for line in block.nested_lines(indent) {
                if line.is_empty() {
                    lines.push(line);
                } else {
                    lines.push(format!("{}{}", indent, line));
                }
            }
            lines.push("endblock".to_string());
        }

        lines
    }

    fn flat_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.values().map(|(k, v)| assignment(k, v)).collect();

        for (name, block) in self.blocks() {
            let body = block.flat_lines();
            // empty blocks have nothing to say in this layout
            if body.is_empty() {
                continue;
            }
            if !lines.is_empty() {
                lines.push(String::new());
            }
            for line in body {
                if line.is_empty() {
                    lines.push(line);
                } else {
                    lines.push(format!("{}:{}", name, line));
                }
            }
        }

        lines
    }
}

fn assignment(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{} =", name)
    } else {
        format!("{} = {}", name, value)
    }
}

fn finish(lines: Vec<String>) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// `{}` renders the nested layout with a two-space indent; `{:#}` renders
/// the flat layout.
impl fmt::Display for ConfigBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.to_flat_string())
        } else {
            f.write_str(&self.to_nested_string(DEFAULT_INDENT))
        }
    }
}
