//! Confblock: hierarchical block-format configuration.
//!
//! A config file is a tree of named parameters. Values are strings and are
//! addressed by colon-delimited paths (`tracker:kalman:gain`); groups are
//! written either with full paths or inside `block <name>` ... `endblock`
//! sections.
//!
//! - [`block`]: the tree, its parser and its two text layouts.
//! - [`compare`]: parameter-level differences between two trees.
//! - [`runner`]: starting an executable against a generated config file.

pub mod block;
pub mod compare;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod runner;

pub use block::{ConfigBlock, Entry};
pub use error::{CfgError, ParseError, Result};
