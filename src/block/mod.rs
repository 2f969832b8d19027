//! Hierarchical block configuration.
//!
//! A [`ConfigBlock`] is a tree node holding scalar values and named child
//! blocks, addressed with colon-delimited paths (`tracker:kalman:gain`).
//! Trees are parsed from and rendered to a line-oriented text format:
//!
//! ```text
//! # tracker settings
//! gsd = 0.5
//! block tracker
//!   max_age = 10
//!   kalman:gain = 0.2
//! endblock
//! ```
//!
//! ```
//! use confblock::block::ConfigBlock;
//!
//! let mut config: ConfigBlock = "a = 1\nblock b\nc = 2\nendblock\n".parse()?;
//! config.set("b:d:e", "3")?;
//! assert_eq!(config.get_value("b:d:e")?, "3");
//! assert!(config.contains("b:d"));
//! # Ok::<(), confblock::error::CfgError>(())
//! ```

mod model;
mod operations;
mod parser;
pub mod path;
mod serialize;
mod source;


// Re-export public API
pub use model::{ConfigBlock, Entry};
pub use parser::{
    DuplicateBlockPolicy, ParseOptions, ParseReport, ParseWarning, WarningKind, split_assignment,
};
pub use serialize::{DEFAULT_INDENT, Layout, SerializeOptions};
