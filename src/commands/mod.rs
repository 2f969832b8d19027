//! Command implementations for confblock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the loading and output helpers they share.

mod check;
mod diff;
mod edit;
mod format;
mod query;
mod run;

use crate::cli::{Cli, Command, OutputArgs};
use confblock::block::{ConfigBlock, Layout, ParseOptions, SerializeOptions, split_assignment};
use confblock::error::{CfgError, Result};
use confblock::fs::atomic_write_file;
use std::path::Path;
use tracing::{debug, info};

/// Options every command derives from the global flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub parse: ParseOptions,
    /// One nesting level of the nested layout.
    pub indent: String,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            parse: ParseOptions {
                duplicate_blocks: cli.duplicate_blocks,
            },
            indent: " ".repeat(cli.indent),
        }
    }

    pub fn serialize(&self, layout: Layout) -> SerializeOptions {
        SerializeOptions {
            layout,
            indent: self.indent.clone(),
        }
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(&cli);

    match cli.command {
        Command::Get(args) => query::cmd_get(args, &settings),
        Command::Set(args) => edit::cmd_set(args, &settings),
        Command::Delete(args) => edit::cmd_delete(args, &settings),
        Command::List(args) => query::cmd_list(args, &settings),
        Command::Format(args) => format::cmd_format(args, &settings),
        Command::Check(args) => check::cmd_check(args, &settings),
        Command::Diff(args) => diff::cmd_diff(args, &settings),
        Command::Run(args) => run::cmd_run(args, &settings),
    }
}

/// Load a config file. Parse warnings are reported through the log.
pub(crate) fn load_config(path: &Path, settings: &Settings) -> Result<ConfigBlock> {
    let (block, report) = ConfigBlock::load_with(path, &settings.parse)?;
    debug!(
        file = %path.display(),
        parameters = block.flatten().len(),
        warnings = report.warnings.len(),
        "loaded config"
    );
    Ok(block)
}

/// Apply `path=value` assignments in order.
pub(crate) fn apply_assignments(block: &mut ConfigBlock, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (path, value) = split_assignment(assignment).ok_or_else(|| {
            CfgError::UserError(format!(
                "expected 'path=value', got '{}'",
                assignment
            ))
        })?;
        block.set(path, value)?;
    }
    Ok(())
}

/// Write rendered config text to the file chosen by `output`, or stdout.
pub(crate) fn write_output(text: &str, output: &OutputArgs, input: &Path) -> Result<()> {
    let target = if output.in_place {
        Some(input)
    } else {
        output.output.as_deref()
    };

    match target {
        Some(path) => {
            atomic_write_file(path, text)?;
            info!(file = %path.display(), "wrote config");
        }
        None => print!("{}", text),
    }
    Ok(())
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CfgError::UserError(format!("cannot encode JSON: {}", e)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Settings;
    use confblock::block::{DEFAULT_INDENT, ParseOptions};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub fn settings() -> Settings {
        Settings {
            parse: ParseOptions::default(),
            indent: DEFAULT_INDENT.to_string(),
        }
    }

    /// Write `content` to `name` inside a fresh temporary directory.
    pub fn config_file(name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        (dir, path)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::config_file;
    use super::*;
    use std::fs;

    #[test]
    fn assignments_are_applied_in_order() {
        let mut block = ConfigBlock::new();
        apply_assignments(
            &mut block,
            &["a:b = 1".to_string(), "a:b=2".to_string(), "c=".to_string()],
        )
        .unwrap();

        assert_eq!(block.get_value("a:b").unwrap(), "2");
        assert_eq!(block.get_value("c").unwrap(), "");
    }

    #[test]
    fn malformed_assignment_is_a_user_error() {
        let mut block = ConfigBlock::new();
        let err = apply_assignments(&mut block, &["no_equals".to_string()]).unwrap_err();

        assert!(matches!(err, CfgError::UserError(_)));
        assert!(block.is_empty());
    }

    #[test]
    fn write_output_in_place_replaces_input() {
        let (_dir, path) = config_file("a.conf", "x = 1\n");
        let output = OutputArgs {
            output: None,
            in_place: true,
        };

        write_output("x = 2\n", &output, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 2\n");
    }

    #[test]
    fn write_output_to_named_file() {
        let (dir, path) = config_file("a.conf", "x = 1\n");
        let target = dir.path().join("b.conf");
        let output = OutputArgs {
            output: Some(target.clone()),
            in_place: false,
        };

        write_output("x = 2\n", &output, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "x = 1\n");
        assert_eq!(fs::read_to_string(&target).unwrap(), "x = 2\n");
    }

    #[test]
    fn settings_follow_global_flags() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "confblock",
            "check",
            "a.conf",
            "--indent",
            "4",
            "--duplicate-blocks",
            "reject",
        ])
        .unwrap();

        let settings = Settings::from_cli(&cli);

        assert_eq!(settings.indent, "    ");
        assert_eq!(
            settings.parse.duplicate_blocks,
            confblock::block::DuplicateBlockPolicy::Reject
        );
        assert_eq!(settings.serialize(Layout::Flat).layout, Layout::Flat);
    }
}
