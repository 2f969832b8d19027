//! Implementation of the `confblock diff` command.

use super::{Settings, load_config, to_json};
use crate::cli::DiffArgs;
use confblock::compare::{ConfigDiff, compare};
use confblock::error::Result;

/// Execute the `confblock diff` command.
///
/// Differences are reported by parameter path, so two files that differ
/// only in layout compare equal.
pub fn cmd_diff(args: DiffArgs, settings: &Settings) -> Result<()> {
    let old = load_config(&args.old, settings)?;
    let new = load_config(&args.new, settings)?;
    let diff = compare(&old, &new);
    print!("{}", render_diff(&diff, args.json)?);
    Ok(())
}

fn render_diff(diff: &ConfigDiff, json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", to_json(diff)?));
    }
    if diff.is_empty() {
        return Ok("No differences.\n".to_string());
    }

    let mut out = diff.to_lines().join("\n");
    out.push('\n');
    Ok(out)
}
