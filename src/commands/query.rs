//! Implementation of the `confblock get` and `confblock list` commands.

use super::{Settings, load_config, to_json};
use crate::cli::{GetArgs, ListArgs};
use confblock::block::{ConfigBlock, Entry, Layout};
use confblock::error::{CfgError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;

/// Execute the `confblock get` command.
///
/// A value prints as-is; a block prints as nested config text relative to
/// that block.
pub fn cmd_get(args: GetArgs, settings: &Settings) -> Result<()> {
    let block = load_config(&args.file, settings)?;
    print!("{}", render_get(&block, &args.path, args.json, settings)?);
    Ok(())
}

fn render_get(block: &ConfigBlock, path: &str, json: bool, settings: &Settings) -> Result<String> {
    let entry = block.get(path)?;
    if json {
        return Ok(format!("{}\n", to_json(entry)?));
    }
    Ok(match entry {
        Entry::Value(value) => format!("{}\n", value),
        Entry::Block(child) => child.to_text(&settings.serialize(Layout::Nested)),
    })
}

/// Execute the `confblock list` command.
pub fn cmd_list(args: ListArgs, settings: &Settings) -> Result<()> {
    let block = load_config(&args.file, settings)?;
    print!("{}", render_list(&block, &args.patterns, args.json)?);
    Ok(())
}

fn render_list(block: &ConfigBlock, patterns: &[String], json: bool) -> Result<String> {
    let filter = build_filter(patterns)?;
    let matches: Vec<(String, String)> = block
        .flatten()
        .into_iter()
        .filter(|(path, _)| filter.as_ref().is_none_or(|set| set.is_match(path)))
        .collect();

    if json {
        let map: BTreeMap<String, String> = matches.into_iter().collect();
        return Ok(format!("{}\n", to_json(&map)?));
    }

    let mut out = String::new();
    for (path, value) in matches {
        if value.is_empty() {
            out.push_str(&format!("{} =\n", path));
        } else {
            out.push_str(&format!("{} = {}\n", path, value));
        }
    }
    Ok(out)
}

/// Compile `--match` patterns. `None` means everything matches.
fn build_filter(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            CfgError::UserError(format!("invalid pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| CfgError::UserError(format!("invalid patterns: {}", e)))
}
