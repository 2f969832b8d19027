//! Implementation of the `confblock set` and `confblock delete` commands.
//!
//! Both load the file, apply every change in memory, and only then write the
//! result, so a failing change leaves the output untouched.

use super::{Settings, apply_assignments, load_config, write_output};
use crate::cli::{DeleteArgs, SetArgs};
use confblock::block::{ConfigBlock, Layout};
use confblock::error::{CfgError, Result};
use tracing::{debug, info};

/// Execute the `confblock set` command.
pub fn cmd_set(args: SetArgs, settings: &Settings) -> Result<()> {
    let mut block = load_config(&args.file, settings)?;
    apply_assignments(&mut block, &args.assignments)?;
    info!(count = args.assignments.len(), "applied assignments");

    let text = block.to_text(&settings.serialize(Layout::Nested));
    write_output(&text, &args.output, &args.file)
}

/// Execute the `confblock delete` command.
pub fn cmd_delete(args: DeleteArgs, settings: &Settings) -> Result<()> {
    let mut block = load_config(&args.file, settings)?;
    let removed = delete_paths(&mut block, &args.paths, args.ignore_missing)?;
    info!(removed, "deleted paths");

    let text = block.to_text(&settings.serialize(Layout::Nested));
    write_output(&text, &args.output, &args.file)
}

/// Remove each path; returns how many were actually present.
fn delete_paths(block: &mut ConfigBlock, paths: &[String], ignore_missing: bool) -> Result<usize> {
    let mut removed = 0;
    for path in paths {
        match block.delete(path) {
            Ok(_) => removed += 1,
            Err(CfgError::NotFound { .. }) if ignore_missing => {
                debug!(path = %path, "nothing to delete");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}
