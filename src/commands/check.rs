//! Implementation of the `confblock check` command.
//!
//! Parses a config file and prints every non-fatal problem followed by a
//! one-line summary. Structural failures (an unterminated block, a missing
//! include) surface as parse errors with exit code 3.

use super::Settings;
use crate::cli::CheckArgs;
use confblock::block::{ConfigBlock, ParseReport};
use confblock::error::{CfgError, Result};
use std::path::Path;

/// Execute the `confblock check` command.
pub fn cmd_check(args: CheckArgs, settings: &Settings) -> Result<()> {
    let (block, report) = ConfigBlock::load_with(&args.file, &settings.parse)?;
    print!("{}", render_report(&args.file, &block, &report));

    if args.strict && !report.is_clean() {
        return Err(CfgError::UserError(format!(
            "{} has {} warning(s)",
            args.file.display(),
            report.warnings.len()
        )));
    }
    Ok(())
}

fn render_report(file: &Path, block: &ConfigBlock, report: &ParseReport) -> String {
    let mut out = String::new();
    for warning in &report.warnings {
        out.push_str(&format!("Warning: {}\n", warning));
    }
    out.push_str(&format!(
        "{}: {} parameter(s), {} warning(s)\n",
        file.display(),
        block.flatten().len(),
        report.warnings.len()
    ));
    out
}
