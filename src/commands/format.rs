//! Implementation of the `confblock format` command.

use super::{Settings, load_config, write_output};
use crate::cli::FormatArgs;
use confblock::error::Result;

/// Execute the `confblock format` command.
///
/// Comments, include directives and the original ordering are not kept:
/// the output is the canonical rendering of the parsed tree.
pub fn cmd_format(args: FormatArgs, settings: &Settings) -> Result<()> {
    let block = load_config(&args.file, settings)?;
    let text = block.to_text(&settings.serialize(args.layout));
    write_output(&text, &args.output, &args.file)
}
