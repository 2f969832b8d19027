//! CLI argument parsing for confblock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use confblock::block::{DuplicateBlockPolicy, Layout};
use std::path::PathBuf;

/// Confblock: read, query and rewrite nested block configuration files.
///
/// Config files hold `name = value` lines grouped in `block <name>` ...
/// `endblock` sections. Parameters are addressed with colon paths such as
/// `tracker:kalman:gain`.
#[derive(Parser, Debug)]
#[command(name = "confblock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// How a repeated `block <name>` is handled: merge or reject.
    #[arg(
        long,
        global = true,
        env = "CONFBLOCK_DUPLICATE_BLOCKS",
        default_value = "merge",
        value_parser = parse_duplicate_policy
    )]
    pub duplicate_blocks: DuplicateBlockPolicy,

    /// Spaces per nesting level when writing the nested layout.
    #[arg(long, global = true, env = "CONFBLOCK_INDENT", default_value_t = 2)]
    pub indent: usize,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for confblock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value (or block) at a path.
    Get(GetArgs),

    /// Set one or more `path=value` parameters and write the result.
    Set(SetArgs),

    /// Remove one or more paths and write the result.
    Delete(DeleteArgs),

    /// List every parameter as `full:path = value`.
    List(ListArgs),

    /// Re-render a config file in the nested or flat layout.
    Format(FormatArgs),

    /// Parse a config file and report problems.
    Check(CheckArgs),

    /// Show parameter differences between two config files.
    Diff(DiffArgs),

    /// Generate a config file and run an executable against it.
    ///
    /// The program is started as `<program> -c <generated file> [args...]`
    /// with stdout/stderr captured in the log directory.
    Run(RunArgs),
}

/// Where an edited config is written.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write to this file instead of stdout.
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file.
    #[arg(short, long)]
    pub in_place: bool,
}

/// Arguments for the `get` command.
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Config file to read.
    pub file: PathBuf,

    /// Colon-delimited path (e.g. tracker:max_age).
    pub path: String,

    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `set` command.
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Config file to read.
    pub file: PathBuf,

    /// Assignments in the form `path=value`.
    #[arg(required = true)]
    pub assignments: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `delete` command.
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Config file to read.
    pub file: PathBuf,

    /// Paths to remove.
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Ignore paths that do not exist.
    #[arg(long)]
    pub ignore_missing: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Config file to read.
    pub file: PathBuf,

    /// Only list paths matching these glob patterns (e.g. 'tracker:*').
    #[arg(short = 'm', long = "match")]
    pub patterns: Vec<String>,

    /// Print as a JSON object.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `format` command.
#[derive(Parser, Debug)]
pub struct FormatArgs {
    /// Config file to read.
    pub file: PathBuf,

    /// Output layout: nested or flat.
    #[arg(long, default_value = "nested", value_parser = parse_layout)]
    pub layout: Layout,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Config file to check.
    pub file: PathBuf,

    /// Treat warnings as failures.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `diff` command.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Original config file.
    pub old: PathBuf,

    /// Modified config file.
    pub new: PathBuf,

    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Base config file.
    pub file: PathBuf,

    /// Override a parameter before writing (repeatable): `path=value`.
    #[arg(short, long = "set")]
    pub assignments: Vec<String>,

    /// Where to write the generated config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for captured output and the run log.
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Kill the program after this many seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Flag that precedes the config path.
    #[arg(long, default_value = "-c", allow_hyphen_values = true)]
    pub config_flag: String,

    /// Program followed by its own arguments.
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

fn parse_layout(s: &str) -> Result<Layout, String> {
    Layout::from_str(s).ok_or_else(|| format!("unknown layout '{}' (expected nested or flat)", s))
}

fn parse_duplicate_policy(s: &str) -> Result<DuplicateBlockPolicy, String> {
    DuplicateBlockPolicy::from_str(s)
        .ok_or_else(|| format!("unknown policy '{}' (expected merge or reject)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_with_output() {
        let cli = Cli::try_parse_from([
            "confblock",
            "set",
            "track.conf",
            "tracker:gsd=0.5",
            "writer:disabled=false",
            "-o",
            "out.conf",
        ])
        .unwrap();

        match cli.command {
            Command::Set(args) => {
                assert_eq!(args.assignments, vec!["tracker:gsd=0.5", "writer:disabled=false"]);
                assert_eq!(args.output.output, Some(PathBuf::from("out.conf")));
                assert!(!args.output.in_place);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_and_in_place_conflict() {
        let result = Cli::try_parse_from([
            "confblock",
            "delete",
            "a.conf",
            "x",
            "-o",
            "b.conf",
            "--in-place",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_run_with_trailing_command() {
        let cli = Cli::try_parse_from([
            "confblock",
            "run",
            "base.conf",
            "--set",
            "classifier:gsd=0.35",
            "--timeout",
            "60",
            "--",
            "classify_and_filter_tracks",
            "--verbose",
        ])
        .unwrap();

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.assignments, vec!["classifier:gsd=0.35"]);
                assert_eq!(args.timeout, Some(60));
                assert_eq!(args.config_flag, "-c");
                assert_eq!(args.command, vec!["classify_and_filter_tracks", "--verbose"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_layout_and_global_flags() {
        let cli = Cli::try_parse_from([
            "confblock",
            "format",
            "a.conf",
            "--layout",
            "flat",
            "--duplicate-blocks",
            "reject",
            "--indent",
            "4",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.duplicate_blocks, DuplicateBlockPolicy::Reject);
        assert_eq!(cli.indent, 4);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Format(args) => assert_eq!(args.layout, Layout::Flat),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_layout() {
        let result = Cli::try_parse_from(["confblock", "format", "a.conf", "--layout", "yaml"]);
        assert!(result.is_err());
    }
}
