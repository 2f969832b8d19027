//! Implementation of the `confblock run` command.
//!
//! Loads a base config, applies `--set` overrides, writes the result to a
//! file and starts the program with that file. Output capture and the run
//! log are handled by [`confblock::runner`].

use super::{Settings, apply_assignments, load_config};
use crate::cli::RunArgs;
use confblock::block::Layout;
use confblock::error::{CfgError, Result};
use confblock::runner::{self, RunRequest};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Execute the `confblock run` command.
pub fn cmd_run(args: RunArgs, settings: &Settings) -> Result<()> {
    let (program, program_args) = args
        .command
        .split_first()
        .ok_or_else(|| CfgError::UserError("no program given after '--'".to_string()))?;

    let mut block = load_config(&args.file, settings)?;
    apply_assignments(&mut block, &args.assignments)?;

    let config_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_config_path(&args.log_dir, program));
    block.save(&config_path, &settings.serialize(Layout::Nested))?;
    info!(file = %config_path.display(), "wrote generated config");

    let request = RunRequest {
        program: program.clone(),
        args: program_args.to_vec(),
        config_path,
        config_flag: args.config_flag.clone(),
        log_dir: args.log_dir.clone(),
        timeout: args.timeout.map(Duration::from_secs),
    };
    let result = runner::execute(&request)?;

    println!("Command: {}", result.command);
    println!("Stdout:  {}", result.stdout_path.display());
    println!("Stderr:  {}", result.stderr_path.display());

    if result.timed_out {
        return Err(CfgError::ExecError(format!(
            "'{}' did not finish within {}s",
            program,
            args.timeout.unwrap_or_default()
        )));
    }
    match result.exit_code {
        Some(0) => {
            println!("Finished in {:.2}s", result.duration.as_secs_f64());
            Ok(())
        }
        Some(code) => Err(CfgError::ExecError(format!(
            "'{}' exited with code {} (see {})",
            program,
            code,
            result.stderr_path.display()
        ))),
        None => Err(CfgError::ExecError(format!(
            "'{}' was terminated by a signal",
            program
        ))),
    }
}

/// `<log_dir>/<program file name>.conf`
fn default_config_path(log_dir: &Path, program: &str) -> PathBuf {
    let stem = Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    log_dir.join(format!("{}.conf", stem))
}
