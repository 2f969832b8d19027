//! Hand-off of a generated config file to an external executable.
//!
//! Tools that consume block-format configs are started as
//! `<program> -c <config> [args...]`. Their stdout and stderr are captured
//! to `<log_dir>/<program>_out.txt` and `<log_dir>/<program>_err.txt`, and
//! every run is appended as one JSON object to `<log_dir>/runs.ndjson`.

use crate::error::{CfgError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Flag most consumers use to receive their config file.
pub const DEFAULT_CONFIG_FLAG: &str = "-c";

/// Name of the run log inside the log directory.
pub const RUN_LOG_NAME: &str = "runs.ndjson";

/// What to run and where to put its output.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub program: String,
    /// Extra arguments placed after the config flag and path.
    pub args: Vec<String>,
    pub config_path: PathBuf,
    pub config_flag: String,
    pub log_dir: PathBuf,
    /// Kill the process after this long; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl RunRequest {
    pub fn new(program: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            config_path: config_path.into(),
            config_flag: DEFAULT_CONFIG_FLAG.to_string(),
            log_dir: PathBuf::from("."),
            timeout: None,
        }
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        if !self.config_flag.is_empty() {
            argv.push(self.config_flag.clone());
        }
        argv.push(self.config_path.display().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Shell-quoted command line, for logs.
    pub fn command_line(&self) -> String {
        shell_words::join(self.argv())
    }

    fn log_stem(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run".to_string())
    }
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Exit code (None if killed or terminated by a signal).
    pub exit_code: Option<i32>,
    pub stdout_path: PathBuf,
    pub stderr_path: PathBuf,
    pub duration: Duration,
    pub timed_out: bool,
    pub command: String,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// One line of the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub ts: DateTime<Utc>,
    /// `user@host` of whoever started the run.
    pub actor: String,
    pub command: String,
    pub config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub timed_out: bool,
}

impl RunRecord {
    fn from_result(request: &RunRequest, result: &RunResult) -> Self {
        Self {
            ts: Utc::now(),
            actor: actor_string(),
            command: result.command.clone(),
            config: request.config_path.display().to_string(),
            exit_code: result.exit_code,
            duration_ms: u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            timed_out: result.timed_out,
        }
    }
}

/// Run the external program and record the run.
///
/// A non-zero exit is not an error here; callers inspect
/// [`RunResult::is_success`]. Failing to start the program is.
pub fn execute(request: &RunRequest) -> Result<RunResult> {
    if request.program.trim().is_empty() {
        return Err(CfgError::UserError("no program to run".to_string()));
    }

    fs::create_dir_all(&request.log_dir).map_err(|e| {
        CfgError::io(
            format!(
                "failed to create log directory '{}'",
                request.log_dir.display()
            ),
            e,
        )
    })?;

    let stem = request.log_stem();
    let stdout_path = request.log_dir.join(format!("{}_out.txt", stem));
    let stderr_path = request.log_dir.join(format!("{}_err.txt", stem));
    let stdout_file = create_log(&stdout_path)?;
    let stderr_file = create_log(&stderr_path)?;

    let argv = request.argv();
    let command_line = request.command_line();

    let mut command = Command::new(&argv[0]);
    command
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file));

    info!(command = %command_line, "starting");
    let start_time = Instant::now();
    let mut child = command.spawn().map_err(|e| {
        CfgError::ExecError(format!(
            "failed to start '{}': {}\nFix: ensure the program is installed and in PATH.",
            request.program, e
        ))
    })?;

    let (exit_code, timed_out) = wait_with_timeout(&mut child, request.timeout)?;
    let duration = start_time.elapsed();

    if timed_out {
        warn!(command = %command_line, ?duration, "killed after timeout");
    } else {
        info!(command = %command_line, ?exit_code, ?duration, "finished");
    }

    let result = RunResult {
        exit_code,
        stdout_path,
        stderr_path,
        duration,
        timed_out,
        command: command_line,
    };

    let record = RunRecord::from_result(request, &result);
    append_run_record(&request.log_dir, &record)?;

    Ok(result)
}

/// Append a record to `<log_dir>/runs.ndjson`.
pub fn append_run_record(log_dir: &Path, record: &RunRecord) -> Result<()> {
    let path = log_dir.join(RUN_LOG_NAME);
    let line = serde_json::to_string(record)
        .map_err(|e| CfgError::UserError(format!("failed to serialize run record: {}", e)))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| CfgError::io(format!("failed to open run log '{}'", path.display()), e))?;
    writeln!(file, "{}", line)
        .map_err(|e| CfgError::io(format!("failed to write run log '{}'", path.display()), e))
}

/// Read every record from `<log_dir>/runs.ndjson`, oldest first.
pub fn read_run_records(log_dir: &Path) -> Result<Vec<RunRecord>> {
    let path = log_dir.join(RUN_LOG_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CfgError::io(
                format!("failed to read run log '{}'", path.display()),
                e,
            ));
        }
    };

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                CfgError::UserError(format!(
                    "invalid run record at {}:{}: {}",
                    path.display(),
                    i + 1,
                    e
                ))
            })
        })
        .collect()
}

fn create_log(path: &Path) -> Result<File> {
    File::create(path)
        .map_err(|e| CfgError::io(format!("failed to create log '{}'", path.display()), e))
}

/// Returns (exit_code, timed_out).
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<(Option<i32>, bool)> {
    let Some(timeout) = timeout else {
        let status = child
            .wait()
            .map_err(|e| CfgError::ExecError(format!("failed to wait for process: {}", e)))?;
        return Ok((status.code(), false));
    };

    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    // SIGKILL on Unix, TerminateProcess on Windows
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok((None, true));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(CfgError::ExecError(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

/// Actor string in the form `USER@HOSTNAME`.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());
    format!("{}@{}", user, host)
}
