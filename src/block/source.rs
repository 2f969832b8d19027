//! Sequential line input shared by every level of a parse.
//!
//! Nested `block` bodies are parsed by recursive calls that all pull from the
//! same `LineSource`, so a body consumes exactly its own lines and the caller
//! resumes right after the matching `endblock`. `include` pushes a new file
//! on a stack; when it runs dry, reading resumes in the includer.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Maximum number of files open at once through `include`.
pub(crate) const MAX_INCLUDE_DEPTH: usize = 32;

/// Display name of input that did not come from a file.
pub(crate) const STREAM_NAME: &str = "<stream>";

struct Frame<'r> {
    reader: Box<dyn BufRead + 'r>,
    name: String,
    dir: PathBuf,
    line: usize,
}

pub(crate) struct LineSource<'r> {
    frames: Vec<Frame<'r>>,
}

impl<'r> LineSource<'r> {
    pub(crate) fn new(reader: Box<dyn BufRead + 'r>, name: String, dir: PathBuf) -> Self {
        Self {
            frames: vec![Frame {
                reader,
                name,
                dir,
                line: 0,
            }],
        }
    }

    /// Next raw line without its terminator, or `None` at the end of the
    /// outermost input.
    ///
    /// Input is read as bytes; sequences that are not UTF-8 (Latin-1
    /// comments in older files) are replaced with U+FFFD.
    pub(crate) fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };
            let mut bytes = Vec::new();
            if frame.reader.read_until(b'\n', &mut bytes)? == 0 {
                if self.frames.len() > 1 {
                    self.frames.pop();
                    continue;
                }
                return Ok(None);
            }
            frame.line += 1;
            while bytes.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
                bytes.pop();
            }
            return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
        }
    }

    /// Continue reading from `path` until it is exhausted.
    pub(crate) fn push_file(&mut self, path: &Path) -> Result<(), String> {
        if self.frames.len() >= MAX_INCLUDE_DEPTH {
            return Err(format!(
                "include depth exceeds {} (include cycle?)",
                MAX_INCLUDE_DEPTH
            ));
        }
        let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
        if !metadata.is_file() {
            return Err("not a regular file".to_string());
        }
        let file = File::open(path).map_err(|e| e.to_string())?;
        self.frames.push(Frame {
            reader: Box::new(BufReader::new(file)),
            name: path.display().to_string(),
            dir: parent_dir(path),
            line: 0,
        });
        Ok(())
    }

    /// Name and line number of the line most recently returned.
    pub(crate) fn position(&self) -> (String, usize) {
        match self.frames.last() {
            Some(frame) => (frame.name.clone(), frame.line),
            None => (STREAM_NAME.to_string(), 0),
        }
    }

    /// Directory that relative names in the current input resolve against.
    pub(crate) fn current_dir(&self) -> &Path {
        self.frames
            .last()
            .map(|frame| frame.dir.as_path())
            .unwrap_or(Path::new("."))
    }
}

/// Directory containing `path`, or `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
