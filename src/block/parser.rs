//! Block-format parser.
//!
//! Grammar, one directive per line (surrounding whitespace ignored):
//!
//! ```text
//! # comment
//! name = value              assignment, split at the first '='
//! a:b:name = value          assignment into nested blocks
//! relativepath name = file  value resolved against the file's directory
//! block name                opens a (possibly colon-delimited) block
//! endblock                  closes the innermost open block
//! include file              reads another file in place
//! ```
//!
//! Any line containing `=` is an assignment. Unrecognised lines are
//! reported as warnings and skipped; an unterminated block or a failed
//! include aborts the whole parse.

use super::model::ConfigBlock;
use super::path;
use super::source::{LineSource, STREAM_NAME, parent_dir};
use crate::error::{CfgError, ParseError, ParseErrorKind, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// What to do with a second `block <name>` directive for the same name at
/// the same level of one parse.
///
/// Blocks that exist for other reasons (created by a colon-path assignment,
/// or present before a layered parse) are never treated as duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateBlockPolicy {
    /// Parse the new body into the existing block (default).
    #[default]
    Merge,
    /// Warn and skip the new body entirely.
    Reject,
}

impl DuplicateBlockPolicy {
    /// Parse a policy name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "merge" => Some(Self::Merge),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Knobs for a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub duplicate_blocks: DuplicateBlockPolicy,
}

/// Category of a non-fatal parse problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Line matches no directive.
    MalformedLine,
    /// `endblock` with no open block.
    StrayEndblock,
    /// Repeated `block` under `DuplicateBlockPolicy::Reject`; body skipped.
    DuplicateBlock,
    /// `block` name that is not a valid path; body skipped.
    RejectedBlock,
    /// Assignment the tree refused (bad name, or a path through a scalar).
    RejectedAssignment,
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub source_name: String,
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: '{}'",
            self.source_name, self.line, self.message, self.text
        )
    }
}

/// Warnings collected by a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    /// True when nothing was skipped or rejected.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A classified input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive<'a> {
    Blank,
    Comment,
    Assign { name: &'a str, value: &'a str },
    RelativePath { name: &'a str, value: &'a str },
    Block(&'a str),
    EndBlock,
    Include(&'a str),
    Malformed,
}

pub(crate) fn classify(line: &str) -> Directive<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Directive::Blank;
    }
    if line.starts_with('#') {
        return Directive::Comment;
    }
    if line.contains('=') {
        return match split_assignment(line) {
            Some((name, value)) => match keyword_argument(name, "relativepath") {
                Some(name) => Directive::RelativePath { name, value },
                None => Directive::Assign { name, value },
            },
            None => Directive::Malformed,
        };
    }
    if line == "endblock" {
        return Directive::EndBlock;
    }
    if let Some(name) = keyword_argument(line, "block") {
        return Directive::Block(name);
    }
    if let Some(file) = keyword_argument(line, "include") {
        return Directive::Include(file);
    }
    Directive::Malformed
}

/// Split `name = value` at the first `=`, trimming both sides.
///
/// Returns `None` when there is no `=` or the name is empty.
pub fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let (name, value) = text.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// `keyword <argument>` -> the trimmed argument.
fn keyword_argument<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let argument = rest.trim();
    (!argument.is_empty()).then_some(argument)
}

/// Where the block currently being filled was opened.
struct Opening {
    source_name: String,
    line: usize,
}

struct Parser<'r, 'o> {
    source: LineSource<'r>,
    options: &'o ParseOptions,
    report: ParseReport,
}

type Step = std::result::Result<(), ParseError>;

impl Parser<'_, '_> {
    /// Fill `block` until its `endblock` (or end of input at the root).
    fn parse_body(
        &mut self,
        block: &mut ConfigBlock,
        chain: &mut Vec<String>,
        opened: Option<&Opening>,
    ) -> Step {
        // names opened by `block` directives at this level
        let mut seen = BTreeSet::new();
        loop {
            let Some(raw) = self.read_line(chain)? else {
                return match opened {
                    None => Ok(()),
                    Some(opening) => Err(unterminated(opening, chain.clone())),
                };
            };

            match classify(&raw) {
                Directive::Blank | Directive::Comment => {}
                Directive::Assign { name, value } => self.assign(block, name, value, &raw),
                Directive::RelativePath { name, value } => {
                    let resolved = self.source.current_dir().join(value);
                    let resolved = resolved.display().to_string();
                    self.assign(block, name, &resolved, &raw);
                }
                Directive::EndBlock => {
                    if opened.is_some() {
                        return Ok(());
                    }
                    self.warn(
                        WarningKind::StrayEndblock,
                        &raw,
                        "endblock without a matching block",
                    );
                }
                Directive::Block(name) => self.open_block(block, name, chain, &mut seen, &raw)?,
                Directive::Include(file) => self.include(file, chain)?,
                Directive::Malformed => {
                    self.warn(WarningKind::MalformedLine, &raw, "unable to parse line")
                }
            }
        }
    }

    fn open_block(
        &mut self,
        block: &mut ConfigBlock,
        name: &str,
        chain: &mut Vec<String>,
        seen: &mut BTreeSet<String>,
        raw: &str,
    ) -> Step {
        let (source_name, line) = self.source.position();
        let opening = Opening { source_name, line };

        if let Err(e) = path::validate(name) {
            self.warn(
                WarningKind::RejectedBlock,
                raw,
                &format!("{}; skipping block body", e),
            );
            return self.skip_body(name, chain, &opening);
        }

        let repeated = !seen.insert(name.to_string());
        if repeated && self.options.duplicate_blocks == DuplicateBlockPolicy::Reject {
            self.warn(
                WarningKind::DuplicateBlock,
                raw,
                "duplicate block; skipping block body",
            );
            return self.skip_body(name, chain, &opening);
        }

        let child = block.ensure_block(name);
        let depth = chain.len();
        chain.extend(name.split(path::SEPARATOR).map(str::to_string));
        let result = self.parse_body(child, chain, Some(&opening));
        chain.truncate(depth);
        result
    }

    /// Consume a block body without applying it.
    fn skip_body(&mut self, name: &str, chain: &[String], opening: &Opening) -> Step {
        let mut depth = 1usize;
        while depth > 0 {
            let Some(raw) = self.read_line(chain)? else {
                let mut blocks = chain.to_vec();
                blocks.push(name.to_string());
                return Err(unterminated(opening, blocks));
            };
            match classify(&raw) {
                Directive::Block(_) => depth += 1,
                Directive::EndBlock => depth -= 1,
                Directive::Include(file) => self.include(file, chain)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn include(&mut self, file: &str, chain: &[String]) -> Step {
        let requested = Path::new(file);
        let target = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.source.current_dir().join(requested)
        };

        self.source.push_file(&target).map_err(|reason| {
            let (source_name, line) = self.source.position();
            ParseError {
                kind: ParseErrorKind::IncludeFailed {
                    path: target.display().to_string(),
                    reason,
                },
                source_name,
                line,
                blocks: chain.to_vec(),
            }
        })
    }

    fn assign(&mut self, block: &mut ConfigBlock, name: &str, value: &str, raw: &str) {
        if let Err(e) = block.set(name, value) {
            self.warn(WarningKind::RejectedAssignment, raw, &e.to_string());
        }
    }

    fn read_line(&mut self, chain: &[String]) -> std::result::Result<Option<String>, ParseError> {
        self.source.next_line().map_err(|e| {
            let (source_name, line) = self.source.position();
            ParseError {
                kind: ParseErrorKind::Read(e.to_string()),
                source_name,
                line,
                blocks: chain.to_vec(),
            }
        })
    }

    fn warn(&mut self, kind: WarningKind, raw: &str, message: &str) {
        let (source_name, line) = self.source.position();
        let text = raw.trim().to_string();
        warn!(source = %source_name, line, "{}: '{}'", message, text);
        self.report.warnings.push(ParseWarning {
            kind,
            source_name,
            line,
            text,
            message: message.to_string(),
        });
    }
}

fn unterminated(opening: &Opening, blocks: Vec<String>) -> ParseError {
    ParseError {
        kind: ParseErrorKind::UnterminatedBlock,
        source_name: opening.source_name.clone(),
        line: opening.line,
        blocks,
    }
}

impl ConfigBlock {
    /// Parse block-format text from `reader` into this block.
    ///
    /// Existing content is kept; parsed entries are layered on top with the
    /// same semantics as [`ConfigBlock::set`]. On error the block is left
    /// exactly as it was.
    pub fn parse<'r, R: BufRead + 'r>(&mut self, reader: R) -> Result<ParseReport> {
        self.parse_with(reader, &ParseOptions::default())
    }

    /// [`ConfigBlock::parse`] with explicit options.
    ///
    /// `include` and `relativepath` resolve against the current directory.
    pub fn parse_with<'r, R: BufRead + 'r>(
        &mut self,
        reader: R,
        options: &ParseOptions,
    ) -> Result<ParseReport> {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let source = LineSource::new(Box::new(reader), STREAM_NAME.to_string(), dir);
        self.parse_source(source, options)
    }

    /// Parse a file into this block.
    ///
    /// `include` and `relativepath` resolve against the file's directory.
    pub fn parse_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &ParseOptions,
    ) -> Result<ParseReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CfgError::io(
                format!("failed to read config file '{}'", path.display()),
                e,
            )
        })?;
        let source = LineSource::new(
            Box::new(BufReader::new(file)),
            path.display().to_string(),
            parent_dir(path),
        );
        self.parse_source(source, options)
    }

    /// Load a config file into a new tree with default options.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, &ParseOptions::default()).map(|(block, _)| block)
    }

    /// Load a config file into a new tree, returning the parse warnings too.
    pub fn load_with<P: AsRef<Path>>(
        path: P,
        options: &ParseOptions,
    ) -> Result<(Self, ParseReport)> {
        let mut block = Self::new();
        let report = block.parse_file(path, options)?;
        Ok((block, report))
    }

    fn parse_source(&mut self, source: LineSource<'_>, options: &ParseOptions) -> Result<ParseReport> {
        let mut staged = self.clone();
        let mut parser = Parser {
            source,
            options,
            report: ParseReport::default(),
        };
        parser.parse_body(&mut staged, &mut Vec::new(), None)?;
        *self = staged;
        Ok(parser.report)
    }
}

impl FromStr for ConfigBlock {
    type Err = CfgError;

    fn from_str(s: &str) -> Result<Self> {
        let mut block = Self::new();
        block.parse(s.as_bytes())?;
        Ok(block)
    }
}
