//! Colon-delimited path addressing.
//!
//! A path like `tracker:kalman:gain` names `gain` inside block `kalman`
//! inside block `tracker`. Paths are always split on the first separator;
//! the remainder is resolved against the child named by the head.

use crate::error::{CfgError, Result};

/// Separator between path segments.
pub const SEPARATOR: char = ':';

/// Split a path into its first segment and the (possibly colon-bearing) rest.
pub fn split_first(path: &str) -> (&str, Option<&str>) {
    match path.split_once(SEPARATOR) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Join a parent path and a local name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// Check that every segment of `path` can be written out and read back.
pub fn validate(path: &str) -> Result<()> {
    for segment in path.split(SEPARATOR) {
        if let Err(reason) = check_segment(segment) {
            return Err(CfgError::InvalidPath {
                path: path.to_string(),
                reason,
            });
        }
    }
    Ok(())
}

/// Check that a value can be written out and read back unchanged.
pub fn validate_value(path: &str, value: &str) -> Result<()> {
    let reason = if value.contains(['\n', '\r']) {
        Some("values cannot contain line breaks")
    } else if value.trim() != value {
        Some("values cannot have leading or trailing whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CfgError::InvalidValue {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn check_segment(segment: &str) -> std::result::Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty path segment");
    }
    if segment.trim() != segment {
        return Err("names cannot have leading or trailing whitespace");
    }
    if segment.contains('=') {
        return Err("names cannot contain '='");
    }
    if segment.contains(['\n', '\r']) {
        return Err("names cannot contain line breaks");
    }
    if segment.starts_with('#') {
        return Err("names cannot start with '#'");
    }
    if segment
        .strip_prefix("relativepath")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    {
        return Err("names cannot start with the 'relativepath' keyword");
    }
    Ok(())
}
