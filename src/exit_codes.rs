//! Exit code constants for the confblock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable file, invalid path or value)
//! - 2: Path not found, or resolved to the wrong kind of entry
//! - 3: Parse failure (unterminated block, failed include)
//! - 4: External executable failed or could not be started

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or a path/value that cannot be stored.
pub const USER_ERROR: i32 = 1;

/// Lookup failure: no value or block at the requested path.
pub const NOT_FOUND: i32 = 2;

/// Structural parse failure in a config file.
pub const PARSE_FAILURE: i32 = 3;

/// The invoked executable failed, timed out, or could not be spawned.
pub const EXEC_FAILURE: i32 = 4;
