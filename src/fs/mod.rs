//! Filesystem utilities for confblock.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
