//! Small value types shared across the tools.

pub mod file_size;

pub use file_size::{format_size, FileSize};
