//! Shared Utilities for the vid-info tools
//!
//! This crate provides the plumbing the analysis pipeline sits on:
//! - Logging bootstrap (tracing + rolling file appender)
//! - FFprobe discovery and invocation behind the `MediaProbe` trait
//! - The analyzer error type
//! - Human-readable size formatting

pub mod errors;
pub mod ffprobe;
pub mod logging;
pub mod types;

pub use errors::{AnalyzerError, Result};
pub use ffprobe::{parse_frame_rate, FfprobeCli, MediaProbe, ProbeConfig};
pub use types::{format_size, FileSize};
