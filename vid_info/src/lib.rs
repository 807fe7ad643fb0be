//! vid-info - Video Technical Analysis
//!
//! Runs ffprobe once per file and turns its output into a technical report:
//! - Normalized video/audio stream records (`probe_data`)
//! - Bitrate figures and a size estimate (`bitrate`)
//! - Quality tiers with recommendations (`quality`)
//! - JSON, plain text or Markdown rendering (`report`)
//!
//! ```rust,ignore
//! use vid_info::{ReportFormat, VideoAnalyzer};
//! use shared_utils::ProbeConfig;
//! use std::path::Path;
//!
//! let analyzer = VideoAnalyzer::new(ProbeConfig::default());
//! let markdown = analyzer.generate_report(Path::new("video.mp4"), ReportFormat::Markdown)?;
//! ```

pub mod analysis;
pub mod analyzer;
pub mod bitrate;
pub mod probe_data;
pub mod quality;
pub mod report;


pub use analysis::{AnalysisResult, AudioStreamSummary, VideoStreamSummary, UNKNOWN};
pub use analyzer::{AnalyzeOptions, VideoAnalyzer};
pub use bitrate::{analyze_bitrate, estimate_size, BitrateAnalysis};
pub use probe_data::{normalize, AudioStream, FormatRecord, ProbeInfo, StreamKind, StreamRecord, VideoStream};
pub use quality::{assess, AudioQuality, TechnicalReport, VideoQuality};
pub use report::{render, render_bitrate_summary, render_stream_summary, ReportFormat};

pub use shared_utils::errors::{AnalyzerError, Result};
