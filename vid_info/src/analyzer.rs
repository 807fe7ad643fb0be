//! The pipeline entry points: probe, normalize, derive, render.

use std::fs;
use std::io;
use std::path::Path;

use shared_utils::{AnalyzerError, FfprobeCli, FileSize, MediaProbe, ProbeConfig, Result};
use tracing::{debug, info};

use crate::analysis::{AnalysisResult, AudioStreamSummary, VideoStreamSummary, UNKNOWN};
use crate::bitrate::analyze_bitrate;
use crate::probe_data::{normalize, ProbeInfo};
use crate::quality::assess;
use crate::report::{render, ReportFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Carry container and stream tags into the result.
    pub include_metadata: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            include_metadata: true,
        }
    }
}

/// Runs one probe per call and derives everything else in memory. Holds no
/// per-file state, so one analyzer can serve many files from many threads.
#[derive(Debug, Clone, Default)]
pub struct VideoAnalyzer<P: MediaProbe = FfprobeCli> {
    pub(crate) probe: P,
}

impl VideoAnalyzer<FfprobeCli> {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            probe: FfprobeCli::new(config),
        }
    }
}

impl<P: MediaProbe> VideoAnalyzer<P> {
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Normalized streams and container record for `path`.
    pub fn probe_info(&self, path: &Path) -> Result<ProbeInfo> {
        let size = existing_file_size(path)?;
        debug!(path = %path.display(), size, "Probing file");
        let raw = self.probe.probe(path)?;
        normalize(&raw)
    }

    pub fn analyze(&self, path: &Path, options: AnalyzeOptions) -> Result<AnalysisResult> {
        let size = existing_file_size(path)?;
        let raw = self.probe.probe(path)?;
        let info = normalize(&raw)?;

        let video_streams: Vec<VideoStreamSummary> = info
            .video_streams()
            .map(|s| VideoStreamSummary::from_stream(s, options.include_metadata))
            .collect();
        let audio_streams: Vec<AudioStreamSummary> = info
            .audio_streams()
            .map(|s| AudioStreamSummary::from_stream(s, options.include_metadata))
            .collect();

        let bitrate_analysis = analyze_bitrate(&info.streams, &info.format);
        let technical_report = assess(&video_streams, &audio_streams, &bitrate_analysis);

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!(
            file = %filename,
            video = video_streams.len(),
            audio = audio_streams.len(),
            video_quality = %technical_report.video_quality,
            audio_quality = %technical_report.audio_quality,
            "Analysis complete"
        );

        let format = info.format;
        Ok(AnalysisResult {
            filename,
            file_size: FileSize::new(size).display(),
            duration: format.duration.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            duration_seconds: format.duration_seconds(),
            format: format.format_name,
            format_long_name: format.format_long_name,
            video_streams,
            audio_streams,
            bitrate_analysis,
            technical_report,
            tags: if options.include_metadata {
                format.tags
            } else {
                Default::default()
            },
        })
    }

    pub fn generate_report(&self, path: &Path, format: ReportFormat) -> Result<String> {
        let result = self.analyze(path, AnalyzeOptions::default())?;
        Ok(render(&result, format))
    }
}

/// Size of a regular file, or `NotFound` for anything else.
fn existing_file_size(path: &Path) -> Result<u64> {
    let not_found = || AnalyzerError::NotFound {
        path: path.to_path_buf(),
    };
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(not_found()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(AnalyzerError::Io(e)),
    }
}
