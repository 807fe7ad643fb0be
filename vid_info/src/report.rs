//! Report rendering: structured JSON, plain text and Markdown.
//!
//! Text and Markdown share one traversal over `AnalysisResult` (`walk`) and
//! differ only in the `ReportWriter` that lays out each piece, so section
//! order and the `unknown` fallback cannot drift between the two.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use shared_utils::parse_frame_rate;
use std::fmt::Write as _;
use tracing::{error, warn};

use crate::analysis::{AnalysisResult, UNKNOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Text,
    Markdown,
}

impl ReportFormat {
    /// Lenient selector lookup: anything unrecognized renders as JSON.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "json" => ReportFormat::Json,
            "text" | "txt" => ReportFormat::Text,
            "markdown" | "md" => ReportFormat::Markdown,
            other => {
                warn!(selector = other, "Unsupported report format, using json");
                ReportFormat::Json
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
            ReportFormat::Markdown => "markdown",
        }
    }
}

/// Renders `result` in `format`. Never fails: a result that cannot be
/// serialized is logged and rendered as an empty JSON object.
pub fn render(result: &AnalysisResult, format: ReportFormat) -> String {
    match format {
        ReportFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
            error!(error = %e, file = %result.filename, "JSON rendering failed");
            String::from("{}")
        }),
        ReportFormat::Text => walk(result, TextWriter::default()),
        ReportFormat::Markdown => walk(result, MarkdownWriter::default()),
    }
}

const TITLE: &str = "Video Information Report";

trait ReportWriter {
    fn title(&mut self, title: &str);
    fn section(&mut self, name: &str);
    fn stream(&mut self, kind: &str, number: usize);
    fn field(&mut self, label: &str, value: &str);
    fn verdict(&mut self, label: &str, value: &str);
    fn end_block(&mut self);
    fn recommendations(&mut self, items: &[String]);
    fn finish(self) -> String;
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

fn with_long_name(short: &str, long: &str) -> String {
    format!("{} ({})", short, long)
}

fn walk<W: ReportWriter>(result: &AnalysisResult, mut w: W) -> String {
    w.title(TITLE);

    w.section("Basic Information");
    w.field("Filename", &result.filename);
    w.field("File Size", &result.file_size);
    let duration = if result.duration == UNKNOWN {
        UNKNOWN.to_string()
    } else {
        format!("{} seconds", result.duration)
    };
    w.field("Duration", &duration);
    w.field(
        "Format",
        &with_long_name(&result.format, &result.format_long_name),
    );
    w.end_block();

    if !result.video_streams.is_empty() {
        w.section("Video Streams");
        for (i, stream) in result.video_streams.iter().enumerate() {
            w.stream("Video Stream", i + 1);
            w.field(
                "Codec",
                &with_long_name(&stream.codec, &stream.codec_long_name),
            );
            w.field("Profile", or_unknown(stream.profile.as_deref()));
            w.field("Resolution", &stream.resolution);
            w.field("Aspect Ratio", or_unknown(stream.aspect_ratio.as_deref()));
            w.field("Frame Rate", &stream.frame_rate);
            w.field("Bit Rate", or_unknown(stream.bit_rate.as_deref()));
            w.field("Pixel Format", &stream.pixel_format);
            w.end_block();
        }
    }

    if !result.audio_streams.is_empty() {
        w.section("Audio Streams");
        for (i, stream) in result.audio_streams.iter().enumerate() {
            w.stream("Audio Stream", i + 1);
            w.field(
                "Codec",
                &with_long_name(&stream.codec, &stream.codec_long_name),
            );
            w.field("Sample Rate", &format!("{} Hz", stream.sample_rate));
            w.field("Channels", &stream.channels.to_string());
            w.field(
                "Channel Layout",
                or_unknown(stream.channel_layout.as_deref()),
            );
            w.field("Bit Rate", or_unknown(stream.bit_rate.as_deref()));
            w.end_block();
        }
    }

    let bitrate = &result.bitrate_analysis;
    w.section("Bitrate Analysis");
    w.field(
        "Overall Bit Rate",
        or_unknown(bitrate.overall_bit_rate.as_deref()),
    );
    w.field("Video Bit Rate", or_unknown(bitrate.video_bit_rate.as_deref()));
    w.field("Audio Bit Rate", or_unknown(bitrate.audio_bit_rate.as_deref()));
    w.field("Max Bit Rate", or_unknown(bitrate.max_bit_rate.as_deref()));
    w.field("Estimated Size", &bitrate.estimated_size);
    w.end_block();

    let technical = &result.technical_report;
    w.section("Technical Evaluation");
    w.verdict("Video Quality", technical.video_quality.as_str());
    w.verdict("Audio Quality", technical.audio_quality.as_str());
    if !technical.recommendations.is_empty() {
        w.recommendations(&technical.recommendations);
    }

    w.finish()
}

#[derive(Default)]
struct TextWriter {
    out: String,
    in_stream: bool,
}

impl TextWriter {
    fn indent(&self) -> &'static str {
        if self.in_stream {
            "    "
        } else {
            "  "
        }
    }
}

impl ReportWriter for TextWriter {
    fn title(&mut self, title: &str) {
        let _ = write!(self.out, "{}\n{}\n\n", title, "=".repeat(50));
    }

    fn section(&mut self, name: &str) {
        self.in_stream = false;
        let _ = writeln!(self.out, "{}:", name);
    }

    fn stream(&mut self, _kind: &str, number: usize) {
        self.in_stream = true;
        let _ = writeln!(self.out, "  Stream {}:", number);
    }

    fn field(&mut self, label: &str, value: &str) {
        let _ = writeln!(self.out, "{}{}: {}", self.indent(), label, value);
    }

    fn verdict(&mut self, label: &str, value: &str) {
        self.field(label, value);
    }

    fn end_block(&mut self) {
        self.out.push('\n');
    }

    fn recommendations(&mut self, items: &[String]) {
        self.out.push_str("  Recommendations:\n");
        for item in items {
            let _ = writeln!(self.out, "    - {}", item);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    table_open: bool,
}

/// Keeps a value inside its table cell.
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

impl ReportWriter for MarkdownWriter {
    fn title(&mut self, title: &str) {
        let _ = write!(self.out, "# {}\n\n", title);
    }

    fn section(&mut self, name: &str) {
        let _ = write!(self.out, "## {}\n\n", name);
    }

    fn stream(&mut self, kind: &str, number: usize) {
        let _ = write!(self.out, "### {} {}\n\n", kind, number);
    }

    fn field(&mut self, label: &str, value: &str) {
        if !self.table_open {
            self.out.push_str("| Property | Value |\n|----------|-------|\n");
            self.table_open = true;
        }
        let _ = writeln!(self.out, "| {} | {} |", label, escape_cell(value));
    }

    fn verdict(&mut self, label: &str, value: &str) {
        let _ = writeln!(self.out, "- **{}**: {}", label, value);
    }

    fn end_block(&mut self) {
        self.table_open = false;
        self.out.push('\n');
    }

    fn recommendations(&mut self, items: &[String]) {
        self.out.push_str("\n### Recommendations\n\n");
        for item in items {
            let _ = writeln!(self.out, "- {}", item);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn bps(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{} bps", v),
        None => UNKNOWN.to_string(),
    }
}

/// One line per stream, frame rates evaluated to fps.
pub fn render_stream_summary(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File: {}", result.filename);
    let _ = writeln!(
        out,
        "Container: {}",
        with_long_name(&result.format, &result.format_long_name)
    );
    for (key, value) in &result.tags {
        let _ = writeln!(out, "  {}: {}", key, value);
    }

    let _ = writeln!(out, "Video streams: {}", result.video_streams.len());
    for stream in &result.video_streams {
        let fps = parse_frame_rate(&stream.frame_rate)
            .map(|rate| format!("{:.2} fps", rate))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let _ = writeln!(
            out,
            "  #{} {} {} {} {} {}",
            stream.index,
            stream.codec,
            stream.resolution,
            fps,
            bps(stream.bit_rate.as_deref()),
            stream.pixel_format
        );
        for (key, value) in &stream.tags {
            let _ = writeln!(out, "      {}: {}", key, value);
        }
    }

    let _ = writeln!(out, "Audio streams: {}", result.audio_streams.len());
    for stream in &result.audio_streams {
        let _ = writeln!(
            out,
            "  #{} {} {} Hz {} ch {}",
            stream.index,
            stream.codec,
            stream.sample_rate,
            stream.channels,
            bps(stream.bit_rate.as_deref())
        );
        for (key, value) in &stream.tags {
            let _ = writeln!(out, "      {}: {}", key, value);
        }
    }
    out
}

pub fn render_bitrate_summary(result: &AnalysisResult) -> String {
    let bitrate = &result.bitrate_analysis;
    let mut out = String::new();
    let _ = writeln!(out, "File: {}", result.filename);
    let _ = writeln!(out, "Size: {}", result.file_size);
    let _ = writeln!(out, "Duration: {}", result.duration);
    let _ = writeln!(out, "Overall bit rate: {}", bps(bitrate.overall_bit_rate.as_deref()));
    let _ = writeln!(out, "Video bit rate: {}", bps(bitrate.video_bit_rate.as_deref()));
    let _ = writeln!(out, "Audio bit rate: {}", bps(bitrate.audio_bit_rate.as_deref()));
    let _ = writeln!(out, "Max bit rate: {}", bps(bitrate.max_bit_rate.as_deref()));
    let _ = writeln!(out, "Estimated size: {}", bitrate.estimated_size);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AudioStreamSummary, VideoStreamSummary};
    use crate::bitrate::BitrateAnalysis;
    use crate::quality::{AudioQuality, TechnicalReport, VideoQuality};
    use std::collections::BTreeMap;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            filename: "sample.mp4".into(),
            file_size: "42.92 MB".into(),
            duration: "120.5".into(),
            duration_seconds: 120.5,
            format: "mov,mp4,m4a,3gp,3g2,mj2".into(),
            format_long_name: "QuickTime / MOV".into(),
            video_streams: vec![VideoStreamSummary {
                index: 0,
                codec: "h264".into(),
                codec_long_name: "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".into(),
                profile: Some("High".into()),
                width: 1920,
                height: 1080,
                resolution: "1920x1080".into(),
                aspect_ratio: None,
                pixel_format: "yuv420p".into(),
                frame_rate: "30000/1001".into(),
                avg_frame_rate: "30000/1001".into(),
                bit_rate: Some("3000000".into()),
                max_bit_rate: None,
                total_frames: Some("3611".into()),
                color_space: None,
                color_range: None,
                tags: BTreeMap::new(),
            }],
            audio_streams: vec![AudioStreamSummary {
                index: 1,
                codec: "aac".into(),
                codec_long_name: "AAC (Advanced Audio Coding)".into(),
                profile: Some("LC".into()),
                sample_rate: "48000".into(),
                channels: 2,
                channel_layout: Some("stereo".into()),
                sample_format: "fltp".into(),
                bit_rate: Some("256000".into()),
                max_bit_rate: Some("320000".into()),
                tags: BTreeMap::new(),
            }],
            bitrate_analysis: BitrateAnalysis {
                overall_bit_rate: Some("2987551".into()),
                video_bit_rate: Some("3000000".into()),
                audio_bit_rate: Some("256000".into()),
                max_bit_rate: Some("320000".into()),
                estimated_size: "42.92 MB".into(),
            },
            technical_report: TechnicalReport {
                video_quality: VideoQuality::FullHd,
                audio_quality: AudioQuality::Standard,
                recommendations: vec![
                    "increase video bitrate for better 1080p quality".into(),
                    "H.264 encoding, good compatibility".into(),
                ],
            },
            tags: BTreeMap::new(),
        }
    }

    fn positions(haystack: &str, needles: &[&str]) -> Vec<usize> {
        needles
            .iter()
            .map(|n| {
                haystack
                    .find(n)
                    .unwrap_or_else(|| panic!("missing {:?} in:\n{}", n, haystack))
            })
            .collect()
    }

    fn assert_ascending(v: &[usize]) {
        assert!(v.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", v);
    }

    #[test]
    fn test_selector_falls_back_to_json() {
        assert_eq!(ReportFormat::from_selector("text"), ReportFormat::Text);
        assert_eq!(ReportFormat::from_selector("Markdown"), ReportFormat::Markdown);
        assert_eq!(ReportFormat::from_selector("md"), ReportFormat::Markdown);
        assert_eq!(ReportFormat::from_selector("xml"), ReportFormat::Json);
        assert_eq!(ReportFormat::from_selector(""), ReportFormat::Json);
        assert_eq!(ReportFormat::default(), ReportFormat::Json);
    }

    #[test]
    fn test_json_round_trip() {
        let result = sample();
        let json = render(&result, ReportFormat::Json);
        assert!(json.contains("\n  \"filename\": \"sample.mp4\""));
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_json_never_fails_on_odd_numbers() {
        let mut result = sample();
        result.duration_seconds = f64::NAN;
        let json = render(&result, ReportFormat::Json);
        assert!(json.contains("\"durationSeconds\": null"), "{}", json);
        assert!(json.contains("\"filename\": \"sample.mp4\""));
    }

    #[test]
    fn test_json_key_names() {
        let json = render(&sample(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["fileSize"], "42.92 MB");
        assert_eq!(value["durationSeconds"], 120.5);
        assert_eq!(value["videoStreams"][0]["codecLongName"], "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10");
        assert_eq!(value["bitrateAnalysis"]["estimatedSize"], "42.92 MB");
        assert_eq!(value["technicalReport"]["videoQuality"], "1080p HD");
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn test_text_sections_in_order() {
        let text = render(&sample(), ReportFormat::Text);
        assert!(text.starts_with("Video Information Report\n=================================================="));
        assert_ascending(&positions(
            &text,
            &[
                "Basic Information:",
                "Video Streams:",
                "Audio Streams:",
                "Bitrate Analysis:",
                "Technical Evaluation:",
                "  Recommendations:",
            ],
        ));
        assert!(text.contains("  Filename: sample.mp4\n"));
        assert!(text.contains("  Duration: 120.5 seconds\n"));
        assert!(text.contains("  Stream 1:\n    Codec: h264 (H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10)\n"));
        assert!(text.contains("    Sample Rate: 48000 Hz\n"));
        assert!(text.contains("  Estimated Size: 42.92 MB\n"));
        assert!(text.contains("  Video Quality: 1080p HD\n"));
        assert!(text.contains("    - H.264 encoding, good compatibility\n"));
    }

    #[test]
    fn test_text_absent_values_are_unknown() {
        let text = render(&sample(), ReportFormat::Text);
        assert!(text.contains("    Aspect Ratio: unknown\n"));

        let mut result = sample();
        result.duration = UNKNOWN.into();
        result.bitrate_analysis.overall_bit_rate = None;
        result.bitrate_analysis.estimated_size = UNKNOWN.into();
        result.video_streams[0].bit_rate = None;
        let text = render(&result, ReportFormat::Text);
        assert!(text.contains("  Duration: unknown\n"));
        assert!(text.contains("  Overall Bit Rate: unknown\n"));
        assert!(text.contains("  Estimated Size: unknown\n"));
        assert!(text.contains("    Bit Rate: unknown\n"));
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let mut result = sample();
        result.video_streams.clear();
        result.audio_streams.clear();
        result.technical_report.recommendations.clear();
        let text = render(&result, ReportFormat::Text);
        assert!(!text.contains("Video Streams:"));
        assert!(!text.contains("Audio Streams:"));
        assert!(!text.contains("Recommendations:"));
        assert!(text.contains("Bitrate Analysis:"));

        let md = render(&result, ReportFormat::Markdown);
        assert!(!md.contains("## Video Streams"));
        assert!(!md.contains("### Recommendations"));
    }

    #[test]
    fn test_markdown_layout() {
        let md = render(&sample(), ReportFormat::Markdown);
        assert!(md.starts_with("# Video Information Report\n\n## Basic Information\n\n| Property | Value |\n"));
        assert_ascending(&positions(
            &md,
            &[
                "## Basic Information",
                "## Video Streams",
                "### Video Stream 1",
                "## Audio Streams",
                "### Audio Stream 1",
                "## Bitrate Analysis",
                "## Technical Evaluation",
                "### Recommendations",
            ],
        ));
        assert!(md.contains("| Aspect Ratio | unknown |\n"));
        assert!(md.contains("- **Audio Quality**: Standard Quality\n"));
        assert!(md.contains("\n- increase video bitrate for better 1080p quality\n"));
        // one table header per block
        assert_eq!(md.matches("| Property | Value |").count(), 4);
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut result = sample();
        result.filename = "a|b.mp4".into();
        let md = render(&result, ReportFormat::Markdown);
        assert!(md.contains("| Filename | a\\|b.mp4 |\n"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let result = sample();
        for format in [ReportFormat::Json, ReportFormat::Text, ReportFormat::Markdown] {
            assert_eq!(render(&result, format), render(&result, format));
        }
    }

    #[test]
    fn test_stream_summary_evaluates_fps() {
        let summary = render_stream_summary(&sample());
        assert!(summary.contains("  #0 h264 1920x1080 29.97 fps 3000000 bps yuv420p\n"));
        assert!(summary.contains("  #1 aac 48000 Hz 2 ch 256000 bps\n"));

        let mut result = sample();
        result.video_streams[0].frame_rate = "0/0".into();
        result.video_streams[0].bit_rate = None;
        let summary = render_stream_summary(&result);
        assert!(summary.contains("  #0 h264 1920x1080 unknown unknown yuv420p\n"));
    }

    #[test]
    fn test_bitrate_summary() {
        let mut result = sample();
        result.bitrate_analysis.max_bit_rate = None;
        let summary = render_bitrate_summary(&result);
        assert!(summary.contains("Overall bit rate: 2987551 bps\n"));
        assert!(summary.contains("Max bit rate: unknown\n"));
        assert!(summary.contains("Estimated size: 42.92 MB\n"));
    }
}
