//! The aggregate analysis result and the per-stream summaries it carries.
//!
//! Key names are camelCase and stable: the structured report is a direct
//! serialization of `AnalysisResult`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bitrate::BitrateAnalysis;
use crate::probe_data::{AudioStream, VideoStream};
use crate::quality::TechnicalReport;

/// Marker printed wherever a value is absent or could not be computed.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStreamSummary {
    pub index: u32,
    pub codec: String,
    pub codec_long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub width: u32,
    pub height: u32,
    pub resolution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    pub pixel_format: String,
    pub frame_rate: String,
    pub avg_frame_rate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_range: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl VideoStreamSummary {
    pub fn from_stream(stream: &VideoStream, include_metadata: bool) -> Self {
        Self {
            index: stream.index,
            codec: stream.codec_name.clone(),
            codec_long_name: stream.codec_long_name.clone(),
            profile: stream.profile.clone(),
            width: stream.width,
            height: stream.height,
            resolution: format!("{}x{}", stream.width, stream.height),
            aspect_ratio: stream.display_aspect_ratio.clone(),
            pixel_format: stream.pix_fmt.clone(),
            frame_rate: stream.r_frame_rate.clone(),
            avg_frame_rate: stream.avg_frame_rate.clone(),
            bit_rate: stream.bit_rate.clone(),
            max_bit_rate: stream.max_bit_rate.clone(),
            total_frames: stream.nb_frames.clone(),
            color_space: stream.color_space.clone(),
            color_range: stream.color_range.clone(),
            tags: if include_metadata {
                stream.tags.clone()
            } else {
                BTreeMap::new()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStreamSummary {
    pub index: u32,
    pub codec: String,
    pub codec_long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub sample_rate: String,
    pub channels: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_layout: Option<String>,
    pub sample_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl AudioStreamSummary {
    pub fn from_stream(stream: &AudioStream, include_metadata: bool) -> Self {
        Self {
            index: stream.index,
            codec: stream.codec_name.clone(),
            codec_long_name: stream.codec_long_name.clone(),
            profile: stream.profile.clone(),
            sample_rate: stream.sample_rate.clone(),
            channels: stream.channels,
            channel_layout: stream.channel_layout.clone(),
            sample_format: stream.sample_fmt.clone(),
            bit_rate: stream.bit_rate.clone(),
            max_bit_rate: stream.max_bit_rate.clone(),
            tags: if include_metadata {
                stream.tags.clone()
            } else {
                BTreeMap::new()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub filename: String,
    pub file_size: String,
    /// Container duration exactly as probed, or `unknown`.
    pub duration: String,
    pub duration_seconds: f64,
    pub format: String,
    pub format_long_name: String,
    pub video_streams: Vec<VideoStreamSummary>,
    pub audio_streams: Vec<AudioStreamSummary>,
    pub bitrate_analysis: BitrateAnalysis,
    pub technical_report: TechnicalReport,
    /// Container-level tags, present only when metadata was requested.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}
