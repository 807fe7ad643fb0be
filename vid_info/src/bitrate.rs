//! Bitrate figures derived from normalized probe records.
//!
//! Pure computation: unparseable numbers count as absent, nothing here fails.

use serde::{Deserialize, Serialize};
use shared_utils::format_size;

use crate::analysis::UNKNOWN;
use crate::probe_data::{parse_count, FormatRecord, StreamKind, StreamRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitrateAnalysis {
    /// Container bit rate, passed through as probed (bits/sec).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_bit_rate: Option<String>,
    /// Bit rate of the first video stream only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_bit_rate: Option<String>,
    /// Bit rate of the first audio stream only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_bit_rate: Option<String>,
    /// Largest positive `max_bit_rate` over every stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bit_rate: Option<String>,
    pub estimated_size: String,
}

pub fn analyze_bitrate(streams: &[StreamRecord], format: &FormatRecord) -> BitrateAnalysis {
    let overall_bit_rate = format.bit_rate.clone();

    let first_of = |kind: StreamKind| {
        streams
            .iter()
            .find(|s| s.kind() == kind)
            .and_then(|s| s.bit_rate())
            .map(str::to_string)
    };

    let max_bit_rate = streams
        .iter()
        .filter_map(|s| s.max_bit_rate().and_then(parse_count))
        .filter(|rate| *rate > 0)
        .max()
        .map(|rate| rate.to_string());

    let estimated_size = estimate_size(overall_bit_rate.as_deref(), format.duration_seconds());

    BitrateAnalysis {
        overall_bit_rate,
        video_bit_rate: first_of(StreamKind::Video),
        audio_bit_rate: first_of(StreamKind::Audio),
        max_bit_rate,
        estimated_size,
    }
}

/// `bit_rate × duration / 8` bytes, formatted; `unknown` without both inputs.
pub fn estimate_size(overall_bit_rate: Option<&str>, duration_seconds: f64) -> String {
    match overall_bit_rate.and_then(parse_count) {
        Some(bits_per_sec) if duration_seconds > 0.0 => {
            format_size(bits_per_sec as f64 * duration_seconds / 8.0)
        }
        _ => UNKNOWN.to_string(),
    }
}
