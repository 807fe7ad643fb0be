//! Probe data normalization
//!
//! The only place that knows the ffprobe JSON schema. Raw output is checked
//! here once and turned into typed records; everything downstream reads
//! `ProbeInfo` and never touches `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use shared_utils::{AnalyzerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    pub index: u32,
    pub codec_name: String,
    pub codec_long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coded_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coded_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_b_frames: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_aspect_ratio: Option<String>,
    pub pix_fmt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_transfer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_primaries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<u32>,
    pub r_frame_rate: String,
    pub avg_frame_rate: String,
    pub time_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits_per_raw_sample: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_frames: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub disposition: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    pub index: u32,
    pub codec_name: String,
    pub codec_long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub sample_fmt: String,
    pub sample_rate: String,
    pub channels: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<u32>,
    pub r_frame_rate: String,
    pub avg_frame_rate: String,
    pub time_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_frames: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub disposition: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

/// One elementary stream the analyzer models. Serialized with ffprobe's
/// `codec_type` tag so `ProbeInfo` reads like the tool's own output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "codec_type", rename_all = "lowercase")]
pub enum StreamRecord {
    Video(VideoStream),
    Audio(AudioStream),
}

impl StreamRecord {
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamRecord::Video(_) => StreamKind::Video,
            StreamRecord::Audio(_) => StreamKind::Audio,
        }
    }

    pub fn index(&self) -> u32 {
        match self {
            StreamRecord::Video(v) => v.index,
            StreamRecord::Audio(a) => a.index,
        }
    }

    pub fn codec_name(&self) -> &str {
        match self {
            StreamRecord::Video(v) => &v.codec_name,
            StreamRecord::Audio(a) => &a.codec_name,
        }
    }

    pub fn bit_rate(&self) -> Option<&str> {
        match self {
            StreamRecord::Video(v) => v.bit_rate.as_deref(),
            StreamRecord::Audio(a) => a.bit_rate.as_deref(),
        }
    }

    pub fn max_bit_rate(&self) -> Option<&str> {
        match self {
            StreamRecord::Video(v) => v.max_bit_rate.as_deref(),
            StreamRecord::Audio(a) => a.max_bit_rate.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRecord {
    pub filename: String,
    pub nb_streams: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_programs: Option<u32>,
    pub format_name: String,
    pub format_long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_score: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl FormatRecord {
    /// Container duration in seconds; 0 when absent or unparseable.
    pub fn duration_seconds(&self) -> f64 {
        self.duration
            .as_deref()
            .and_then(parse_decimal)
            .unwrap_or(0.0)
    }
}

/// Normalized probe result: video and audio streams in probe order, plus the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeInfo {
    pub streams: Vec<StreamRecord>,
    pub format: FormatRecord,
}

impl ProbeInfo {
    pub fn video_streams(&self) -> impl Iterator<Item = &VideoStream> {
        self.streams.iter().filter_map(|s| match s {
            StreamRecord::Video(v) => Some(v),
            StreamRecord::Audio(_) => None,
        })
    }

    pub fn audio_streams(&self) -> impl Iterator<Item = &AudioStream> {
        self.streams.iter().filter_map(|s| match s {
            StreamRecord::Audio(a) => Some(a),
            StreamRecord::Video(_) => None,
        })
    }
}

#[derive(Deserialize)]
struct RawProbeOutput {
    streams: Vec<Value>,
    format: Value,
}

/// Validates raw ffprobe JSON and reshapes it into a `ProbeInfo`.
///
/// Every stream needs a string `codec_type`, a numeric `index` unique within
/// the file and a string `codec_name`. Streams whose `codec_type` is neither
/// `video` nor `audio` (subtitle, data, attachment) are then dropped. A video
/// or audio stream missing a field its kind requires fails the whole call.
pub fn normalize(raw_json: &str) -> Result<ProbeInfo> {
    let raw: RawProbeOutput = serde_json::from_str(raw_json)
        .map_err(|e| AnalyzerError::validation("probe output", e.to_string()))?;

    let format: FormatRecord = serde_json::from_value(raw.format)
        .map_err(|e| AnalyzerError::validation("format", e.to_string()))?;

    let mut streams = Vec::with_capacity(raw.streams.len());
    let mut seen = BTreeSet::new();
    for (position, entry) in raw.streams.into_iter().enumerate() {
        let (index, record) = normalize_stream(position, entry)?;
        if !seen.insert(index) {
            return Err(AnalyzerError::validation(
                format!("streams[{}]", position),
                format!("duplicate stream index {}", index),
            ));
        }
        if let Some(record) = record {
            streams.push(record);
        }
    }

    debug!(
        kept = streams.len(),
        declared = format.nb_streams,
        container = %format.format_name,
        "Normalized probe output"
    );

    Ok(ProbeInfo { streams, format })
}

/// Checks the fields every stream carries, then decodes video and audio entries.
/// Returns the stream index alongside the record so skipped kinds still take
/// part in the uniqueness check.
fn normalize_stream(position: usize, entry: Value) -> Result<(u32, Option<StreamRecord>)> {
    let context = format!("streams[{}]", position);
    let Value::Object(ref fields) = entry else {
        return Err(AnalyzerError::validation(context, "expected an object"));
    };

    let codec_type = match fields.get("codec_type") {
        Some(Value::String(t)) => t.clone(),
        Some(other) => {
            return Err(AnalyzerError::validation(
                context,
                format!("invalid type for `codec_type`: expected a string, found {}", other),
            ))
        }
        None => return Err(AnalyzerError::validation(context, "missing field `codec_type`")),
    };

    let index = match fields.get("index") {
        Some(value) => match value.as_u64().and_then(|i| u32::try_from(i).ok()) {
            Some(index) => index,
            None => {
                return Err(AnalyzerError::validation(
                    context,
                    format!("invalid type for `index`: expected a stream number, found {}", value),
                ))
            }
        },
        None => return Err(AnalyzerError::validation(context, "missing field `index`")),
    };

    match fields.get("codec_name") {
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(AnalyzerError::validation(
                context,
                format!("invalid type for `codec_name`: expected a string, found {}", other),
            ))
        }
        None => return Err(AnalyzerError::validation(context, "missing field `codec_name`")),
    }

    let record = match codec_type.as_str() {
        "video" => serde_json::from_value(entry).map(StreamRecord::Video),
        "audio" => serde_json::from_value(entry).map(StreamRecord::Audio),
        other => {
            debug!(position, index, codec_type = other, "Skipping stream outside video/audio");
            return Ok((index, None));
        }
    };

    record
        .map(|r| (index, Some(r)))
        .map_err(|e| AnalyzerError::validation(format!("{} ({})", context, codec_type), e.to_string()))
}

/// Parses a decimal-string number as emitted by ffprobe; `None` for garbage.
pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads the leading unsigned integer of a decimal string (bit rates, sample
/// rates): `"128000.0"` is 128000, `"N/A"` and `"-5"` are `None`.
pub(crate) fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse::<u64>().ok()
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const H264_AAC: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_long_name": "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10",
                "profile": "High",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "coded_width": 1920,
                "coded_height": 1088,
                "has_b_frames": 2,
                "display_aspect_ratio": "16:9",
                "pix_fmt": "yuv420p",
                "level": 40,
                "color_range": "tv",
                "color_space": "bt709",
                "r_frame_rate": "30000/1001",
                "avg_frame_rate": "30000/1001",
                "time_base": "1/30000",
                "duration": "120.500000",
                "bit_rate": "3000000",
                "nb_frames": "3612",
                "disposition": {"default": 1, "forced": 0},
                "tags": {"language": "und", "handler_name": "VideoHandler"}
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_long_name": "AAC (Advanced Audio Coding)",
                "profile": "LC",
                "codec_type": "audio",
                "sample_fmt": "fltp",
                "sample_rate": "48000",
                "channels": 2,
                "channel_layout": "stereo",
                "bits_per_sample": 0,
                "r_frame_rate": "0/0",
                "avg_frame_rate": "0/0",
                "time_base": "1/48000",
                "bit_rate": "256000",
                "max_bit_rate": "320000",
                "tags": {"language": "eng"}
            }
        ],
        "format": {
            "filename": "/videos/sample.mp4",
            "nb_streams": 2,
            "nb_programs": 0,
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "format_long_name": "QuickTime / MOV",
            "start_time": "0.000000",
            "duration": "120.5",
            "size": "45000000",
            "bit_rate": "2987551",
            "probe_score": 100,
            "tags": {"major_brand": "isom", "encoder": "Lavf60.3.100"}
        }
    }"#;
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn entry(index: usize, kind: u8) -> Value {
        match kind {
            0 => json!({
                "index": index, "codec_name": "h264", "codec_long_name": "H.264",
                "codec_type": "video", "width": 640, "height": 360, "pix_fmt": "yuv420p",
                "r_frame_rate": "25/1", "avg_frame_rate": "25/1", "time_base": "1/25"
            }),
            1 => json!({
                "index": index, "codec_name": "opus", "codec_long_name": "Opus",
                "codec_type": "audio", "sample_fmt": "fltp", "sample_rate": "48000",
                "channels": 2, "r_frame_rate": "0/0", "avg_frame_rate": "0/0",
                "time_base": "1/48000"
            }),
            2 => json!({"index": index, "codec_name": "ass", "codec_type": "subtitle"}),
            _ => json!({"index": index, "codec_name": "bin_data", "codec_type": "data"}),
        }
    }

    proptest! {
        #[test]
        fn prop_kept_count_and_order(kinds in prop::collection::vec(0u8..4, 0..24)) {
            let streams: Vec<Value> = kinds.iter().enumerate().map(|(i, k)| entry(i, *k)).collect();
            let raw = json!({
                "streams": streams,
                "format": {
                    "filename": "x.mkv", "nb_streams": kinds.len(),
                    "format_name": "matroska", "format_long_name": "Matroska"
                }
            }).to_string();

            let info = normalize(&raw).unwrap();
            let expected: Vec<u32> = kinds.iter().enumerate()
                .filter(|(_, k)| **k < 2)
                .map(|(i, _)| i as u32)
                .collect();
            let got: Vec<u32> = info.streams.iter().map(StreamRecord::index).collect();
            prop_assert_eq!(got, expected);

            let videos = kinds.iter().filter(|k| **k == 0).count();
            let audios = kinds.iter().filter(|k| **k == 1).count();
            prop_assert_eq!(info.video_streams().count(), videos);
            prop_assert_eq!(info.audio_streams().count(), audios);
        }

        #[test]
        fn prop_arbitrary_text_never_panics(s in ".*") {
            let _ = normalize(&s);
        }
    }
}
