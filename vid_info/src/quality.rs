//! Quality tiers and improvement recommendations.
//!
//! Tiers come from the first video and first audio stream only. Codec
//! advisories look at every video stream. Missing or unparseable numbers are
//! compared as 0 so every threshold always evaluates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{AudioStreamSummary, VideoStreamSummary};
use crate::bitrate::BitrateAnalysis;
use crate::probe_data::parse_count;

const UHD_MIN_HEIGHT: u32 = 2160;
const FHD_MIN_HEIGHT: u32 = 1080;
const HD_MIN_HEIGHT: u32 = 720;
const FHD_MIN_VIDEO_BIT_RATE: u64 = 5_000_000;

const HIGH_AUDIO_SAMPLE_RATE: u64 = 48_000;
const HIGH_AUDIO_BIT_RATE: u64 = 320_000;
const STANDARD_AUDIO_SAMPLE_RATE: u64 = 44_100;
const STANDARD_AUDIO_BIT_RATE: u64 = 128_000;

pub const ADVICE_FHD_BITRATE: &str = "increase video bitrate for better 1080p quality";
pub const ADVICE_RESOLUTION: &str = "consider increasing resolution";
pub const ADVICE_AUDIO: &str = "increase audio bitrate and sample rate";
pub const ADVICE_H264: &str = "H.264 encoding, good compatibility";
pub const ADVICE_H265: &str = "H.265 encoding, higher compression but check compatibility";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "4K Ultra HD")]
    UltraHd,
    #[serde(rename = "1080p HD")]
    FullHd,
    #[serde(rename = "720p HD")]
    Hd,
    #[serde(rename = "Standard Definition")]
    StandardDefinition,
    #[serde(rename = "unknown")]
    Unknown,
}

impl VideoQuality {
    pub fn from_height(height: u32) -> Self {
        if height >= UHD_MIN_HEIGHT {
            VideoQuality::UltraHd
        } else if height >= FHD_MIN_HEIGHT {
            VideoQuality::FullHd
        } else if height >= HD_MIN_HEIGHT {
            VideoQuality::Hd
        } else {
            VideoQuality::StandardDefinition
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoQuality::UltraHd => "4K Ultra HD",
            VideoQuality::FullHd => "1080p HD",
            VideoQuality::Hd => "720p HD",
            VideoQuality::StandardDefinition => "Standard Definition",
            VideoQuality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioQuality {
    #[serde(rename = "High Quality")]
    High,
    #[serde(rename = "Standard Quality")]
    Standard,
    #[serde(rename = "Basic Quality")]
    Basic,
    #[serde(rename = "unknown")]
    Unknown,
}

impl AudioQuality {
    pub fn classify(sample_rate: u64, bit_rate: u64) -> Self {
        if sample_rate >= HIGH_AUDIO_SAMPLE_RATE && bit_rate >= HIGH_AUDIO_BIT_RATE {
            AudioQuality::High
        } else if sample_rate >= STANDARD_AUDIO_SAMPLE_RATE && bit_rate >= STANDARD_AUDIO_BIT_RATE {
            AudioQuality::Standard
        } else {
            AudioQuality::Basic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioQuality::High => "High Quality",
            AudioQuality::Standard => "Standard Quality",
            AudioQuality::Basic => "Basic Quality",
            AudioQuality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalReport {
    pub video_quality: VideoQuality,
    pub audio_quality: AudioQuality,
    /// Video tier advice, then audio tier advice, then codec advisories.
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodecFamily {
    H264,
    H265,
}

impl CodecFamily {
    fn from_codec(codec: &str) -> Option<Self> {
        match codec {
            "h264" => Some(CodecFamily::H264),
            "hevc" | "h265" => Some(CodecFamily::H265),
            _ => None,
        }
    }

    fn advisory(self) -> &'static str {
        match self {
            CodecFamily::H264 => ADVICE_H264,
            CodecFamily::H265 => ADVICE_H265,
        }
    }
}

fn count_or_zero(value: Option<&str>) -> u64 {
    value.and_then(parse_count).unwrap_or(0)
}

pub fn assess(
    video: &[VideoStreamSummary],
    audio: &[AudioStreamSummary],
    bitrate: &BitrateAnalysis,
) -> TechnicalReport {
    let mut recommendations = Vec::new();

    let video_quality = match video.first() {
        Some(first) => {
            let tier = VideoQuality::from_height(first.height);
            match tier {
                VideoQuality::FullHd
                    if count_or_zero(bitrate.video_bit_rate.as_deref())
                        < FHD_MIN_VIDEO_BIT_RATE =>
                {
                    recommendations.push(ADVICE_FHD_BITRATE.to_string());
                }
                VideoQuality::StandardDefinition => {
                    recommendations.push(ADVICE_RESOLUTION.to_string());
                }
                _ => {}
            }
            tier
        }
        None => VideoQuality::Unknown,
    };

    let audio_quality = match audio.first() {
        Some(first) => {
            let tier = AudioQuality::classify(
                count_or_zero(Some(&first.sample_rate)),
                count_or_zero(bitrate.audio_bit_rate.as_deref()),
            );
            if tier == AudioQuality::Basic {
                recommendations.push(ADVICE_AUDIO.to_string());
            }
            tier
        }
        None => AudioQuality::Unknown,
    };

    let mut seen: Vec<CodecFamily> = Vec::new();
    for family in video.iter().filter_map(|s| CodecFamily::from_codec(&s.codec)) {
        if !seen.contains(&family) {
            seen.push(family);
            recommendations.push(family.advisory().to_string());
        }
    }

    TechnicalReport {
        video_quality,
        audio_quality,
        recommendations,
    }
}
