use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{TransformError, TransformResult};
use crate::core::stream::StreamMut;
use crate::core::units::{from_number, parse_shorthand};

/// Desired encoding of one video rendition. Bitrate is in bits per second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProfile {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: Option<String>,
    pub profile: Option<String>,
    pub preset: Option<String>,
    pub pixel_format: Option<String>,
    pub bitrate: Option<u64>,
    pub frame_rate: Option<f64>,
    pub keyframe_interval: Option<u32>,
}

/// Desired encoding of one audio rendition. Bitrate in bits per second,
/// sample rate in Hz.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioProfile {
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub sample_rate: Option<u64>,
}

/// Named container format plus the video and audio renditions to produce.
///
/// Deserializes from the declarative form (shorthand units, single track or
/// list) and serializes to the canonical form (lists, plain decimal strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMediaProfile", into = "CanonicalMediaProfile")]
pub struct MediaProfile {
    pub name: String,
    pub format: Option<String>,
    pub video: Vec<VideoProfile>,
    pub audio: Vec<AudioProfile>,
}

impl MediaProfile {
    /// Parses a declarative profile document. The input is left untouched.
    pub fn from_value(value: &Value) -> TransformResult<Self> {
        let raw = RawMediaProfile::deserialize(value).map_err(|e| TransformError::ProfileShape {
            message: e.to_string(),
        })?;
        Self::try_from(raw)
    }

    /// Canonical document: tracks always as lists, bitrates and sample rates
    /// as decimal strings without suffix.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(CanonicalMediaProfile::from(self.clone())).unwrap_or(Value::Null)
    }
}

impl VideoProfile {
    pub fn apply<'a>(&self, stream: StreamMut<'a>) -> StreamMut<'a> {
        let mut stream = stream;
        if let Some(codec) = &self.codec {
            stream = stream.codec(codec.as_str());
        }
        if let Some(profile) = &self.profile {
            stream = stream.profile(profile.as_str());
        }
        if let Some(preset) = &self.preset {
            stream = stream.preset(preset.as_str());
        }
        if let Some(pixel_format) = &self.pixel_format {
            stream = stream.pixel_format(pixel_format.as_str());
        }
        // ffmpeg's -s needs both dimensions
        if let (Some(width), Some(height)) = (self.width, self.height) {
            stream = stream.size(width, height);
        }
        if let Some(bitrate) = self.bitrate {
            stream = stream.bitrate(bitrate);
        }
        if let Some(frame_rate) = self.frame_rate {
            stream = stream.frame_rate(frame_rate);
        }
        if let Some(interval) = self.keyframe_interval {
            stream = stream.keyframe_interval(interval);
        }
        stream
    }
}

impl AudioProfile {
    pub fn apply<'a>(&self, stream: StreamMut<'a>) -> StreamMut<'a> {
        let mut stream = stream;
        if let Some(codec) = &self.codec {
            stream = stream.codec(codec.as_str());
        }
        if let Some(bitrate) = self.bitrate {
            stream = stream.bitrate(bitrate);
        }
        if let Some(sample_rate) = self.sample_rate {
            stream = stream.sample_rate(sample_rate);
        }
        stream
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Quantity {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl Quantity {
    fn normalize(self, field: &str) -> TransformResult<u64> {
        match self {
            Quantity::Integer(value) => Ok(value),
            Quantity::Float(value) => from_number(field, value),
            Quantity::Text(value) => parse_shorthand(field, &value),
        }
    }
}

fn normalize(quantity: Option<Quantity>, field: impl FnOnce() -> String) -> TransformResult<Option<u64>> {
    quantity.map(|q| q.normalize(&field())).transpose()
}

#[derive(Debug, Deserialize)]
struct RawMediaProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    video: Option<OneOrMany<RawVideoProfile>>,
    #[serde(default)]
    audio: Option<OneOrMany<RawAudioProfile>>,
}

#[derive(Debug, Deserialize)]
struct RawVideoProfile {
    width: Option<u32>,
    height: Option<u32>,
    codec: Option<String>,
    profile: Option<String>,
    preset: Option<String>,
    pixel_format: Option<String>,
    bitrate: Option<Quantity>,
    frame_rate: Option<f64>,
    keyframe_interval: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawAudioProfile {
    codec: Option<String>,
    bitrate: Option<Quantity>,
    sample_rate: Option<Quantity>,
}

impl TryFrom<RawMediaProfile> for MediaProfile {
    type Error = TransformError;

    fn try_from(raw: RawMediaProfile) -> Result<Self, Self::Error> {
        let video = raw
            .video
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, track)| -> TransformResult<VideoProfile> {
                Ok(VideoProfile {
                    width: track.width,
                    height: track.height,
                    codec: track.codec,
                    profile: track.profile,
                    preset: track.preset,
                    pixel_format: track.pixel_format,
                    bitrate: normalize(track.bitrate, || format!("video[{i}].bitrate"))?,
                    frame_rate: track.frame_rate,
                    keyframe_interval: track.keyframe_interval,
                })
            })
            .collect::<TransformResult<Vec<_>>>()?;

        let audio = raw
            .audio
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, track)| -> TransformResult<AudioProfile> {
                Ok(AudioProfile {
                    codec: track.codec,
                    bitrate: normalize(track.bitrate, || format!("audio[{i}].bitrate"))?,
                    sample_rate: normalize(track.sample_rate, || format!("audio[{i}].sample_rate"))?,
                })
            })
            .collect::<TransformResult<Vec<_>>>()?;

        Ok(MediaProfile {
            name: raw.name,
            format: raw.format,
            video,
            audio,
        })
    }
}

#[derive(Debug, Serialize)]
struct CanonicalMediaProfile {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    video: Vec<CanonicalVideoProfile>,
    audio: Vec<CanonicalAudioProfile>,
}

#[derive(Debug, Serialize)]
struct CanonicalVideoProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pixel_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bitrate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyframe_interval: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CanonicalAudioProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bitrate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<String>,
}

impl From<MediaProfile> for CanonicalMediaProfile {
    fn from(profile: MediaProfile) -> Self {
        Self {
            name: profile.name,
            format: profile.format,
            video: profile
                .video
                .into_iter()
                .map(|track| CanonicalVideoProfile {
                    width: track.width,
                    height: track.height,
                    codec: track.codec,
                    profile: track.profile,
                    preset: track.preset,
                    pixel_format: track.pixel_format,
                    bitrate: track.bitrate.map(|v| v.to_string()),
                    frame_rate: track.frame_rate,
                    keyframe_interval: track.keyframe_interval,
                })
                .collect(),
            audio: profile
                .audio
                .into_iter()
                .map(|track| CanonicalAudioProfile {
                    codec: track.codec,
                    bitrate: track.bitrate.map(|v| v.to_string()),
                    sample_rate: track.sample_rate.map(|v| v.to_string()),
                })
                .collect(),
        }
    }
}
