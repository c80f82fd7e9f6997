//! Codec settings and their encoder flags.
//!
//! Each codec family is a plain settings struct with sensible defaults;
//! [`Codec`] wraps them so a track can hold any of them and render the
//! encoder flags that follow its `-map` clause.

use crate::streams::StreamKind;
use serde::{Deserialize, Serialize};

/// H.264 via the `h264` encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct H264 {
    pub crf: u8,
    pub pix_fmt: String,
    pub profile: String,
    pub level: String,
    pub preset: Option<String>,
}

impl Default for H264 {
    fn default() -> Self {
        Self {
            crf: 23,
            pix_fmt: "yuv420p".to_string(),
            profile: "high".to_string(),
            level: "3.1".to_string(),
            preset: None,
        }
    }
}

impl H264 {
    fn args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), "h264".to_string()];
        if let Some(ref preset) = self.preset {
            args.extend(["-preset".to_string(), preset.clone()]);
        }
        args.extend([
            "-crf".to_string(),
            self.crf.to_string(),
            "-pix_fmt".to_string(),
            self.pix_fmt.clone(),
            "-profile:v".to_string(),
            self.profile.clone(),
            "-level".to_string(),
            self.level.clone(),
        ]);
        args
    }
}

/// H.265 via `libx265`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct H265 {
    pub crf: u8,
    pub preset: String,
}

impl Default for H265 {
    fn default() -> Self {
        Self {
            crf: 28,
            preset: "medium".to_string(),
        }
    }
}

impl H265 {
    pub fn new(crf: u8, preset: impl Into<String>) -> Self {
        Self {
            crf,
            preset: preset.into(),
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            "libx265".to_string(),
            "-preset".to_string(),
            self.preset.clone(),
            "-x265-params".to_string(),
            format!("crf={}", self.crf),
        ]
    }
}

/// MPEG-2 video at a fixed bitrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mpeg2 {
    pub bitrate: String,
    pub aspect: Option<String>,
    pub frame_rate: Option<String>,
}

impl Default for Mpeg2 {
    fn default() -> Self {
        Self {
            bitrate: "5000k".to_string(),
            aspect: None,
            frame_rate: None,
        }
    }
}

impl Mpeg2 {
    pub fn new(
        bitrate: impl Into<String>,
        aspect: impl Into<String>,
        frame_rate: impl Into<String>,
    ) -> Self {
        Self {
            bitrate: bitrate.into(),
            aspect: Some(aspect.into()),
            frame_rate: Some(frame_rate.into()),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            "mpeg2video".to_string(),
            "-b:v".to_string(),
            self.bitrate.clone(),
        ];
        if let Some(ref aspect) = self.aspect {
            args.extend(["-aspect".to_string(), aspect.clone()]);
        }
        if let Some(ref rate) = self.frame_rate {
            args.extend(["-r".to_string(), rate.clone()]);
        }
        args
    }
}

macro_rules! audio_codec {
    ($(#[$doc:meta])* $name:ident, $encoder:literal, $bitrate:literal, $channels:literal, $rate:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub bitrate: String,
            pub channels: u8,
            pub sample_rate: u32,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    bitrate: $bitrate.to_string(),
                    channels: $channels,
                    sample_rate: $rate,
                }
            }
        }

        impl $name {
            pub fn new(bitrate: impl Into<String>, channels: u8, sample_rate: u32) -> Self {
                Self {
                    bitrate: bitrate.into(),
                    channels,
                    sample_rate,
                }
            }

            fn args(&self) -> Vec<String> {
                vec![
                    "-c:a".to_string(),
                    $encoder.to_string(),
                    "-b:a".to_string(),
                    self.bitrate.clone(),
                    "-ac".to_string(),
                    self.channels.to_string(),
                    "-ar".to_string(),
                    self.sample_rate.to_string(),
                ]
            }
        }
    };
}

audio_codec!(
    /// AAC, stereo by default.
    Aac, "aac", "192k", 2, 44100
);
audio_codec!(
    /// AC-3, 5.1 by default.
    Ac3, "ac3", "448k", 6, 48000
);
audio_codec!(
    /// MPEG-1 Layer II.
    Mp2, "mp2", "256k", 2, 44100
);

/// Encoder settings for one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "lowercase")]
pub enum Codec {
    H264(H264),
    H265(H265),
    Mpeg2(Mpeg2),
    Aac(Aac),
    Ac3(Ac3),
    Mp2(Mp2),
    /// MP4 timed text subtitles.
    MovText,
    /// SubRip subtitles.
    Srt,
    /// Stream copy, valid for every kind.
    Copy,
}

impl Codec {
    /// The stream kind this codec encodes; `None` for [`Codec::Copy`].
    pub fn kind(&self) -> Option<StreamKind> {
        match self {
            Codec::H264(_) | Codec::H265(_) | Codec::Mpeg2(_) => Some(StreamKind::Video),
            Codec::Aac(_) | Codec::Ac3(_) | Codec::Mp2(_) => Some(StreamKind::Audio),
            Codec::MovText | Codec::Srt => Some(StreamKind::Subtitle),
            Codec::Copy => None,
        }
    }

    /// Whether this codec can encode a stream of `kind`.
    pub fn accepts(&self, kind: StreamKind) -> bool {
        match self.kind() {
            Some(k) => k == kind,
            None => true,
        }
    }

    /// Output sample rate for audio codecs.
    pub fn sample_rate(&self) -> Option<u32> {
        match self {
            Codec::Aac(c) => Some(c.sample_rate),
            Codec::Ac3(c) => Some(c.sample_rate),
            Codec::Mp2(c) => Some(c.sample_rate),
            _ => None,
        }
    }

    /// Encoder flags for a track of `kind`.
    pub fn args(&self, kind: StreamKind) -> Vec<String> {
        match self {
            Codec::H264(c) => c.args(),
            Codec::H265(c) => c.args(),
            Codec::Mpeg2(c) => c.args(),
            Codec::Aac(c) => c.args(),
            Codec::Ac3(c) => c.args(),
            Codec::Mp2(c) => c.args(),
            Codec::MovText => vec!["-c:s".to_string(), "mov_text".to_string()],
            Codec::Srt => vec!["-c:s".to_string(), "srt".to_string()],
            Codec::Copy => vec![format!("-c:{}", kind.code()), "copy".to_string()],
        }
    }
}

macro_rules! impl_from_settings {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Codec {
                fn from(settings: $variant) -> Self {
                    Codec::$variant(settings)
                }
            }
        )*
    };
}

impl_from_settings!(H264, H265, Mpeg2, Aac, Ac3, Mp2);
