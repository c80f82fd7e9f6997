use media_converter_av::codecs::{Aac, H264};
use media_converter_av::config::{BlankVideoConfig, DEFAULT_FFMPEG_PATH};
use media_converter_av::{Codec, ConverterConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub codecs: CodecsConfig,

    #[serde(default)]
    pub blank_video: BlankVideoConfig,
}

impl Config {
    /// Settings handed to the converter library.
    pub fn converter_config(&self) -> ConverterConfig {
        ConverterConfig {
            ffmpeg: self.tools.ffmpeg.clone(),
            video_codec: self.codecs.video.clone(),
            audio_codec: self.codecs.audio.clone(),
            subtitle_codec: self.codecs.subtitle.clone(),
            blank_video: self.blank_video,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg (falls back to PATH lookup when missing)
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from(DEFAULT_FFMPEG_PATH)
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
        }
    }
}

/// Codecs used when a conversion does not name one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecsConfig {
    #[serde(default = "default_video_codec")]
    pub video: Codec,

    #[serde(default = "default_audio_codec")]
    pub audio: Codec,

    #[serde(default = "default_subtitle_codec")]
    pub subtitle: Codec,
}

fn default_video_codec() -> Codec {
    H264::default().into()
}
fn default_audio_codec() -> Codec {
    Aac::default().into()
}
fn default_subtitle_codec() -> Codec {
    Codec::Copy
}

impl Default for CodecsConfig {
    fn default() -> Self {
        Self {
            video: default_video_codec(),
            audio: default_audio_codec(),
            subtitle: default_subtitle_codec(),
        }
    }
}
