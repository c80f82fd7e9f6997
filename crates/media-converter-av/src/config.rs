//! Converter configuration.

use crate::codecs::{Aac, Codec, H264};
use crate::streams::{
    Instream, StreamKind, DEFAULT_BLANK_FRAME_RATE, DEFAULT_BLANK_HEIGHT, DEFAULT_BLANK_WIDTH,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the transcoding tool.
pub const DEFAULT_FFMPEG_PATH: &str = "/usr/local/bin/ffmpeg";

/// Settings shared by every conversion: which tool to run and which codecs
/// to use for tracks that do not name one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Path to ffmpeg; falls back to a `PATH` lookup if it does not exist.
    pub ffmpeg: PathBuf,
    pub video_codec: Codec,
    pub audio_codec: Codec,
    pub subtitle_codec: Codec,
    pub blank_video: BlankVideoConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG_PATH),
            video_codec: H264::default().into(),
            audio_codec: Aac::default().into(),
            subtitle_codec: Codec::Copy,
            blank_video: BlankVideoConfig::default(),
        }
    }
}

/// Raster of generated blank video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlankVideoConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for BlankVideoConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BLANK_WIDTH,
            height: DEFAULT_BLANK_HEIGHT,
            frame_rate: DEFAULT_BLANK_FRAME_RATE,
        }
    }
}

impl ConverterConfig {
    /// Codec used for a track of `kind` that does not specify one.
    pub fn default_codec(&self, kind: StreamKind) -> &Codec {
        match kind {
            StreamKind::Video => &self.video_codec,
            StreamKind::Audio => &self.audio_codec,
            StreamKind::Subtitle => &self.subtitle_codec,
        }
    }

    /// Blank video generator with the configured raster.
    pub fn blank_video(&self) -> Instream {
        Instream::blank_video_sized(
            self.blank_video.width,
            self.blank_video.height,
            self.blank_video.frame_rate,
        )
    }

    /// Check that the settings can produce a valid command.
    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg.as_os_str().is_empty() {
            return Err(Error::invalid_source("ffmpeg path is empty"));
        }

        for kind in [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle] {
            let codec = self.default_codec(kind);
            if !codec.accepts(kind) {
                return Err(Error::invalid_source(format!(
                    "default {} codec {:?} does not encode {} streams",
                    kind, codec, kind
                )));
            }
            if codec.sample_rate() == Some(0) {
                return Err(Error::invalid_source(format!(
                    "default {} codec has a zero sample rate",
                    kind
                )));
            }
        }

        let blank = &self.blank_video;
        if blank.width == 0 || blank.height == 0 || blank.frame_rate == 0 {
            return Err(Error::invalid_source(
                "blank video width, height and frame rate must be non-zero",
            ));
        }

        Ok(())
    }
}
