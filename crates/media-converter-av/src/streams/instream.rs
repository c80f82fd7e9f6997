//! Input streams: one demuxed stream of a source file or a generator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Device the synthetic generators read from.
pub const NULL_DEVICE: &str = "/dev/zero";

/// Sample rate used for silent audio when nothing else specifies one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default blank video raster.
pub const DEFAULT_BLANK_WIDTH: u32 = 640;
pub const DEFAULT_BLANK_HEIGHT: u32 = 360;
pub const DEFAULT_BLANK_FRAME_RATE: u32 = 30;

/// Kind of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
}

impl StreamKind {
    /// Stream specifier letter used by ffmpeg (`v`, `a`, `s`).
    pub fn code(&self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
            StreamKind::Subtitle => "s",
        }
    }

    /// Prefix of the filter graph output labels for this kind.
    pub fn label_prefix(&self) -> &'static str {
        match self {
            StreamKind::Video => "vout",
            StreamKind::Audio => "aout",
            StreamKind::Subtitle => "sout",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// A generated (non-file) input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Synthetic {
    /// Mono 16-bit silence.
    SilentAudio { sample_rate: u32 },
    /// Raw black RGB frames.
    BlankVideo {
        width: u32,
        height: u32,
        frame_rate: u32,
    },
}

impl Synthetic {
    /// Kind of stream the generator produces.
    pub fn kind(&self) -> StreamKind {
        match self {
            Synthetic::SilentAudio { .. } => StreamKind::Audio,
            Synthetic::BlankVideo { .. } => StreamKind::Video,
        }
    }

    /// The input clause for this generator, ending with `-i /dev/zero`.
    pub fn input_args(&self) -> Vec<String> {
        let mut args: Vec<String> = match self {
            Synthetic::SilentAudio { sample_rate } => vec![
                "-ar".into(),
                sample_rate.to_string(),
                "-ac".into(),
                "1".into(),
                "-f".into(),
                "s16le".into(),
            ],
            Synthetic::BlankVideo {
                width,
                height,
                frame_rate,
            } => vec![
                "-s".into(),
                format!("{}x{}", width, height),
                "-f".into(),
                "rawvideo".into(),
                "-pix_fmt".into(),
                "rgb24".into(),
                "-r".into(),
                frame_rate.to_string(),
            ],
        };
        args.push("-i".into());
        args.push(NULL_DEVICE.into());
        args
    }
}

/// Where an instream's data comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    File(PathBuf),
    Synthetic(Synthetic),
}

/// A single demuxed input stream.
///
/// Instreams are immutable values; two instreams on the same file are
/// assigned the same input index when a command is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instream {
    source: Source,
    kind: StreamKind,
    selector: usize,
}

/// Anything that can be turned into an [`Instream`] of a requested kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamInput {
    /// A file; wrapped as stream 0 of the requested kind.
    Path(PathBuf),
    /// An instream used as-is.
    Instream(Instream),
    /// The generator for the requested kind (silence or blank frames).
    Synthetic,
}

impl From<&str> for StreamInput {
    fn from(path: &str) -> Self {
        StreamInput::Path(PathBuf::from(path))
    }
}

impl From<String> for StreamInput {
    fn from(path: String) -> Self {
        StreamInput::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for StreamInput {
    fn from(path: PathBuf) -> Self {
        StreamInput::Path(path)
    }
}

impl From<&Path> for StreamInput {
    fn from(path: &Path) -> Self {
        StreamInput::Path(path.to_path_buf())
    }
}

impl From<&PathBuf> for StreamInput {
    fn from(path: &PathBuf) -> Self {
        StreamInput::Path(path.clone())
    }
}

impl From<Instream> for StreamInput {
    fn from(instream: Instream) -> Self {
        StreamInput::Instream(instream)
    }
}

impl Instream {
    /// Select stream `selector` of `kind` from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSource`] if the path is empty.
    pub fn new(path: impl Into<PathBuf>, kind: StreamKind, selector: usize) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_source(format!(
                "empty path for {} instream",
                kind
            )));
        }

        Ok(Self {
            source: Source::File(path),
            kind,
            selector,
        })
    }

    /// First video stream of a file.
    pub fn video(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, StreamKind::Video, 0)
    }

    /// First audio stream of a file.
    pub fn audio(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, StreamKind::Audio, 0)
    }

    /// First subtitle stream of a file.
    pub fn subtitle(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, StreamKind::Subtitle, 0)
    }

    /// Silent mono audio at the given sample rate.
    pub fn silent_audio(sample_rate: u32) -> Self {
        Self::synthetic(Synthetic::SilentAudio { sample_rate })
    }

    /// Blank 640x360 video at 30 fps.
    pub fn blank_video() -> Self {
        Self::blank_video_sized(
            DEFAULT_BLANK_WIDTH,
            DEFAULT_BLANK_HEIGHT,
            DEFAULT_BLANK_FRAME_RATE,
        )
    }

    /// Blank video with an explicit raster and frame rate.
    pub fn blank_video_sized(width: u32, height: u32, frame_rate: u32) -> Self {
        Self::synthetic(Synthetic::BlankVideo {
            width,
            height,
            frame_rate,
        })
    }

    fn synthetic(generator: Synthetic) -> Self {
        Self {
            kind: generator.kind(),
            source: Source::Synthetic(generator),
            selector: 0,
        }
    }

    /// Coerce `input` into an instream of `kind`.
    ///
    /// Instreams pass through unchanged, paths become stream 0 of `kind`
    /// and [`StreamInput::Synthetic`] becomes the generator for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSource`] if an instream of another kind is
    /// given, the path is empty, or a subtitle generator is requested.
    pub fn factory(input: impl Into<StreamInput>, kind: StreamKind) -> Result<Self> {
        match input.into() {
            StreamInput::Instream(instream) if instream.kind == kind => Ok(instream),
            StreamInput::Instream(instream) => Err(Error::invalid_source(format!(
                "expected a {} instream, got {}",
                kind, instream.kind
            ))),
            StreamInput::Path(path) => Self::new(path, kind, 0),
            StreamInput::Synthetic => match kind {
                StreamKind::Video => Ok(Self::blank_video()),
                StreamKind::Audio => Ok(Self::silent_audio(DEFAULT_SAMPLE_RATE)),
                StreamKind::Subtitle => Err(Error::invalid_source(
                    "subtitle streams cannot be generated",
                )),
            },
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn selector(&self) -> usize {
        self.selector
    }

    /// Source file path, `None` for generators.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Synthetic(_) => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.source, Source::Synthetic(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_factory_wraps_path_as_first_stream() {
        let instream = Instream::factory("a.mp4", StreamKind::Audio).unwrap();
        assert_eq!(instream.path(), Some(Path::new("a.mp4")));
        assert_eq!(instream.kind(), StreamKind::Audio);
        assert_eq!(instream.selector(), 0);
        assert!(!instream.is_synthetic());
    }

    #[test]
    fn test_factory_passes_instream_through() {
        let original = Instream::new("a.mkv", StreamKind::Audio, 2).unwrap();
        let instream = Instream::factory(original.clone(), StreamKind::Audio).unwrap();
        assert_eq!(instream, original);
    }

    #[test]
    fn test_factory_rejects_wrong_kind() {
        let audio = Instream::audio("a.mkv").unwrap();
        let result = Instream::factory(audio, StreamKind::Video);
        assert_matches!(result, Err(Error::InvalidSource(msg)) if msg.contains("expected a video"));
    }

    #[test]
    fn test_factory_rejects_empty_path() {
        assert_matches!(
            Instream::factory("", StreamKind::Video),
            Err(Error::InvalidSource(_))
        );
    }

    #[test]
    fn test_factory_synthetic() {
        let video = Instream::factory(StreamInput::Synthetic, StreamKind::Video).unwrap();
        assert_eq!(video, Instream::blank_video());

        let audio = Instream::factory(StreamInput::Synthetic, StreamKind::Audio).unwrap();
        assert_eq!(
            audio.source(),
            &Source::Synthetic(Synthetic::SilentAudio { sample_rate: 44100 })
        );

        assert_matches!(
            Instream::factory(StreamInput::Synthetic, StreamKind::Subtitle),
            Err(Error::InvalidSource(_))
        );
    }

    #[test]
    fn test_blank_video_input_clause() {
        let Source::Synthetic(generator) = Instream::blank_video().source().clone() else {
            panic!("blank video should be synthetic");
        };
        assert_eq!(
            generator.input_args(),
            ["-s", "640x360", "-f", "rawvideo", "-pix_fmt", "rgb24", "-r", "30", "-i", "/dev/zero"]
        );
    }

    #[test]
    fn test_silent_audio_input_clause() {
        let generator = Synthetic::SilentAudio { sample_rate: 48000 };
        assert_eq!(
            generator.input_args(),
            ["-ar", "48000", "-ac", "1", "-f", "s16le", "-i", "/dev/zero"]
        );
        assert_eq!(generator.kind(), StreamKind::Audio);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(StreamKind::Video.code(), "v");
        assert_eq!(StreamKind::Audio.code(), "a");
        assert_eq!(StreamKind::Subtitle.code(), "s");
        assert_eq!(StreamKind::Audio.label_prefix(), "aout");
    }
}
