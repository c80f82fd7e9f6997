//! Tracks: an outstream bound to the codec that encodes it.

use crate::codecs::Codec;
use crate::streams::{
    AudioOutstream, Instream, Outstream, StreamInput, StreamKind, SubtitleOutstream,
    VideoOutstream, DEFAULT_SAMPLE_RATE,
};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Anything a track can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackInput {
    /// A path, instream or generator, wrapped in an unfiltered outstream.
    Stream(StreamInput),
    /// An outstream used as-is.
    Outstream(Outstream),
}

macro_rules! track_input_from_stream {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TrackInput {
                fn from(value: $ty) -> Self {
                    TrackInput::Stream(value.into())
                }
            }
        )*
    };
}

track_input_from_stream!(&str, String, PathBuf, &Path, &PathBuf, Instream);

impl From<StreamInput> for TrackInput {
    fn from(input: StreamInput) -> Self {
        TrackInput::Stream(input)
    }
}

impl From<Outstream> for TrackInput {
    fn from(outstream: Outstream) -> Self {
        TrackInput::Outstream(outstream)
    }
}

impl From<VideoOutstream> for TrackInput {
    fn from(outstream: VideoOutstream) -> Self {
        TrackInput::Outstream(outstream.into())
    }
}

impl From<AudioOutstream> for TrackInput {
    fn from(outstream: AudioOutstream) -> Self {
        TrackInput::Outstream(outstream.into())
    }
}

impl From<SubtitleOutstream> for TrackInput {
    fn from(outstream: SubtitleOutstream) -> Self {
        TrackInput::Outstream(outstream.into())
    }
}

/// One stream of the output file.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    outstream: Outstream,
    codec: Codec,
}

impl Track {
    /// Bind an outstream to a codec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSource`] if the codec encodes a different kind
    /// of stream than the outstream carries, or if a filtered outstream is
    /// paired with [`Codec::Copy`] (filter output must be re-encoded).
    pub fn new(outstream: impl Into<Outstream>, codec: impl Into<Codec>) -> Result<Self> {
        let outstream = outstream.into();
        let codec = codec.into();

        if !codec.accepts(outstream.kind()) {
            return Err(Error::invalid_source(format!(
                "{:?} cannot encode a {} track",
                codec,
                outstream.kind()
            )));
        }
        if outstream.is_filtered() && codec == Codec::Copy {
            return Err(Error::invalid_source(format!(
                "filtered {} track cannot be stream copied",
                outstream.kind()
            )));
        }

        Ok(Self { outstream, codec })
    }

    /// Build a track of `kind`, coercing `input` into an outstream.
    ///
    /// A synthetic audio input generates silence at the codec's sample
    /// rate.
    pub fn with_kind(kind: StreamKind, input: impl Into<TrackInput>, codec: impl Into<Codec>) -> Result<Self> {
        let codec = codec.into();
        let outstream = match input.into() {
            TrackInput::Outstream(outstream) if outstream.kind() == kind => outstream,
            TrackInput::Outstream(outstream) => {
                return Err(Error::invalid_source(format!(
                    "expected a {} outstream, got {}",
                    kind,
                    outstream.kind()
                )));
            }
            TrackInput::Stream(StreamInput::Synthetic) if kind == StreamKind::Audio => {
                let rate = codec.sample_rate().unwrap_or(DEFAULT_SAMPLE_RATE);
                Outstream::new(Instream::silent_audio(rate), kind)?
            }
            TrackInput::Stream(input) => Outstream::new(input, kind)?,
        };

        Self::new(outstream, codec)
    }

    pub fn video(input: impl Into<TrackInput>, codec: impl Into<Codec>) -> Result<Self> {
        Self::with_kind(StreamKind::Video, input, codec)
    }

    pub fn audio(input: impl Into<TrackInput>, codec: impl Into<Codec>) -> Result<Self> {
        Self::with_kind(StreamKind::Audio, input, codec)
    }

    pub fn subtitle(input: impl Into<TrackInput>, codec: impl Into<Codec>) -> Result<Self> {
        Self::with_kind(StreamKind::Subtitle, input, codec)
    }

    pub fn outstream(&self) -> &Outstream {
        &self.outstream
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn kind(&self) -> StreamKind {
        self.outstream.kind()
    }

    pub(crate) fn replace_instream(&mut self, from: &Instream, to: &Instream) {
        self.outstream.replace_instream(from, to);
    }

    /// Encoder flags emitted after this track's `-map` clause.
    pub fn codec_args(&self) -> Vec<String> {
        self.codec.args(self.kind())
    }
}
