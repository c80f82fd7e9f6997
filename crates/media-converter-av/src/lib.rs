//! # media-converter-av
//!
//! Declarative ffmpeg command compiler.
//!
//! This crate provides functionality for:
//! - Describing input streams from files or generators (silence, blank frames)
//! - Building output streams with ordered filter chains (scale, crop,
//!   deinterlace, overlay)
//! - Binding output streams to codecs as tracks
//! - Compiling tracks into one ffmpeg argument list and running it, with
//!   atomic publication of the output file
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use media_converter_av::codecs::{Aac, H264};
//! use media_converter_av::{MediaConverter, StreamInput, Track};
//! use std::time::Duration;
//!
//! // Ten seconds of black frames with silence
//! let converter = MediaConverter::new(
//!     vec![
//!         Track::video(StreamInput::Synthetic, H264::default())?,
//!         Track::audio(StreamInput::Synthetic, Aac::default())?,
//!     ],
//!     "blank.mp4",
//! )?;
//! converter.convert_for(Duration::from_secs(10))?;
//! # Ok::<(), media_converter_av::Error>(())
//! ```

pub mod codecs;
pub mod config;
mod converter;
mod error;
pub mod filter_graph;
pub mod streams;
pub mod tools;
mod track;
pub mod workspace;

// Re-exports
pub use codecs::Codec;
pub use config::ConverterConfig;
pub use converter::{ConvertInput, MediaConverter};
pub use error::{Error, Result};
pub use streams::{
    AudioOutstream, FilterStep, Instream, Outstream, Source, StreamInput, StreamKind,
    SubtitleOutstream, Synthetic, VideoOutstream,
};
pub use tools::{check_ffmpeg, check_tool, require_tool, ToolInfo};
pub use track::{Track, TrackInput};
pub use workspace::Workspace;
