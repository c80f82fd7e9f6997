//! Output streams and their filter chains.
//!
//! An [`Outstream`] is derived from one primary [`Instream`], optionally
//! processed by an ordered chain of filters. Filters that need a second
//! input (such as `overlay`) carry that instream with them, and the
//! instream is also recorded as an auxiliary input of the outstream so it
//! gets its own `-i` clause.
//!
//! The kind-specific wrappers ([`VideoOutstream`], [`AudioOutstream`],
//! [`SubtitleOutstream`]) expose the filters that make sense for their kind
//! through a consuming builder:
//!
//! ```
//! use media_converter_av::VideoOutstream;
//!
//! let video = VideoOutstream::new("a.mp4")?
//!     .crop("1280:720:0:0")
//!     .scale(None, Some(480));
//! assert_eq!(video.filters().len(), 2);
//! # Ok::<(), media_converter_av::Error>(())
//! ```

use super::instream::{Instream, StreamInput, StreamKind};
use crate::Result;
use std::ops::Deref;

/// One step of a filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStep {
    input: Option<Instream>,
    expr: String,
}

impl FilterStep {
    /// A filter applied to the running output only.
    pub fn unary(expr: impl Into<String>) -> Self {
        Self {
            input: None,
            expr: expr.into(),
        }
    }

    /// A filter that also consumes `input` as its second pad.
    pub fn binary(input: Instream, expr: impl Into<String>) -> Self {
        Self {
            input: Some(input),
            expr: expr.into(),
        }
    }

    /// The secondary input, `None` for single-input filters.
    pub fn secondary_input(&self) -> Option<&Instream> {
        self.input.as_ref()
    }

    /// Filter expression without pad labels, e.g. `scale=-2:480`.
    pub fn expression(&self) -> &str {
        &self.expr
    }
}

/// A possibly filtered output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Outstream {
    kind: StreamKind,
    instreams: Vec<Instream>,
    filters: Vec<FilterStep>,
}

impl Outstream {
    /// An unfiltered outstream of `kind` aliasing the coerced input.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidSource`] if `input` cannot become an
    /// instream of `kind`.
    pub fn new(input: impl Into<StreamInput>, kind: StreamKind) -> Result<Self> {
        let primary = Instream::factory(input, kind)?;
        Ok(Self {
            kind,
            instreams: vec![primary],
            filters: Vec::new(),
        })
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// The instream the filter chain starts from.
    pub fn primary(&self) -> &Instream {
        &self.instreams[0]
    }

    /// Secondary inputs registered by binary filters, in call order.
    pub fn auxiliary(&self) -> &[Instream] {
        &self.instreams[1..]
    }

    /// Primary instream followed by the auxiliary ones.
    pub fn instreams(&self) -> &[Instream] {
        &self.instreams
    }

    pub fn filters(&self) -> &[FilterStep] {
        &self.filters
    }

    /// Whether this outstream needs the filter graph.
    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Substitute `to` for every occurrence of `from`, including the
    /// inputs carried by binary filters.
    pub(crate) fn replace_instream(&mut self, from: &Instream, to: &Instream) {
        let carried = self.filters.iter_mut().filter_map(|step| step.input.as_mut());
        for instream in self.instreams.iter_mut().chain(carried) {
            if *instream == *from {
                *instream = to.clone();
            }
        }
    }

    fn push(&mut self, step: FilterStep) {
        if let Some(input) = step.secondary_input() {
            self.instreams.push(input.clone());
        }
        self.filters.push(step);
    }
}

macro_rules! outstream_wrapper {
    ($name:ident, $kind:expr) => {
        impl $name {
            /// Wrap `input` as an unfiltered outstream.
            pub fn new(input: impl Into<StreamInput>) -> Result<Self> {
                Outstream::new(input, $kind).map(Self)
            }

            /// Unwrap into the kind-agnostic outstream.
            pub fn into_inner(self) -> Outstream {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Outstream;

            fn deref(&self) -> &Outstream {
                &self.0
            }
        }

        impl From<$name> for Outstream {
            fn from(outstream: $name) -> Self {
                outstream.0
            }
        }
    };
}

/// Video outstream with scaling, cropping, deinterlacing and overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoOutstream(Outstream);

/// Audio outstream.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOutstream(Outstream);

/// Subtitle outstream. Subtitles cannot go through the filter graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleOutstream(Outstream);

outstream_wrapper!(VideoOutstream, StreamKind::Video);
outstream_wrapper!(AudioOutstream, StreamKind::Audio);
outstream_wrapper!(SubtitleOutstream, StreamKind::Subtitle);

impl VideoOutstream {
    /// Scale to `width`x`height`; a missing dimension keeps the aspect
    /// ratio, rounded to an even size (`-2`).
    pub fn scale(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        let dim = |d: Option<u32>| d.map_or_else(|| "-2".to_string(), |v| v.to_string());
        self.0
            .push(FilterStep::unary(format!("scale={}:{}", dim(width), dim(height))));
        self
    }

    pub fn deinterlace(mut self) -> Self {
        self.0.push(FilterStep::unary("yadif"));
        self
    }

    /// Field-rate deinterlacing followed by motion-compensated cleanup.
    pub fn deinterlace_slow(mut self) -> Self {
        self.0.push(FilterStep::unary("yadif=3"));
        self.0.push(FilterStep::unary("mcdeint=2:1:10"));
        self
    }

    /// Crop to `area`, an ffmpeg crop geometry such as `1280:720:0:0`.
    pub fn crop(mut self, area: impl Into<String>) -> Self {
        self.0
            .push(FilterStep::unary(format!("crop={}", area.into())));
        self
    }

    /// Draw `input` on top of the running output at (`x`, `y`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidSource`] if `input` is not usable as a
    /// video instream.
    pub fn overlay(mut self, input: impl Into<StreamInput>, x: i32, y: i32) -> Result<Self> {
        let instream = Instream::factory(input, StreamKind::Video)?;
        self.0
            .push(FilterStep::binary(instream, format!("overlay={}:{}", x, y)));
        Ok(self)
    }

    /// Append a raw single-input filter expression.
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.0.push(FilterStep::unary(expr));
        self
    }
}

impl AudioOutstream {
    /// Scale the amplitude by `factor`.
    pub fn volume(mut self, factor: f64) -> Self {
        self.0
            .push(FilterStep::unary(format!("volume={}", factor)));
        self
    }

    /// Append a raw single-input filter expression.
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.0.push(FilterStep::unary(expr));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use assert_matches::assert_matches;

    fn expressions(outstream: &Outstream) -> Vec<&str> {
        outstream.filters().iter().map(FilterStep::expression).collect()
    }

    #[test]
    fn test_unfiltered_outstream_aliases_primary() {
        let video = VideoOutstream::new("a.mp4").unwrap();
        assert!(!video.is_filtered());
        assert_eq!(video.primary(), &Instream::video("a.mp4").unwrap());
        assert!(video.auxiliary().is_empty());
    }

    #[test]
    fn test_scale_defaults_to_even_aspect() {
        let video = VideoOutstream::new("a.mp4").unwrap().scale(None, Some(480));
        assert_eq!(expressions(&video), ["scale=-2:480"]);

        let video = VideoOutstream::new("a.mp4").unwrap().scale(Some(1280), None);
        assert_eq!(expressions(&video), ["scale=1280:-2"]);
    }

    #[test]
    fn test_deinterlace_slow_adds_two_stages() {
        let video = VideoOutstream::new("a.mp4").unwrap().deinterlace_slow();
        assert_eq!(expressions(&video), ["yadif=3", "mcdeint=2:1:10"]);
        assert!(video.filters().iter().all(|f| f.secondary_input().is_none()));
    }

    #[test]
    fn test_filters_keep_call_order() {
        let video = VideoOutstream::new("a.mp4")
            .unwrap()
            .crop("1280:720:0:0")
            .deinterlace()
            .scale(Some(640), Some(360));
        assert_eq!(
            expressions(&video),
            ["crop=1280:720:0:0", "yadif", "scale=640:360"]
        );
    }

    #[test]
    fn test_overlay_registers_auxiliary_instream() {
        let video = VideoOutstream::new("a.mp4")
            .unwrap()
            .overlay("logo.png", 10, 20)
            .unwrap();

        let logo = Instream::video("logo.png").unwrap();
        assert_eq!(video.auxiliary(), std::slice::from_ref(&logo));
        assert_eq!(video.instreams().len(), 2);
        assert_eq!(video.filters()[0].expression(), "overlay=10:20");
        assert_eq!(video.filters()[0].secondary_input(), Some(&logo));
    }

    #[test]
    fn test_overlay_rejects_non_video_instream() {
        let audio = Instream::audio("a.mp4").unwrap();
        let result = VideoOutstream::new("a.mp4").unwrap().overlay(audio, 0, 0);
        assert_matches!(result, Err(Error::InvalidSource(_)));
    }

    #[test]
    fn test_primary_kind_must_match() {
        let audio = Instream::audio("a.mp4").unwrap();
        assert_matches!(VideoOutstream::new(audio), Err(Error::InvalidSource(_)));
    }

    #[test]
    fn test_audio_filters() {
        let audio = AudioOutstream::new("a.wav")
            .unwrap()
            .volume(0.5)
            .filter("aresample=48000");
        assert_eq!(expressions(&audio), ["volume=0.5", "aresample=48000"]);
        assert_eq!(audio.kind(), StreamKind::Audio);
    }

    #[test]
    fn test_into_outstream() {
        let subtitle = SubtitleOutstream::new("a.mkv").unwrap();
        let outstream: Outstream = subtitle.into();
        assert_eq!(outstream.kind(), StreamKind::Subtitle);
        assert!(!outstream.is_filtered());
    }
}
