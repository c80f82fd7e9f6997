//! Input and output stream descriptions.

mod instream;
mod outstream;

pub use instream::{
    Instream, Source, StreamInput, StreamKind, Synthetic, DEFAULT_BLANK_FRAME_RATE,
    DEFAULT_BLANK_HEIGHT, DEFAULT_BLANK_WIDTH, DEFAULT_SAMPLE_RATE, NULL_DEVICE,
};
pub use outstream::{AudioOutstream, FilterStep, Outstream, SubtitleOutstream, VideoOutstream};
