use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "media-converter")]
#[command(author, version, about = "Declarative ffmpeg conversions")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a file (or generated streams) into a new file
    Convert(ConvertArgs),

    /// Check that ffmpeg is available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}

/// Video filters are applied in a fixed order: crop, deinterlace, scale,
/// overlay.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source file (not needed when every stream is generated)
    pub input: Option<PathBuf>,

    /// Destination file; the container follows its extension
    #[arg(short, long)]
    pub output: PathBuf,

    /// Video codec (defaults to the configured one)
    #[arg(long, value_enum)]
    pub video_codec: Option<VideoCodecArg>,

    /// Constant rate factor for h264/h265
    #[arg(long)]
    pub crf: Option<u8>,

    /// Encoder preset for h264/h265
    #[arg(long)]
    pub preset: Option<String>,

    /// Audio codec (defaults to the configured one)
    #[arg(long, value_enum)]
    pub audio_codec: Option<AudioCodecArg>,

    /// Audio bitrate, e.g. 256k
    #[arg(long)]
    pub audio_bitrate: Option<String>,

    /// Output width; height keeps the aspect ratio if not given
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height; width keeps the aspect ratio if not given
    #[arg(long)]
    pub height: Option<u32>,

    /// Crop area, e.g. 1280:720:0:0
    #[arg(long)]
    pub crop: Option<String>,

    /// Deinterlace with yadif
    #[arg(long, conflicts_with = "deinterlace_slow")]
    pub deinterlace: bool,

    /// Deinterlace with yadif=3 followed by mcdeint
    #[arg(long)]
    pub deinterlace_slow: bool,

    /// Image or video drawn on top of the video
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Horizontal overlay position
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub overlay_x: i32,

    /// Vertical overlay position
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub overlay_y: i32,

    /// Leave audio out of the output
    #[arg(long, conflicts_with = "silent_audio")]
    pub no_audio: bool,

    /// Use generated blank frames instead of the input's video
    #[arg(long)]
    pub blank_video: bool,

    /// Use generated silence instead of the input's audio
    #[arg(long)]
    pub silent_audio: bool,

    /// Limit the output to this many seconds
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Print the ffmpeg command without running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VideoCodecArg {
    H264,
    H265,
    Mpeg2,
    Copy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AudioCodecArg {
    Aac,
    Ac3,
    Mp2,
    Copy,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number of seconds"))?;
    if secs <= 0.0 {
        return Err("duration must be positive".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("2.5"), Ok(Duration::from_millis(2500)));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("-3").is_err());
        assert!(parse_duration("ten").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
