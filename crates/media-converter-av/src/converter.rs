//! Command compilation and execution.
//!
//! A [`MediaConverter`] turns its tracks into one ffmpeg invocation:
//!
//! ```text
//! ffmpeg -y [generator inputs] [file inputs] [-filter_complex <graph>]
//!        (-map <target> <codec flags>)+ [-t <secs>] [-shortest] <temp output>
//! ```
//!
//! The tool writes to a private temporary file which is renamed over the
//! destination only when the tool exits successfully.

use crate::codecs::Codec;
use crate::config::ConverterConfig;
use crate::filter_graph::{FilterGraph, InputTable};
use crate::streams::{AudioOutstream, Instream, Outstream, SubtitleOutstream, VideoOutstream};
use crate::tools::{get_tool_path, tool_name};
use crate::track::Track;
use crate::workspace::Workspace;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Number of trailing stderr lines kept in a failure message.
const STDERR_TAIL_LINES: usize = 10;

/// What a conversion is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertInput {
    /// A file: its first video and first audio stream with default codecs.
    Path(PathBuf),
    /// One outstream encoded with the default codec for its kind.
    Outstream(Outstream),
    /// Explicit tracks, in output order.
    Tracks(Vec<Track>),
}

impl From<&str> for ConvertInput {
    fn from(path: &str) -> Self {
        ConvertInput::Path(PathBuf::from(path))
    }
}

impl From<String> for ConvertInput {
    fn from(path: String) -> Self {
        ConvertInput::Path(PathBuf::from(path))
    }
}

impl From<PathBuf> for ConvertInput {
    fn from(path: PathBuf) -> Self {
        ConvertInput::Path(path)
    }
}

impl From<&Path> for ConvertInput {
    fn from(path: &Path) -> Self {
        ConvertInput::Path(path.to_path_buf())
    }
}

impl From<Outstream> for ConvertInput {
    fn from(outstream: Outstream) -> Self {
        ConvertInput::Outstream(outstream)
    }
}

impl From<VideoOutstream> for ConvertInput {
    fn from(outstream: VideoOutstream) -> Self {
        ConvertInput::Outstream(outstream.into())
    }
}

impl From<AudioOutstream> for ConvertInput {
    fn from(outstream: AudioOutstream) -> Self {
        ConvertInput::Outstream(outstream.into())
    }
}

impl From<SubtitleOutstream> for ConvertInput {
    fn from(outstream: SubtitleOutstream) -> Self {
        ConvertInput::Outstream(outstream.into())
    }
}

impl From<Track> for ConvertInput {
    fn from(track: Track) -> Self {
        ConvertInput::Tracks(vec![track])
    }
}

impl From<Vec<Track>> for ConvertInput {
    fn from(tracks: Vec<Track>) -> Self {
        ConvertInput::Tracks(tracks)
    }
}

/// Converts a set of tracks into one output file using ffmpeg.
///
/// # Example
///
/// ```no_run
/// use media_converter_av::codecs::{Aac, Mpeg2};
/// use media_converter_av::{MediaConverter, Track, VideoOutstream};
///
/// let video = VideoOutstream::new("a.mp4")?.scale(None, Some(480));
/// let converter = MediaConverter::new(
///     vec![
///         Track::video(video, Mpeg2::new("3000k", "16:9", "23.97"))?,
///         Track::audio("a.mp4", Aac::new("256k", 2, 44100))?,
///     ],
///     "b.mkv",
/// )?;
/// converter.convert()?;
/// # Ok::<(), media_converter_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MediaConverter {
    config: ConverterConfig,
    tracks: Vec<Track>,
    destination: PathBuf,
}

impl MediaConverter {
    /// Create a converter with the default configuration.
    pub fn new(input: impl Into<ConvertInput>, destination: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(input, destination, ConverterConfig::default())
    }

    /// Create a converter with an explicit configuration.
    ///
    /// Blank video generated at the default raster is rendered at the
    /// configured one instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSource`] if the input yields no tracks or a
    /// default codec does not fit its track.
    pub fn with_config(
        input: impl Into<ConvertInput>,
        destination: impl Into<PathBuf>,
        config: ConverterConfig,
    ) -> Result<Self> {
        let mut tracks = match input.into() {
            ConvertInput::Path(path) => vec![
                Track::video(path.as_path(), config.video_codec.clone())?,
                Track::audio(path.as_path(), config.audio_codec.clone())?,
            ],
            ConvertInput::Outstream(outstream) => {
                let codec: Codec = config.default_codec(outstream.kind()).clone();
                vec![Track::new(outstream, codec)?]
            }
            ConvertInput::Tracks(tracks) => tracks,
        };

        if tracks.is_empty() {
            return Err(Error::invalid_source("no tracks to convert"));
        }

        let configured = config.blank_video();
        let default = Instream::blank_video();
        if configured != default {
            for track in &mut tracks {
                track.replace_instream(&default, &configured);
            }
        }

        Ok(Self {
            config,
            tracks,
            destination: destination.into(),
        })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Compile the tool arguments (everything after the program name)
    /// writing to `output`, optionally limited to `duration`.
    ///
    /// Paths are passed through as-is, so file names need not be UTF-8.
    pub fn command_args(&self, output: &Path, duration: Option<Duration>) -> Result<Vec<OsString>> {
        let inputs = InputTable::collect(&self.tracks);
        let graph = FilterGraph::build(&self.tracks, &inputs)?;

        let mut args: Vec<OsString> = vec!["-y".into()];
        args.extend(inputs.input_args());

        if let Some(filter_complex) = graph.render() {
            args.push("-filter_complex".into());
            args.push(filter_complex.into());
        }

        for (i, track) in self.tracks.iter().enumerate() {
            let target = match graph.label(i) {
                Some(label) => format!("[{}]", label),
                None => inputs.stream_label(track.outstream().primary())?,
            };
            args.push("-map".into());
            args.push(target.into());
            args.extend(track.codec_args().into_iter().map(OsString::from));
        }

        if let Some(duration) = duration {
            args.push("-t".into());
            args.push(duration.as_secs_f64().to_string().into());
        }

        // Generators never end on their own.
        if inputs.has_synthetic() && inputs.has_files() {
            args.push("-shortest".into());
        }

        args.push(output.into());
        Ok(args)
    }

    /// Run the conversion and publish the result at the destination.
    pub fn convert(&self) -> Result<PathBuf> {
        self.run(None)
    }

    /// Run the conversion limited to `duration`, e.g. to render a fixed
    /// length of generated silence.
    pub fn convert_for(&self, duration: Duration) -> Result<PathBuf> {
        self.run(Some(duration))
    }

    fn run(&self, duration: Option<Duration>) -> Result<PathBuf> {
        let ffmpeg = get_tool_path("ffmpeg", Some(&self.config.ffmpeg))?;
        let tool = tool_name(&ffmpeg);

        let workspace = Workspace::new(&self.destination)?;
        let args = self.command_args(workspace.output(), duration)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Converting {} track(s) to {:?}",
            self.tracks.len(),
            self.destination
        );
        #[cfg(feature = "tracing")]
        tracing::debug!("Running {:?} {:?}", ffmpeg, args);

        let output = match Command::new(&ffmpeg).args(&args).output() {
            Ok(output) => output,
            Err(e) => {
                workspace.discard();
                return Err(if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(tool)
                } else {
                    Error::Io(e)
                });
            }
        };

        if !output.status.success() {
            let _leftover = workspace.abandon();
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(
                tool,
                output.status.code(),
                stderr_tail(&stderr),
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("{} exited successfully", tool);

        workspace.finalize()
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::{Aac, Ac3, H264, H265, Mp2, Mpeg2};
    use crate::config::BlankVideoConfig;
    use crate::streams::{StreamInput, StreamKind};
    use assert_matches::assert_matches;

    fn args(converter: &MediaConverter, duration: Option<Duration>) -> Vec<String> {
        converter
            .command_args(Path::new("tmp.mkv"), duration)
            .unwrap()
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    const PROBE: [&str; 4] = ["-analyzeduration", "2147483647", "-probesize", "2147483647"];

    fn expected(parts: &[&[&str]]) -> Vec<String> {
        parts.iter().flat_map(|p| p.iter()).map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_simple_convert() {
        let converter = MediaConverter::new("a.mp4", "b.mkv").unwrap();
        assert_eq!(
            args(&converter, None),
            expected(&[
                &["-y"],
                &PROBE,
                &["-i", "a.mp4"],
                &["-map", "0:v:0", "-c:v", "h264", "-crf", "23", "-pix_fmt", "yuv420p"],
                &["-profile:v", "high", "-level", "3.1"],
                &["-map", "0:a:0", "-c:a", "aac", "-b:a", "192k", "-ac", "2", "-ar", "44100"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_audio_only() {
        let track = Track::audio("a.wav", Aac::new("256k", 2, 44100)).unwrap();
        let converter = MediaConverter::new(track, "a.m4a").unwrap();
        assert_eq!(
            args(&converter, None),
            expected(&[
                &["-y"],
                &PROBE,
                &["-i", "a.wav"],
                &["-map", "0:a:0", "-c:a", "aac", "-b:a", "256k", "-ac", "2", "-ar", "44100"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_same_file_single_input() {
        let converter = MediaConverter::new(
            vec![
                Track::video("a.mp4", Mpeg2::new("3000k", "16:9", "23.97")).unwrap(),
                Track::audio("a.mp4", Mp2::new("256k", 2, 44100)).unwrap(),
            ],
            "b.mkv",
        )
        .unwrap();
        let args = args(&converter, None);
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert_eq!(
            args,
            expected(&[
                &["-y"],
                &PROBE,
                &["-i", "a.mp4"],
                &["-map", "0:v:0", "-c:v", "mpeg2video", "-b:v", "3000k", "-aspect", "16:9", "-r", "23.97"],
                &["-map", "0:a:0", "-c:a", "mp2", "-b:a", "256k", "-ac", "2", "-ar", "44100"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_scaled_video() {
        let video = VideoOutstream::new("a.mp4").unwrap().scale(None, Some(480));
        let converter = MediaConverter::new(
            vec![
                Track::video(video, Mpeg2::new("3000k", "16:9", "23.97")).unwrap(),
                Track::audio("a.mp4", Aac::new("256k", 2, 44100)).unwrap(),
            ],
            "b.mkv",
        )
        .unwrap();
        assert_eq!(
            args(&converter, None),
            expected(&[
                &["-y"],
                &PROBE,
                &["-i", "a.mp4"],
                &["-filter_complex", "[0:v:0]scale=-2:480[vout0]"],
                &["-map", "[vout0]", "-c:v", "mpeg2video", "-b:v", "3000k", "-aspect", "16:9", "-r", "23.97"],
                &["-map", "0:a:0", "-c:a", "aac", "-b:a", "256k", "-ac", "2", "-ar", "44100"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_h265_with_ac3() {
        let converter = MediaConverter::new(
            vec![
                Track::video("a.mkv", H265::new(18, "slow")).unwrap(),
                Track::audio("a.mkv", Ac3::new("448k", 6, 48000)).unwrap(),
            ],
            "b.mp4",
        )
        .unwrap();
        assert_eq!(
            args(&converter, None),
            expected(&[
                &["-y"],
                &PROBE,
                &["-i", "a.mkv"],
                &["-map", "0:v:0", "-c:v", "libx265", "-preset", "slow", "-x265-params", "crf=18"],
                &["-map", "0:a:0", "-c:a", "ac3", "-b:a", "448k", "-ac", "6", "-ar", "48000"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_silent_audio_for_ten_seconds() {
        let track = Track::audio(StreamInput::Synthetic, Aac::new("256k", 2, 48000)).unwrap();
        let converter = MediaConverter::new(vec![track], "b.m4a").unwrap();
        assert_eq!(
            args(&converter, Some(Duration::from_secs(10))),
            expected(&[
                &["-y"],
                &["-ar", "48000", "-ac", "1", "-f", "s16le", "-i", "/dev/zero"],
                &["-map", "0:a:0", "-c:a", "aac", "-b:a", "256k", "-ac", "2", "-ar", "48000"],
                &["-t", "10"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_blank_video_with_audio() {
        let converter = MediaConverter::new(
            vec![
                Track::video(StreamInput::Synthetic, H264::default()).unwrap(),
                Track::audio("a.mp3", Aac::default()).unwrap(),
            ],
            "b.mp4",
        )
        .unwrap();
        assert_eq!(
            args(&converter, None),
            expected(&[
                &["-y"],
                &["-s", "640x360", "-f", "rawvideo", "-pix_fmt", "rgb24", "-r", "30", "-i", "/dev/zero"],
                &PROBE,
                &["-i", "a.mp3"],
                &["-map", "0:v:0", "-c:v", "h264", "-crf", "23", "-pix_fmt", "yuv420p"],
                &["-profile:v", "high", "-level", "3.1"],
                &["-map", "1:a:0", "-c:a", "aac", "-b:a", "192k", "-ac", "2", "-ar", "44100"],
                &["-shortest"],
                &["tmp.mkv"],
            ])
        );
    }

    #[test]
    fn test_duration_and_shortest_order() {
        let converter = MediaConverter::new(
            vec![
                Track::video(StreamInput::Synthetic, H264::default()).unwrap(),
                Track::audio("a.mp3", Aac::default()).unwrap(),
            ],
            "b.mp4",
        )
        .unwrap();
        let args = args(&converter, Some(Duration::from_millis(2500)));
        assert_eq!(&args[args.len() - 4..], ["-t", "2.5", "-shortest", "tmp.mkv"]);
    }

    #[test]
    fn test_overlay_input_is_registered_but_not_mapped() {
        let video = VideoOutstream::new("a.mp4")
            .unwrap()
            .overlay("logo.png", 5, 5)
            .unwrap();
        let converter = MediaConverter::new(
            vec![
                Track::video(video, H264::default()).unwrap(),
                Track::audio("a.mp4", Codec::Copy).unwrap(),
            ],
            "b.mkv",
        )
        .unwrap();
        let args = args(&converter, None);

        let inputs: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(inputs, ["a.mp4", "logo.png"]);

        let maps: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-map")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(maps, ["[vout0]", "0:a:0"]);
        assert_eq!(args.iter().filter(|a| *a == "-filter_complex").count(), 1);
        assert!(args.contains(&"[0:v:0][1:v:0]overlay=5:5[vout0]".to_string()));
    }

    #[test]
    fn test_maps_follow_caller_order() {
        let converter = MediaConverter::new(
            vec![
                Track::audio(Instream::new("b.mkv", StreamKind::Audio, 1).unwrap(), Codec::Copy).unwrap(),
                Track::video("a.mp4", Codec::Copy).unwrap(),
                Track::subtitle(Instream::new("b.mkv", StreamKind::Subtitle, 2).unwrap(), Codec::Copy)
                    .unwrap(),
            ],
            "out.mkv",
        )
        .unwrap();
        let args = args(&converter, None);
        let maps: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-map")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(maps, ["0:a:1", "1:v:0", "0:s:2"]);
        assert!(!args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let video = VideoOutstream::new("a.mp4")
            .unwrap()
            .deinterlace_slow()
            .overlay("logo.png", 0, 0)
            .unwrap();
        let converter = MediaConverter::new(
            vec![
                Track::video(video, H264::default()).unwrap(),
                Track::audio(StreamInput::Synthetic, Aac::default()).unwrap(),
            ],
            "b.mp4",
        )
        .unwrap();
        assert_eq!(args(&converter, None), args(&converter, None));
    }

    #[test]
    fn test_outstream_uses_default_codec() {
        let subtitle = SubtitleOutstream::new("a.mkv").unwrap();
        let converter = MediaConverter::new(subtitle, "a.srt").unwrap();
        assert_eq!(converter.tracks().len(), 1);
        assert_eq!(converter.tracks()[0].codec(), &Codec::Copy);
        assert_eq!(converter.tracks()[0].kind(), StreamKind::Subtitle);
    }

    #[test]
    fn test_empty_track_list_rejected() {
        assert_matches!(
            MediaConverter::new(Vec::<Track>::new(), "b.mkv"),
            Err(Error::InvalidSource(_))
        );
    }

    #[test]
    fn test_configured_blank_video_raster() {
        let config = ConverterConfig {
            blank_video: BlankVideoConfig {
                width: 1280,
                height: 720,
                frame_rate: 25,
            },
            ..ConverterConfig::default()
        };
        let converter = MediaConverter::with_config(
            Track::video(StreamInput::Synthetic, H264::default()).unwrap(),
            "b.mp4",
            config,
        )
        .unwrap();
        let args = args(&converter, Some(Duration::from_secs(5)));
        assert_eq!(
            &args[..10],
            ["-y", "-s", "1280x720", "-f", "rawvideo", "-pix_fmt", "rgb24", "-r", "25", "-i"]
        );
    }

    #[test]
    fn test_explicit_blank_raster_is_kept() {
        let config = ConverterConfig {
            blank_video: BlankVideoConfig {
                width: 1280,
                height: 720,
                frame_rate: 25,
            },
            ..ConverterConfig::default()
        };
        let converter = MediaConverter::with_config(
            Track::video(Instream::blank_video_sized(320, 240, 15), H264::default()).unwrap(),
            "b.mp4",
            config,
        )
        .unwrap();
        assert!(args(&converter, None).contains(&"320x240".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_pass_through() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = PathBuf::from(OsStr::from_bytes(b"clip\xff.mp4"));
        let output = PathBuf::from(OsStr::from_bytes(b"out\xfe.m4a"));
        let converter = MediaConverter::new(
            Track::audio(input.clone(), Aac::default()).unwrap(),
            "b.m4a",
        )
        .unwrap();

        let args = converter.command_args(&output, None).unwrap();
        let position = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[position + 1], input.into_os_string());
        assert_eq!(args.last(), Some(&output.into_os_string()));
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = (0..20).map(|i| format!("line {i}\n")).collect::<String>();
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 19"));
    }
}
