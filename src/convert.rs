//! Turns `convert` arguments into tracks and runs them.

use crate::cli::{AudioCodecArg, ConvertArgs, VideoCodecArg};
use anyhow::{Context, Result};
use media_converter_av::codecs::{Aac, Ac3, Mp2, Mpeg2, H264, H265};
use media_converter_av::tools::get_tool_path;
use media_converter_av::{
    Codec, ConverterConfig, Instream, MediaConverter, StreamInput, Track, VideoOutstream,
};
use std::path::Path;

pub fn run_convert(args: &ConvertArgs, config: &ConverterConfig) -> Result<()> {
    let tracks = build_tracks(args, config)?;
    let converter = MediaConverter::with_config(tracks, &args.output, config.clone())?;

    if args.dry_run {
        let program = match get_tool_path("ffmpeg", Some(&config.ffmpeg)) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}, showing the configured path", e);
                config.ffmpeg.clone()
            }
        };
        let command = converter.command_args(&args.output, args.duration)?;
        let line = std::iter::once(program.into_os_string())
            .chain(command)
            .map(|a| shell_quote(&a.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", line);
        return Ok(());
    }

    let published = match args.duration {
        Some(duration) => converter.convert_for(duration),
        None => converter.convert(),
    }
    .with_context(|| format!("Conversion to {:?} failed", args.output))?;

    println!("Wrote {}", published.display());
    Ok(())
}

fn build_tracks(args: &ConvertArgs, config: &ConverterConfig) -> Result<Vec<Track>> {
    let needs_input = !args.blank_video || !(args.silent_audio || args.no_audio);
    let input = match (&args.input, needs_input) {
        (Some(path), _) => Some(path.as_path()),
        (None, false) => None,
        (None, true) => anyhow::bail!("An input file is required unless all streams are generated"),
    };
    if !needs_input && input.is_some() {
        tracing::warn!("Every stream is generated, the input file is not used");
    }

    let video_codec = video_codec(args, config);
    let mut tracks = vec![Track::video(video_outstream(args, config, input)?, video_codec)?];

    if !args.no_audio {
        let audio_codec = audio_codec(args, config);
        let audio = match (args.silent_audio, input) {
            (true, _) => StreamInput::Synthetic,
            (false, Some(path)) => StreamInput::from(path),
            (false, None) => anyhow::bail!("An input file is required for its audio"),
        };
        tracks.push(Track::audio(audio, audio_codec)?);
    }

    tracing::debug!("Built {} track(s)", tracks.len());
    Ok(tracks)
}

fn video_outstream(
    args: &ConvertArgs,
    config: &ConverterConfig,
    input: Option<&Path>,
) -> Result<VideoOutstream> {
    let source: StreamInput = match (args.blank_video, input) {
        (true, _) => config.blank_video().into(),
        (false, Some(path)) => Instream::video(path)?.into(),
        (false, None) => anyhow::bail!("An input file is required for its video"),
    };

    let mut video = VideoOutstream::new(source)?;
    if let Some(ref area) = args.crop {
        video = video.crop(area.clone());
    }
    if args.deinterlace {
        video = video.deinterlace();
    }
    if args.deinterlace_slow {
        video = video.deinterlace_slow();
    }
    if args.width.is_some() || args.height.is_some() {
        video = video.scale(args.width, args.height);
    }
    if let Some(ref overlay) = args.overlay {
        video = video.overlay(overlay.as_path(), args.overlay_x, args.overlay_y)?;
    }

    if video.is_filtered() && matches!(args.video_codec, Some(VideoCodecArg::Copy)) {
        anyhow::bail!("Video filters cannot be combined with --video-codec copy");
    }

    Ok(video)
}

fn video_codec(args: &ConvertArgs, config: &ConverterConfig) -> Codec {
    let mut codec = match args.video_codec {
        Some(VideoCodecArg::H264) => H264::default().into(),
        Some(VideoCodecArg::H265) => H265::default().into(),
        Some(VideoCodecArg::Mpeg2) => Mpeg2::default().into(),
        Some(VideoCodecArg::Copy) => Codec::Copy,
        None => config.video_codec.clone(),
    };

    match &mut codec {
        Codec::H264(c) => {
            if let Some(crf) = args.crf {
                c.crf = crf;
            }
            if args.preset.is_some() {
                c.preset = args.preset.clone();
            }
        }
        Codec::H265(c) => {
            if let Some(crf) = args.crf {
                c.crf = crf;
            }
            if let Some(ref preset) = args.preset {
                c.preset = preset.clone();
            }
        }
        _ if args.crf.is_some() || args.preset.is_some() => {
            tracing::warn!("--crf/--preset only apply to h264 and h265, ignoring");
        }
        _ => {}
    }

    codec
}

fn audio_codec(args: &ConvertArgs, config: &ConverterConfig) -> Codec {
    let mut codec = match args.audio_codec {
        Some(AudioCodecArg::Aac) => Aac::default().into(),
        Some(AudioCodecArg::Ac3) => Ac3::default().into(),
        Some(AudioCodecArg::Mp2) => Mp2::default().into(),
        Some(AudioCodecArg::Copy) => Codec::Copy,
        None => config.audio_codec.clone(),
    };

    if let Some(ref bitrate) = args.audio_bitrate {
        match &mut codec {
            Codec::Aac(c) => c.bitrate = bitrate.clone(),
            Codec::Ac3(c) => c.bitrate = bitrate.clone(),
            Codec::Mp2(c) => c.bitrate = bitrate.clone(),
            other => tracing::warn!("--audio-bitrate does not apply to {:?}, ignoring", other),
        }
    }

    codec
}

/// Quote `arg` for display in a POSIX shell.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
