mod cli;
mod convert;

use media_converter::config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "media_converter=debug,media_converter_av=debug".to_string()
        } else {
            "media_converter=info,media_converter_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert(args) => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            convert::run_convert(&args, &config.converter_config())
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tool = media_converter_av::check_ffmpeg(Some(&config.tools.ffmpeg));

    let status = if tool.available { "✓" } else { "✗" };
    print!("{} {}", status, tool.name);

    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }

    if let Some(ref path) = tool.path {
        print!(" - {}", path.display());
    }

    println!();
    println!();
    if tool.available {
        println!("All required tools are available!");
    } else {
        println!(
            "ffmpeg is missing. Install it or set [tools] ffmpeg in the config (currently {:?}).",
            config.tools.ffmpeg
        );
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  ffmpeg: {}", config.tools.ffmpeg.display());
    println!("  Video codec: {:?}", config.codecs.video);
    println!("  Audio codec: {:?}", config.codecs.audio);
    println!("  Subtitle codec: {:?}", config.codecs.subtitle);
    println!(
        "  Blank video: {}x{} @ {} fps",
        config.blank_video.width, config.blank_video.height, config.blank_video.frame_rate
    );

    Ok(())
}
