use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use raspilive_ffmpeg::{Dash, Format, Hls, Launcher, Muxer, StreamFormat, SystemLauncher};
use raspilive_stream::{config::Config, logging::init_logging, serve, FileServer, Raspivid};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "raspilive")]
#[command(about = "Stream live video from a Raspberry Pi camera as HLS or MPEG-DASH", long_about = None)]
struct Cli {
    /// Configuration file (toml, yaml or json)
    #[arg(long, env = "RASPILIVE_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RASPILIVE_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, env = "RASPILIVE_LOG_FORMAT", global = true)]
    log_format: Option<String>,

    /// Output format; falls back to the `format` config key when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream and serve video as HLS
    Hls(StreamArgs),
    /// Stream and serve video as MPEG-DASH
    Dash(StreamArgs),
}

#[derive(Args, Debug)]
struct StreamArgs {
    /// Address the file server binds
    #[arg(long)]
    host: Option<String>,

    /// Port the file server listens on
    #[arg(long)]
    port: Option<u16>,

    /// Directory for manifest and segment files
    #[arg(long)]
    directory: Option<String>,

    /// Output frame rate (0 lets ffmpeg infer it)
    #[arg(long)]
    fps: Option<u32>,

    /// Segment container (hls: mpegts, fmp4; dash: mp4, webm)
    #[arg(long)]
    segment_type: Option<String>,

    /// Segment duration in seconds
    #[arg(long)]
    segment_time: Option<u32>,

    /// Maximum number of playlist entries
    #[arg(long)]
    playlist_size: Option<u32>,

    /// Maximum number of unreferenced segments kept on disk
    #[arg(long)]
    storage_size: Option<u32>,

    /// Camera frame width
    #[arg(long)]
    width: Option<u32>,

    /// Camera frame height
    #[arg(long)]
    height: Option<u32>,

    /// Camera frame rate
    #[arg(long)]
    camera_fps: Option<u32>,

    /// Flip the camera image horizontally (`--horizontal-flip=false` to turn off)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    horizontal_flip: Option<bool>,

    /// Flip the camera image vertically (`--vertical-flip=false` to turn off)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    vertical_flip: Option<bool>,
}

impl Cli {
    /// Apply the subcommand, if any, on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        match &self.command {
            Some(Command::Hls(args)) => {
                config.format = StreamFormat::Hls;
                args.apply(config);
            }
            Some(Command::Dash(args)) => {
                config.format = StreamFormat::Dash;
                args.apply(config);
            }
            None => {}
        }
    }
}

impl StreamArgs {
    /// Command line flags take precedence over file and environment.
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(directory) = &self.directory {
            config.server.directory = directory.clone();
        }

        let muxer = &mut config.muxer;
        muxer.fps = self.fps.or(muxer.fps);
        muxer.segment_type = self.segment_type.clone().or(muxer.segment_type.take());
        muxer.segment_time = self.segment_time.or(muxer.segment_time);
        muxer.playlist_size = self.playlist_size.or(muxer.playlist_size);
        muxer.storage_size = self.storage_size.or(muxer.storage_size);

        let camera = &mut config.camera;
        camera.width = self.width.unwrap_or(camera.width);
        camera.height = self.height.unwrap_or(camera.height);
        camera.fps = self.camera_fps.unwrap_or(camera.fps);
        camera.horizontal_flip = self.horizontal_flip.unwrap_or(camera.horizontal_flip);
        camera.vertical_flip = self.vertical_flip.unwrap_or(camera.vertical_flip);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    init_logging(&config.logging)?;

    info!("raspilive starting...");

    cli.apply(&mut config);
    let format = config.format;
    info!("Output format: {}", format);

    tokio::fs::create_dir_all(&config.server.directory)
        .await
        .with_context(|| format!("failed to create {}", config.server.directory))?;

    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher);

    let result = match format {
        StreamFormat::Hls => run(&config, Hls, launcher).await,
        StreamFormat::Dash => run(&config, Dash, launcher).await,
    };

    if let Err(e) = &result {
        error!("raspilive stopped: {:#}", e);
    }
    result
}

async fn run<F: Format>(config: &Config, format: F, launcher: Arc<dyn Launcher>) -> Result<()> {
    let mut camera = Raspivid::new(config.camera.clone(), launcher.clone())?;
    let mut muxer = Muxer::new(
        &config.server.directory,
        config.muxer.clone(),
        format,
        launcher,
    );
    let server = FileServer::new(&config.server.directory, config.server_address());

    info!(
        "Streaming {} from {} on http://{}",
        muxer.format().name(),
        config.server.directory,
        config.server_address()
    );

    tokio::select! {
        result = serve(server, &mut camera, &mut muxer) => {
            result?;
            info!("Session finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("raspilive shutting down");
    Ok(())
}
