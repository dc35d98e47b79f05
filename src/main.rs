use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod engine;
mod engines;
mod error;
mod loader;
mod plate;
mod preprocessing;
mod reader;
mod server;

#[derive(Parser, Debug)]
#[command(name = "plate-ocr-server")]
#[command(about = "License plate recognition server")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "PLATE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PLATE_PORT", default_value = "8000")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 10MB)
    #[arg(long, env = "PLATE_MAX_FILE_SIZE", default_value = "10485760")]
    pub max_file_size: usize,

    /// Upsampling factor applied before binarization
    #[arg(long, env = "PLATE_SCALE_FACTOR", default_value = "2.0")]
    pub scale_factor: f32,

    /// Grayscale level above which a pixel becomes white
    #[arg(long, env = "PLATE_THRESHOLD", default_value = "150")]
    pub threshold: u8,

    /// Directory for cached OCR models (defaults to the OS cache directory)
    #[arg(long, env = "PLATE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::try_from(args)?;

    tracing::info!("Starting plate-ocr-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config).await
}
