use crate::error::PlateError;
use crate::preprocessing::PipelineOptions;
use crate::Args;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub preprocessing: PipelineOptions,
    pub model_dir: PathBuf,
}

impl Config {
    /// Default model cache location: `<os cache dir>/plate-ocr-server`
    pub fn default_model_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("plate-ocr-server")
    }
}

impl TryFrom<Args> for Config {
    type Error = PlateError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if !args.scale_factor.is_finite() || args.scale_factor <= 0.0 {
            return Err(PlateError::Initialization(format!(
                "scale factor must be a positive number, got {}",
                args.scale_factor
            )));
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            preprocessing: PipelineOptions {
                scale_factor: args.scale_factor,
                threshold: args.threshold,
            },
            model_dir: args.model_dir.unwrap_or_else(Self::default_model_dir),
        })
    }
}
