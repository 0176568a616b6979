use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Custom enum for log levels that can be used with clap's ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convert our custom LogLevel enum to log crate's LevelFilter
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in scenes
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenePreset {
    /// Ground plane sphere plus matte, glass, and metal spheres
    Trio,
    /// Random field of small spheres around three large feature spheres
    Cover,
}

/// Command line arguments structure using clap derive macros
#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "A stochastic path tracer in Rust")]
pub struct Args {
    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Image height in pixels; width follows from the aspect ratio
    #[arg(long, default_value_t = 360, help = "Image height in pixels")]
    pub height: u32,

    /// Width to height ratio of the image
    #[arg(long, default_value_t = 16.0 / 9.0, help = "Width to height ratio")]
    pub aspect_ratio: f64,

    /// Number of samples per pixel
    #[arg(long, short = 's', default_value_t = 100, help = "Number of samples per pixel")]
    pub samples_per_pixel: u32,

    /// Maximum number of ray bounces
    #[arg(long, default_value_t = 50, help = "Maximum number of ray bounces")]
    pub max_depth: u32,

    /// Scene to render
    #[arg(long, value_enum, default_value_t = ScenePreset::Trio, help = "Scene to render")]
    pub scene: ScenePreset,

    /// Number of render worker threads (defaults to the host's CPU count)
    #[arg(long, help = "Number of render worker threads")]
    pub workers: Option<usize>,

    /// Seed for the random generator; renders repeat exactly for a fixed
    /// worker count
    #[arg(long, help = "Seed for the random generator")]
    pub seed: Option<u64>,

    /// Output file path (defaults to a timestamped PNG in the working directory)
    #[arg(short, long, help = "Output file path")]
    pub output: Option<String>,

    /// Disable the terminal progress bars
    #[arg(long, help = "Disable the terminal progress bars")]
    pub no_progress: bool,
}
