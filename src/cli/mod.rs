//! Command-line interface for tcscript.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::codec::BucketMode;

/// tcscript - network condition script generator
#[derive(Parser, Debug)]
#[command(
    name = "tcscript",
    author,
    version,
    about = "Generate and inspect piecewise network-condition scripts for traffic shaping",
    long_about = r#"
tcscript synthesizes three-phase congestion timelines (bandwidth, delay,
loss) and writes them as line-oriented scripts for a traffic-shaping
simulator. It can also read scripts back for inspection or charting.

QUICK START:
  All presets:  tcscript generate preset --seed 42
  Custom:       tcscript generate custom --phases low high low -o custom.txt
  Inspect:      tcscript inspect scenario_low_high_low.txt
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate scenario scripts
    Generate(GenerateArgs),

    /// Decode script files and print an overview
    Inspect(InspectArgs),

    /// Decode the preset scripts and print per-phase averages
    Presets(PresetsArgs),

    /// Export a script as chart data
    Export(ExportArgs),

    /// List congestion levels
    Levels,

    /// Show example configuration
    Config(ConfigArgs),
}

/// Generation settings shared by preset and custom mode.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Random seed, applied once before any generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Total scenario duration in milliseconds
    #[arg(long)]
    pub total_duration_ms: Option<i64>,

    /// Segment width in milliseconds
    #[arg(long)]
    pub segment_duration_ms: Option<i64>,

    /// Skip the per-phase statistics
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub mode: GenerateMode,
}

/// Generation mode
#[derive(Subcommand, Debug)]
pub enum GenerateMode {
    /// Write all eight preset scenarios
    Preset {
        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        options: GenerationOptions,
    },

    /// Write one scenario from three congestion levels
    Custom {
        /// Congestion level of each phase: low, medium, high, normal
        #[arg(short, long, num_args = 1.., required = true)]
        phases: Vec<String>,

        /// Output file
        #[arg(short, long, default_value = "custom_scenario.txt")]
        output: PathBuf,

        /// Scenario name written to the header
        #[arg(short, long, default_value = "自定义场景")]
        name: String,

        #[command(flatten)]
        options: GenerationOptions,
    },
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Script files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub decode: DecodeOptions,
}

#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Directory holding the preset scripts (defaults to the configured one)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    #[command(flatten)]
    pub decode: DecodeOptions,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Script file
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: ExportFormat,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub decode: DecodeOptions,
}

/// How decoded records are bucketed into phases.
#[derive(Args, Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Phase bucketing (defaults to the configured mode)
    #[arg(long)]
    pub bucket_mode: Option<BucketModeArg>,

    /// Total duration the scaled buckets are derived from
    #[arg(long)]
    pub total_duration_ms: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output file (prints to stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

/// Chart export format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Phase bucketing mode
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketModeArg {
    /// Absolute 400 s / 800 s thresholds
    Fixed,
    /// Thresholds at thirds of the total duration
    Scaled,
}

impl From<BucketModeArg> for BucketMode {
    fn from(arg: BucketModeArg) -> Self {
        match arg {
            BucketModeArg::Fixed => BucketMode::Fixed,
            BucketModeArg::Scaled => BucketMode::Scaled,
        }
    }
}
