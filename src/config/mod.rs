//! Configuration management for tcscript.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::{BucketMode, PhaseBuckets};
use crate::error::{Error, Result};
use crate::profile::{ProfileOverride, ProfileRegistry};
use crate::synth::ScenarioComposer;
use crate::types::ValueRange;
use crate::{DEFAULT_SEGMENT_DURATION_MS, DEFAULT_TOTAL_DURATION_MS, PHASE_COUNT};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Timeline generation settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Script reader settings.
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-level envelope overrides, keyed by level id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, ProfileOverride>,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;

        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.generator.segment_duration_ms <= 0 {
            return Err(Error::InvalidConfig(
                "segment_duration_ms must be positive".into(),
            ));
        }

        if self.generator.total_duration_ms < PHASE_COUNT as i64 {
            return Err(Error::InvalidConfig(format!(
                "total_duration_ms must be at least {PHASE_COUNT}"
            )));
        }

        // Building the registry checks every override.
        self.registry()?;
        Ok(())
    }

    /// Get default config path.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tcscript", "tcscript").map_or_else(
            || PathBuf::from("tcscript.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }

    /// Profile registry with this config's overrides applied.
    pub fn registry(&self) -> Result<ProfileRegistry> {
        ProfileRegistry::with_overrides(&self.profiles)
    }

    /// Composer for the configured durations and profiles.
    pub fn composer(&self) -> Result<ScenarioComposer> {
        Ok(
            ScenarioComposer::new(Arc::new(self.registry()?), self.generator.total_duration_ms)
                .with_segment_duration(self.generator.segment_duration_ms),
        )
    }

    /// Phase buckets for the configured decoder mode.
    pub fn buckets(&self) -> PhaseBuckets {
        PhaseBuckets::for_mode(self.decoder.bucket_mode, self.generator.total_duration_ms)
    }

    /// Phase buckets with command-line overrides of the mode and the total
    /// duration the scaled thresholds are derived from.
    pub fn buckets_with(&self, mode: Option<BucketMode>, total_duration_ms: Option<i64>) -> Result<PhaseBuckets> {
        let total = total_duration_ms.unwrap_or(self.generator.total_duration_ms);
        if total < PHASE_COUNT as i64 {
            return Err(Error::InvalidConfig(format!(
                "total_duration_ms must be at least {PHASE_COUNT}, got {total}"
            )));
        }
        Ok(PhaseBuckets::for_mode(mode.unwrap_or(self.decoder.bucket_mode), total))
    }

    /// Create example configuration.
    pub fn example() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "normal".to_string(),
            ProfileOverride {
                bandwidth: Some(ValueRange::new(100.0, 120.0)),
                fluctuation: Some(0.05),
                ..Default::default()
            },
        );

        Self {
            generator: GeneratorConfig {
                seed: Some(42),
                output_dir: PathBuf::from("scenarios"),
                ..Default::default()
            },
            profiles,
            ..Default::default()
        }
    }
}

/// Timeline generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Scenario length.
    #[serde(default = "default_total_duration")]
    pub total_duration_ms: i64,

    /// Width of each segment.
    #[serde(default = "default_segment_duration")]
    pub segment_duration_ms: i64,

    /// Seed applied once before any generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Directory preset scripts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_total_duration() -> i64 {
    DEFAULT_TOTAL_DURATION_MS
}
fn default_segment_duration() -> i64 {
    DEFAULT_SEGMENT_DURATION_MS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            total_duration_ms: default_total_duration(),
            segment_duration_ms: default_segment_duration(),
            seed: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Script reader settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Phase bucketing of decoded records.
    #[serde(default)]
    pub bucket_mode: BucketMode,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text or json).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable colored output.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_color() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            color: default_color(),
        }
    }
}

/// Initialize logging.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    } else {
        subscriber
            .with(fmt::layer().with_ansi(config.color).with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to init logging: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generator.total_duration_ms, 1_200_000);
        assert_eq!(config.generator.segment_duration_ms, 10_000);
        assert_eq!(config.generator.seed, None);
        assert_eq!(config.decoder.bucket_mode, BucketMode::Fixed);
        assert_eq!(config.buckets(), PhaseBuckets::fixed());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml(
            r#"
            [generator]
            total_duration_ms = 600000
            seed = 7

            [decoder]
            bucket_mode = "scaled"

            [profiles.high]
            loss = [100, 150]
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.generator.total_duration_ms, 600_000);
        assert_eq!(config.generator.segment_duration_ms, 10_000);
        assert_eq!(config.generator.seed, Some(7));
        assert_eq!(config.buckets(), PhaseBuckets::scaled(600_000));

        let registry = config.registry().unwrap();
        let high = registry.lookup("high").unwrap();
        assert_eq!(high.loss_range, ValueRange::new(100.0, 150.0));

        let composer = config.composer().unwrap();
        assert_eq!(composer.phase_duration_ms(), 200_000);
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.generator.segment_duration_ms = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = Config::default();
        config.generator.total_duration_ms = 2;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = Config::from_toml("[profiles.low]\nfluctuation = 1.5\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidProfile(_))));

        let config = Config::from_toml("[profiles.severe]\nfluctuation = 0.5\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::UnknownLevel(_))));

        assert!(matches!(
            Config::from_toml("[generator]\ntotal_duration_ms = \"long\"\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_example_roundtrip() {
        let example = Config::example();
        let text = example.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        parsed.validate().unwrap();

        assert_eq!(parsed.generator.seed, Some(42));
        assert_eq!(parsed.generator.output_dir, PathBuf::from("scenarios"));
        assert_eq!(parsed.profiles, example.profiles);
    }

    #[test]
    fn test_bucket_overrides() {
        let config = Config::default();
        assert_eq!(config.buckets_with(None, None).unwrap(), PhaseBuckets::fixed());
        assert_eq!(
            config.buckets_with(Some(BucketMode::Scaled), Some(600_000)).unwrap(),
            PhaseBuckets::scaled(600_000)
        );

        for total in [0, -600_000, 2] {
            assert!(
                matches!(config.buckets_with(Some(BucketMode::Scaled), Some(total)), Err(Error::InvalidConfig(_))),
                "{total} accepted"
            );
        }
    }
}
