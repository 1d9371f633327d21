//! Preset scenarios and batch drivers.
//!
//! Batch generation and batch loading both keep going past a failing
//! scenario: the failure is logged and recorded, and the remaining
//! scenarios are still processed.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use crate::codec::{self, PhaseBuckets};
use crate::error::{Error, Result};
use crate::profile::CongestionLevel::{self, High, Low, Medium, Normal};
use crate::synth::ScenarioComposer;
use crate::types::{ParsedRecord, Timeline};

/// A named three-phase combination with its conventional file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetScenario {
    pub name: &'static str,
    pub phases: [CongestionLevel; 3],
    pub filename: &'static str,
}

/// The standard preset set.
pub const PRESETS: [PresetScenario; 8] = [
    PresetScenario {
        name: "低-中-低拥塞场景",
        phases: [Low, Medium, Low],
        filename: "scenario_low_medium_low.txt",
    },
    PresetScenario {
        name: "低-高-低拥塞场景",
        phases: [Low, High, Low],
        filename: "scenario_low_high_low.txt",
    },
    PresetScenario {
        name: "正常-高-正常场景",
        phases: [Normal, High, Normal],
        filename: "scenario_normal_high_normal.txt",
    },
    PresetScenario {
        name: "低-中-高拥塞场景",
        phases: [Low, Medium, High],
        filename: "scenario_low_medium_high.txt",
    },
    PresetScenario {
        name: "中-高-中拥塞场景",
        phases: [Medium, High, Medium],
        filename: "scenario_medium_high_medium.txt",
    },
    PresetScenario {
        name: "逐步恶化场景",
        phases: [Low, Medium, High],
        filename: "scenario_progressive_worse.txt",
    },
    PresetScenario {
        name: "逐步恢复场景",
        phases: [High, Medium, Low],
        filename: "scenario_progressive_recovery.txt",
    },
    PresetScenario {
        name: "波动网络场景",
        phases: [Low, High, Medium],
        filename: "scenario_fluctuating.txt",
    },
];

impl PresetScenario {
    /// Phase levels as identifiers, e.g. `low -> high -> low`.
    pub fn describe_phases(&self) -> String {
        self.phases
            .iter()
            .map(CongestionLevel::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// A scenario that was composed and written to disk.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub name: String,
    pub path: PathBuf,
    pub timeline: Timeline,
}

/// Outcome of a batch generation run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: Vec<GeneratedScript>,
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compose and write every preset into `out_dir`, in order, drawing from
/// one RNG so a seeded run reproduces every file.
pub fn generate_presets<R: Rng + ?Sized>(
    composer: &ScenarioComposer,
    presets: &[PresetScenario],
    out_dir: &Path,
    rng: &mut R,
) -> BatchReport {
    let mut report = BatchReport::default();

    for preset in presets {
        info!(scenario = preset.name, phases = %preset.describe_phases(), "generating preset");

        let timeline = composer.compose_levels(preset.phases, rng);
        let path = out_dir.join(preset.filename);
        match codec::write_script(&path, &timeline, preset.name) {
            Ok(()) => report.generated.push(GeneratedScript {
                name: preset.name.to_string(),
                path,
                timeline,
            }),
            Err(e) => {
                warn!(scenario = preset.name, error = %e, "failed to generate scenario");
                report.failed.push((preset.name.to_string(), e));
            }
        }
    }

    report
}

/// Compose a user-specified scenario and write it to `output`.
pub fn generate_custom<S, R>(
    composer: &ScenarioComposer,
    levels: &[S],
    output: &Path,
    name: &str,
    rng: &mut R,
) -> Result<GeneratedScript>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    // Compose fully before touching the filesystem so a rejected request
    // leaves no file behind.
    let timeline = composer.compose(levels, rng)?;
    codec::write_script(output, &timeline, name)?;
    Ok(GeneratedScript {
        name: name.to_string(),
        path: output.to_path_buf(),
        timeline,
    })
}

/// Result of loading one script in a batch.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Vec<ParsedRecord>),
    Missing,
    Failed(Error),
}

#[derive(Debug)]
pub struct LoadedScript {
    pub name: String,
    pub path: PathBuf,
    pub outcome: LoadOutcome,
}

impl LoadedScript {
    pub fn records(&self) -> Option<&[ParsedRecord]> {
        match self.outcome {
            LoadOutcome::Loaded(ref records) => Some(records.as_slice()),
            _ => None,
        }
    }
}

/// Decode each preset's script from `dir`. Missing and malformed files are
/// recorded, never fatal.
pub fn load_presets(presets: &[PresetScenario], dir: &Path, buckets: &PhaseBuckets) -> Vec<LoadedScript> {
    presets
        .iter()
        .map(|preset| load_named(preset.name, dir.join(preset.filename), buckets))
        .collect()
}

/// Load one script, classifying the outcome for batch reporting.
pub fn load_named(name: &str, path: PathBuf, buckets: &PhaseBuckets) -> LoadedScript {
    let outcome = match codec::try_read_script(&path, buckets) {
        Ok(Some(records)) => LoadOutcome::Loaded(records),
        Ok(None) => {
            warn!(scenario = name, path = %path.display(), "script not found");
            LoadOutcome::Missing
        }
        Err(e) => {
            warn!(scenario = name, path = %path.display(), error = %e, "failed to parse script");
            LoadOutcome::Failed(e)
        }
    };

    LoadedScript {
        name: name.to_string(),
        path,
        outcome,
    }
}
