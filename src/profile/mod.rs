//! Congestion level registry.
//!
//! Maps each congestion level to its value envelope and fluctuation
//! coefficient. The registry is built once (optionally with config
//! overrides) and shared read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ValueRange;

/// Named congestion bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
    Normal,
}

impl CongestionLevel {
    pub const ALL: [CongestionLevel; 4] = [
        CongestionLevel::Low,
        CongestionLevel::Medium,
        CongestionLevel::High,
        CongestionLevel::Normal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "low",
            CongestionLevel::Medium => "medium",
            CongestionLevel::High => "high",
            CongestionLevel::Normal => "normal",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CongestionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(CongestionLevel::Low),
            "medium" => Ok(CongestionLevel::Medium),
            "high" => Ok(CongestionLevel::High),
            "normal" => Ok(CongestionLevel::Normal),
            _ => Err(Error::UnknownLevel(s.to_string())),
        }
    }
}

/// Largest envelope bound, 2^53: every integer up to it is exact in `f64`.
pub const MAX_BOUND: f64 = 9_007_199_254_740_992.0;

/// Numeric envelope of a congestion level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionProfile {
    pub level: CongestionLevel,
    /// Display name used in segment descriptions.
    pub name: String,
    /// Mbps
    pub bandwidth_range: ValueRange,
    /// ms
    pub delay_range: ValueRange,
    /// Per-mille
    pub loss_range: ValueRange,
    /// Perturbation half-width as a fraction of the phase base value.
    pub fluctuation: f64,
}

impl CongestionProfile {
    /// Built-in envelope for a level.
    pub fn builtin(level: CongestionLevel) -> Self {
        let (name, bandwidth, delay, loss, fluctuation) = match level {
            CongestionLevel::Low => ("低拥塞", (90.0, 100.0), (100.0, 200.0), (1.0, 10.0), 0.1),
            CongestionLevel::Medium => ("中拥塞", (80.0, 90.0), (200.0, 400.0), (10.0, 50.0), 0.15),
            CongestionLevel::High => ("高拥塞", (70.0, 80.0), (400.0, 600.0), (50.0, 200.0), 0.2),
            CongestionLevel::Normal => ("正常网络", (100.0, 120.0), (50.0, 100.0), (0.0, 1.0), 0.05),
        };

        Self {
            level,
            name: name.to_string(),
            bandwidth_range: bandwidth.into(),
            delay_range: delay.into(),
            loss_range: loss.into(),
            fluctuation,
        }
    }

    /// Check the envelope invariants: every range has `min <= max` with
    /// whole, non-negative bounds no larger than [`MAX_BOUND`], and
    /// `fluctuation` lies in `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (metric, range) in [
            ("bandwidth", &self.bandwidth_range),
            ("delay", &self.delay_range),
            ("loss", &self.loss_range),
        ] {
            if !range.is_valid() {
                return Err(Error::InvalidProfile(format!(
                    "{}: {metric} range {range} must satisfy min <= max",
                    self.level
                )));
            }

            // Emitted values are truncated to integers, which only stays
            // inside the range when both ends are whole and non-negative.
            for bound in [range.min, range.max] {
                if bound < 0.0 || bound > MAX_BOUND || bound.fract() > 0.0 {
                    return Err(Error::InvalidProfile(format!(
                        "{}: {metric} range {range} needs whole bounds in 0..={MAX_BOUND}",
                        self.level
                    )));
                }
            }
        }

        if !(self.fluctuation > 0.0 && self.fluctuation <= 1.0) {
            return Err(Error::InvalidProfile(format!(
                "{}: fluctuation {} must be in (0, 1]",
                self.level, self.fluctuation
            )));
        }

        // The name ends up in a single script line.
        if self.name.trim().is_empty() || self.name.contains(['\n', '\r']) {
            return Err(Error::InvalidProfile(format!(
                "{}: display name must be a non-empty single line",
                self.level
            )));
        }

        Ok(())
    }
}

/// Partial override of a built-in profile, as read from config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<ValueRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluctuation: Option<f64>,
}

impl ProfileOverride {
    fn apply(&self, profile: &mut CongestionProfile) {
        if let Some(ref name) = self.name {
            profile.name.clone_from(name);
        }
        if let Some(range) = self.bandwidth {
            profile.bandwidth_range = range;
        }
        if let Some(range) = self.delay {
            profile.delay_range = range;
        }
        if let Some(range) = self.loss {
            profile.loss_range = range;
        }
        if let Some(fluctuation) = self.fluctuation {
            profile.fluctuation = fluctuation;
        }
    }
}

/// Immutable level -> profile table.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<CongestionLevel, CongestionProfile>,
}

impl ProfileRegistry {
    /// Registry with the built-in envelopes.
    pub fn standard() -> Self {
        let profiles = CongestionLevel::ALL
            .into_iter()
            .map(|level| (level, CongestionProfile::builtin(level)))
            .collect();
        Self { profiles }
    }

    /// Built-in envelopes with config overrides applied and validated.
    ///
    /// Override keys are level identifiers; an unknown key is an error.
    pub fn with_overrides(overrides: &BTreeMap<String, ProfileOverride>) -> Result<Self> {
        let mut registry = Self::standard();
        for (level_id, patch) in overrides {
            let level: CongestionLevel = level_id.parse()?;
            if let Some(profile) = registry.profiles.get_mut(&level) {
                patch.apply(profile);
                profile.validate()?;
            }
        }
        Ok(registry)
    }

    /// Resolve a level identifier such as `"low"`.
    pub fn lookup(&self, level_id: &str) -> Result<&CongestionProfile> {
        let level: CongestionLevel = level_id.parse()?;
        Ok(self.get(level))
    }

    pub fn get(&self, level: CongestionLevel) -> &CongestionProfile {
        // Every level is inserted at construction.
        &self.profiles[&level]
    }

    /// Profiles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CongestionProfile> {
        CongestionLevel::ALL.iter().map(|level| self.get(*level))
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        let registry = ProfileRegistry::standard();
        for profile in registry.iter() {
            profile.validate().unwrap();
        }
        assert_eq!(registry.iter().count(), 4);
    }

    #[test]
    fn test_lookup() {
        let registry = ProfileRegistry::standard();

        let low = registry.lookup("low").unwrap();
        assert_eq!(low.bandwidth_range, ValueRange::new(90.0, 100.0));
        assert_eq!(low.name, "低拥塞");

        let high = registry.lookup(" HIGH ").unwrap();
        assert_eq!(high.level, CongestionLevel::High);
        assert_eq!(high.loss_range, ValueRange::new(50.0, 200.0));

        match registry.lookup("extreme") {
            Err(Error::UnknownLevel(id)) => assert_eq!(id, "extreme"),
            other => panic!("expected UnknownLevel, got {other:?}"),
        }
    }

    #[test]
    fn test_level_display_roundtrip() {
        for level in CongestionLevel::ALL {
            assert_eq!(level.to_string().parse::<CongestionLevel>().unwrap(), level);
        }
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "normal".to_string(),
            ProfileOverride {
                bandwidth: Some(ValueRange::new(200.0, 250.0)),
                fluctuation: Some(0.5),
                ..Default::default()
            },
        );

        let registry = ProfileRegistry::with_overrides(&overrides).unwrap();
        let normal = registry.get(CongestionLevel::Normal);
        assert_eq!(normal.bandwidth_range, ValueRange::new(200.0, 250.0));
        assert_eq!(normal.fluctuation, 0.5);
        // Untouched fields keep built-in values
        assert_eq!(normal.delay_range, ValueRange::new(50.0, 100.0));
        assert_eq!(registry.get(CongestionLevel::Low), &CongestionProfile::builtin(CongestionLevel::Low));
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "low".to_string(),
            ProfileOverride {
                delay: Some(ValueRange::new(300.0, 100.0)),
                ..Default::default()
            },
        );
        assert!(matches!(
            ProfileRegistry::with_overrides(&overrides),
            Err(Error::InvalidProfile(_))
        ));

        let mut overrides = BTreeMap::new();
        overrides.insert(
            "high".to_string(),
            ProfileOverride {
                fluctuation: Some(0.0),
                ..Default::default()
            },
        );
        assert!(matches!(
            ProfileRegistry::with_overrides(&overrides),
            Err(Error::InvalidProfile(_))
        ));

        let mut overrides = BTreeMap::new();
        overrides.insert("extreme".to_string(), ProfileOverride::default());
        assert!(matches!(
            ProfileRegistry::with_overrides(&overrides),
            Err(Error::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_override_bounds_must_be_whole_and_non_negative() {
        let rejected = [
            ("loss", ValueRange::new(0.5, 2.5)),
            ("delay", ValueRange::new(100.0, 200.5)),
            ("bandwidth", ValueRange::new(-1.0, 10.0)),
            ("bandwidth", ValueRange::new(-1e308, 1e308)),
            ("delay", ValueRange::new(0.0, 1e300)),
        ];
        for (metric, range) in rejected {
            let entry = match metric {
                "loss" => ProfileOverride { loss: Some(range), ..Default::default() },
                "delay" => ProfileOverride { delay: Some(range), ..Default::default() },
                _ => ProfileOverride { bandwidth: Some(range), ..Default::default() },
            };
            let overrides = BTreeMap::from([("low".to_string(), entry)]);
            assert!(
                matches!(ProfileRegistry::with_overrides(&overrides), Err(Error::InvalidProfile(_))),
                "{metric} {range} accepted"
            );
        }

        let overrides = BTreeMap::from([(
            "low".to_string(),
            ProfileOverride {
                loss: Some(ValueRange::new(0.0, MAX_BOUND)),
                ..Default::default()
            },
        )]);
        assert!(ProfileRegistry::with_overrides(&overrides).is_ok());
    }
}
