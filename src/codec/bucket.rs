//! Phase bucketing of decoded records.
//!
//! Scripts do not record their phase layout, so the reader classifies each
//! record by its start time. The historical behaviour uses fixed 400 s /
//! 800 s thresholds, which only line up with the phases of a 1200 s
//! scenario; [`BucketMode::Scaled`] derives the thresholds from the actual
//! total duration instead.

use serde::{Deserialize, Serialize};

use crate::PHASE_COUNT;

/// How record start times map to phase buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    /// Absolute 400 s / 800 s thresholds.
    #[default]
    Fixed,
    /// Thresholds at one and two thirds of the total duration.
    Scaled,
}

/// Start-time thresholds, in seconds, separating buckets 1/2 and 2/3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBuckets {
    pub first_boundary_s: f64,
    pub second_boundary_s: f64,
}

impl PhaseBuckets {
    pub const FIXED_FIRST_S: f64 = 400.0;
    pub const FIXED_SECOND_S: f64 = 800.0;

    pub fn fixed() -> Self {
        Self {
            first_boundary_s: Self::FIXED_FIRST_S,
            second_boundary_s: Self::FIXED_SECOND_S,
        }
    }

    /// Boundaries matching the composer's phases for `total_duration_ms`.
    pub fn scaled(total_duration_ms: i64) -> Self {
        let phase_s = (total_duration_ms / PHASE_COUNT as i64) as f64 / 1000.0;
        Self {
            first_boundary_s: phase_s,
            second_boundary_s: 2.0 * phase_s,
        }
    }

    pub fn for_mode(mode: BucketMode, total_duration_ms: i64) -> Self {
        match mode {
            BucketMode::Fixed => Self::fixed(),
            BucketMode::Scaled => Self::scaled(total_duration_ms),
        }
    }

    /// Bucket (1, 2 or 3) of a record starting at `start_ms`.
    pub fn classify(&self, start_ms: i64) -> u8 {
        let start_s = start_ms as f64 / 1000.0;
        if start_s < self.first_boundary_s {
            1
        } else if start_s < self.second_boundary_s {
            2
        } else {
            3
        }
    }
}

impl Default for PhaseBuckets {
    fn default() -> Self {
        Self::fixed()
    }
}
