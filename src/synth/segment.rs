//! Per-phase segment generation.
//!
//! A phase gets one base value per metric, drawn uniformly from the level's
//! envelope. Every segment then perturbs that base by up to
//! `base * fluctuation` in either direction, clamps the result back into the
//! envelope and truncates it to an integer.

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

use crate::profile::CongestionProfile;
use crate::types::{Segment, ValueRange};
use crate::DEFAULT_SEGMENT_DURATION_MS;

/// Splits a phase into fixed-width segments with bounded random values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSynthesizer {
    segment_duration_ms: i64,
}

impl SegmentSynthesizer {
    pub fn new(segment_duration_ms: i64) -> Self {
        Self {
            segment_duration_ms,
        }
    }

    pub fn segment_duration_ms(&self) -> i64 {
        self.segment_duration_ms
    }

    /// Number of whole segments that fit in a phase. A trailing partial
    /// segment is not emitted.
    pub fn segment_count(&self, phase_duration_ms: i64) -> i64 {
        phase_duration_ms
            .checked_div(self.segment_duration_ms)
            .unwrap_or(0)
            .max(0)
    }

    /// Generate the segments of one phase in ascending start order.
    pub fn synthesize_phase<R: Rng + ?Sized>(
        &self,
        profile: &CongestionProfile,
        phase_start_ms: i64,
        phase_duration_ms: i64,
        phase_label: &str,
        rng: &mut R,
    ) -> Vec<Segment> {
        let base_bandwidth = draw(&profile.bandwidth_range, rng);
        let base_delay = draw(&profile.delay_range, rng);
        let base_loss = draw(&profile.loss_range, rng);

        let num_segments = self.segment_count(phase_duration_ms);
        debug!(
            congestion = %profile.level,
            phase = phase_label,
            phase_start_ms,
            num_segments,
            base_bandwidth,
            base_delay,
            base_loss,
            "synthesizing phase"
        );

        (0..num_segments)
            .map(|i| Segment {
                start_ms: phase_start_ms + i * self.segment_duration_ms,
                duration_ms: self.segment_duration_ms,
                bandwidth: perturb(base_bandwidth, &profile.bandwidth_range, profile.fluctuation, rng),
                delay: perturb(base_delay, &profile.delay_range, profile.fluctuation, rng),
                loss: perturb(base_loss, &profile.loss_range, profile.fluctuation, rng),
                description: format!("{phase_label}: {}-时间段{}", profile.name, i + 1),
            })
            .collect()
    }
}

impl Default for SegmentSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_DURATION_MS)
    }
}

/// Uniform draw from a closed range.
fn draw<R: Rng + ?Sized>(range: &ValueRange, rng: &mut R) -> f64 {
    Uniform::new_inclusive(range.min, range.max).sample(rng)
}

/// Perturb `base` by up to `base * fluctuation`, clamp into `range` and
/// truncate toward zero.
fn perturb<R: Rng + ?Sized>(base: f64, range: &ValueRange, fluctuation: f64, rng: &mut R) -> i64 {
    let amount = (base * fluctuation).abs();
    let raw = base + Uniform::new_inclusive(-amount, amount).sample(rng);
    range.clamp(raw) as i64
}
