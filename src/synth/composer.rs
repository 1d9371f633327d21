//! Three-phase scenario composition.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::profile::{CongestionLevel, ProfileRegistry};
use crate::types::{Phase, Timeline};
use crate::{DEFAULT_TOTAL_DURATION_MS, PHASE_COUNT};

use super::SegmentSynthesizer;

/// Builds a [`Timeline`] from three congestion levels.
///
/// The total duration is split into three equal phases (`total / 3`, so up
/// to 2 ms at the end are never covered). Each phase is handed to the
/// [`SegmentSynthesizer`] and the results are concatenated in phase order.
#[derive(Debug, Clone)]
pub struct ScenarioComposer {
    registry: Arc<ProfileRegistry>,
    synthesizer: SegmentSynthesizer,
    total_duration_ms: i64,
}

impl ScenarioComposer {
    pub fn new(registry: Arc<ProfileRegistry>, total_duration_ms: i64) -> Self {
        Self {
            registry,
            synthesizer: SegmentSynthesizer::default(),
            total_duration_ms,
        }
    }

    /// Use a segment width other than the default 10 s.
    pub fn with_segment_duration(mut self, segment_duration_ms: i64) -> Self {
        self.synthesizer = SegmentSynthesizer::new(segment_duration_ms);
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn synthesizer(&self) -> &SegmentSynthesizer {
        &self.synthesizer
    }

    pub fn total_duration_ms(&self) -> i64 {
        self.total_duration_ms
    }

    pub fn phase_duration_ms(&self) -> i64 {
        self.total_duration_ms / PHASE_COUNT as i64
    }

    /// Compose a scenario from level identifiers such as `["low", "high", "low"]`.
    ///
    /// All levels are resolved before any random number is drawn, so a
    /// rejected request leaves `rng` untouched.
    pub fn compose<S, R>(&self, levels: &[S], rng: &mut R) -> Result<Timeline>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if levels.len() != PHASE_COUNT {
            return Err(Error::InvalidPhaseCount { got: levels.len() });
        }

        let mut resolved = [CongestionLevel::Normal; PHASE_COUNT];
        for (slot, id) in resolved.iter_mut().zip(levels) {
            *slot = self.registry.lookup(id.as_ref())?.level;
        }

        Ok(self.compose_levels(resolved, rng))
    }

    /// Compose a scenario from already-typed levels.
    pub fn compose_levels<R: Rng + ?Sized>(
        &self,
        levels: [CongestionLevel; PHASE_COUNT],
        rng: &mut R,
    ) -> Timeline {
        let phase_duration_ms = self.phase_duration_ms();
        let mut phases = Vec::with_capacity(PHASE_COUNT);
        let mut segments = Vec::new();

        for (i, level) in levels.into_iter().enumerate() {
            let phase = Phase {
                index: i as u8 + 1,
                level,
                start_ms: i as i64 * phase_duration_ms,
                duration_ms: phase_duration_ms,
            };

            segments.extend(self.synthesizer.synthesize_phase(
                self.registry.get(level),
                phase.start_ms,
                phase.duration_ms,
                &phase.label(),
                rng,
            ));
            phases.push(phase);
        }

        debug!(
            levels = ?levels,
            segments = segments.len(),
            total_duration_ms = self.total_duration_ms,
            "composed scenario"
        );

        Timeline::new(self.total_duration_ms, phases, segments)
    }
}

impl Default for ScenarioComposer {
    fn default() -> Self {
        Self::new(Arc::new(ProfileRegistry::standard()), DEFAULT_TOTAL_DURATION_MS)
    }
}
