//! Core types used throughout tcscript.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::CongestionLevel;

/// Closed numeric interval `[min, max]`.
///
/// Serialized as a two-element array so config files can write
/// `bandwidth = [90, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `min <= max` and both ends finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<(f64, f64)> for ValueRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<ValueRange> for (f64, f64) {
    fn from(range: ValueRange) -> Self {
        (range.min, range.max)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Fixed-width time slice carrying one concrete condition triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start_ms: i64,
    pub duration_ms: i64,
    /// Mbps
    pub bandwidth: i64,
    /// One-way delay, ms
    pub delay: i64,
    /// Per-mille
    pub loss: i64,
    pub description: String,
}

impl Segment {
    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }
}

/// One of the three equal windows of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// 1-based.
    pub index: u8,
    pub level: CongestionLevel,
    pub start_ms: i64,
    pub duration_ms: i64,
}

impl Phase {
    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }

    /// Label used as the description prefix of every segment in this phase.
    pub fn label(&self) -> String {
        format!("阶段{}", self.index)
    }
}

/// Ordered segment sequence of one scenario.
///
/// Built once by the composer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    total_duration_ms: i64,
    phases: Vec<Phase>,
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new(total_duration_ms: i64, phases: Vec<Phase>, segments: Vec<Segment>) -> Self {
        Self {
            total_duration_ms,
            phases,
            segments,
        }
    }

    pub fn total_duration_ms(&self) -> i64 {
        self.total_duration_ms
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Duration of each phase (`total / 3`, remainder dropped).
    pub fn phase_duration_ms(&self) -> i64 {
        self.phases
            .first()
            .map_or(self.total_duration_ms / crate::PHASE_COUNT as i64, |p| {
                p.duration_ms
            })
    }

    /// Segments whose start lies inside the given 1-based phase.
    pub fn segments_in_phase(&self, index: u8) -> impl Iterator<Item = &Segment> {
        let window = self
            .phases
            .iter()
            .find(|p| p.index == index)
            .map(|p| (p.start_ms, p.end_ms()));

        self.segments.iter().filter(move |s| {
            window.is_some_and(|(start, end)| s.start_ms >= start && s.start_ms < end)
        })
    }

    /// Segment in force at `time_ms`, if any.
    ///
    /// Instants that fall in a dropped remainder (between the last segment of
    /// a phase and the start of the next phase) have no active segment.
    pub fn active_at(&self, time_ms: i64) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.start_ms <= time_ms);
        let candidate = self.segments.get(idx.checked_sub(1)?)?;
        (time_ms < candidate.end_ms()).then_some(candidate)
    }
}

/// One data line of a decoded script, shaped for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub start_ms: i64,
    pub duration_ms: i64,
    /// Segment midpoint in seconds.
    pub mid_time_s: f64,
    pub bandwidth: i64,
    pub delay: i64,
    pub loss: i64,
    pub description: String,
    /// 1, 2 or 3; see [`crate::codec::PhaseBuckets`].
    pub phase_bucket: u8,
}

/// Read access to the fields the statistics reporter aggregates.
pub trait SegmentMetrics {
    fn start_ms(&self) -> i64;
    fn bandwidth(&self) -> i64;
    fn delay(&self) -> i64;
    fn loss(&self) -> i64;
}

impl SegmentMetrics for Segment {
    fn start_ms(&self) -> i64 {
        self.start_ms
    }
    fn bandwidth(&self) -> i64 {
        self.bandwidth
    }
    fn delay(&self) -> i64 {
        self.delay
    }
    fn loss(&self) -> i64 {
        self.loss
    }
}

impl SegmentMetrics for ParsedRecord {
    fn start_ms(&self) -> i64 {
        self.start_ms
    }
    fn bandwidth(&self) -> i64 {
        self.bandwidth
    }
    fn delay(&self) -> i64 {
        self.delay
    }
    fn loss(&self) -> i64 {
        self.loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start_ms: i64, duration_ms: i64) -> Segment {
        Segment {
            start_ms,
            duration_ms,
            bandwidth: 95,
            delay: 150,
            loss: 5,
            description: "阶段1: 低拥塞-时间段1".into(),
        }
    }

    fn gapped_timeline() -> Timeline {
        // Phases of 25s with 10s segments: 5s uncovered at the end of each.
        let phases = vec![
            Phase { index: 1, level: CongestionLevel::Low, start_ms: 0, duration_ms: 25_000 },
            Phase { index: 2, level: CongestionLevel::High, start_ms: 25_000, duration_ms: 25_000 },
        ];
        let segments = vec![
            segment(0, 10_000),
            segment(10_000, 10_000),
            segment(25_000, 10_000),
            segment(35_000, 10_000),
        ];
        Timeline::new(50_000, phases, segments)
    }

    #[test]
    fn test_value_range() {
        let range = ValueRange::new(90.0, 100.0);
        assert!(range.is_valid());
        assert_eq!(range.clamp(120.0), 100.0);
        assert_eq!(range.clamp(10.0), 90.0);
        assert_eq!(range.clamp(95.5), 95.5);
        assert!(range.contains(90.0));
        assert!(!range.contains(100.1));

        assert!(!ValueRange::new(5.0, 1.0).is_valid());
        assert!(!ValueRange::new(f64::NAN, 1.0).is_valid());
    }

    #[test]
    fn test_active_at() {
        let timeline = gapped_timeline();

        assert_eq!(timeline.active_at(0).map(|s| s.start_ms), Some(0));
        assert_eq!(timeline.active_at(9_999).map(|s| s.start_ms), Some(0));
        assert_eq!(timeline.active_at(10_000).map(|s| s.start_ms), Some(10_000));
        // Remainder gap of phase 1
        assert!(timeline.active_at(22_000).is_none());
        assert_eq!(timeline.active_at(25_000).map(|s| s.start_ms), Some(25_000));
        assert!(timeline.active_at(49_000).is_none());
        assert!(timeline.active_at(-1).is_none());
    }

    #[test]
    fn test_segments_in_phase() {
        let timeline = gapped_timeline();
        assert_eq!(timeline.segments_in_phase(1).count(), 2);
        assert_eq!(timeline.segments_in_phase(2).count(), 2);
        assert_eq!(timeline.segments_in_phase(3).count(), 0);
        assert_eq!(timeline.phase_duration_ms(), 25_000);
    }

    #[test]
    fn test_phase_label() {
        let phase = Phase { index: 2, level: CongestionLevel::Medium, start_ms: 0, duration_ms: 1 };
        assert_eq!(phase.label(), "阶段2");
    }
}
