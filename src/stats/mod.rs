//! Per-phase aggregate statistics.
//!
//! Two independent groupings exist and must not be mixed up:
//! [`summarize`] uses the generator's phase windows (`[i * d, (i + 1) * d)`),
//! while [`summarize_buckets`] groups decoded records by the reader's
//! `phase_bucket`.

use serde::Serialize;

use crate::types::{ParsedRecord, SegmentMetrics, Timeline};
use crate::PHASE_COUNT;

/// Averages over the records of one phase. Averages are `None` for an
/// empty phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseStats {
    pub phase: u8,
    pub count: usize,
    pub avg_bandwidth: Option<f64>,
    pub avg_delay: Option<f64>,
    pub avg_loss: Option<f64>,
}

impl PhaseStats {
    fn from_records<'a, T, I>(phase: u8, records: I) -> Self
    where
        T: SegmentMetrics + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut count = 0_usize;
        // Decoded values span all of i64, so sums are widened.
        let (mut bandwidth, mut delay, mut loss) = (0_i128, 0_i128, 0_i128);
        for rec in records {
            count += 1;
            bandwidth += i128::from(rec.bandwidth());
            delay += i128::from(rec.delay());
            loss += i128::from(rec.loss());
        }

        let avg = |sum: i128| (count > 0).then(|| sum as f64 / count as f64);
        Self {
            phase,
            count,
            avg_bandwidth: avg(bandwidth),
            avg_delay: avg(delay),
            avg_loss: avg(loss),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Group records into the generator's three phase windows of
/// `phase_duration_ms` each and average them.
pub fn summarize<T: SegmentMetrics>(records: &[T], phase_duration_ms: i64) -> Vec<PhaseStats> {
    (0..PHASE_COUNT as i64)
        .map(|i| {
            let start = i * phase_duration_ms;
            let end = (i + 1) * phase_duration_ms;
            PhaseStats::from_records(
                i as u8 + 1,
                records
                    .iter()
                    .filter(|r| r.start_ms() >= start && r.start_ms() < end),
            )
        })
        .collect()
}

/// [`summarize`] over a timeline's own phase layout.
pub fn summarize_timeline(timeline: &Timeline) -> Vec<PhaseStats> {
    summarize(timeline.segments(), timeline.phase_duration_ms())
}

/// Group decoded records by their `phase_bucket`.
pub fn summarize_buckets(records: &[ParsedRecord]) -> Vec<PhaseStats> {
    (1..=PHASE_COUNT as u8)
        .map(|bucket| {
            PhaseStats::from_records(bucket, records.iter().filter(|r| r.phase_bucket == bucket))
        })
        .collect()
}
