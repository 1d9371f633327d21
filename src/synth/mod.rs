//! Timeline synthesis.
//!
//! [`SegmentSynthesizer`] produces the segments of a single phase;
//! [`ScenarioComposer`] stitches three phases into a [`crate::Timeline`].
//! Neither owns a random source: callers pass the RNG in explicitly, so a
//! fixed seed reproduces a run exactly.

mod composer;
mod segment;

pub use composer::ScenarioComposer;
pub use segment::SegmentSynthesizer;
