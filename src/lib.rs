//! # tcscript
//!
//! Synthesizes piecewise, randomly perturbed network-condition timelines
//! (bandwidth, one-way delay, packet loss) and reads/writes them in the
//! line-oriented script format consumed by a traffic-shaping simulator.
//!
//! ## Pipeline
//!
//! ┌──────────────────┐   ┌────────────────────┐   ┌──────────────────┐
//! │ ProfileRegistry  │ → │ SegmentSynthesizer │ → │ ScenarioComposer │
//! │ (level envelope) │   │ (one phase)        │   │ (three phases)   │
//! └──────────────────┘   └────────────────────┘   └────────┬─────────┘
//!                                                          │ Timeline
//!                          ┌──────────────┐       ┌────────▼─────────┐
//!   ParsedRecord ← decode ─┤ script file  │ ←──── │ codec::encode    │
//!                          └──────────────┘       └──────────────────┘
//!
//! A scenario is three equal phases, each tied to a congestion level. Every
//! phase draws one base value per metric from the level's envelope and then
//! emits fixed-width segments whose values wander around that base but never
//! leave the envelope.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow stylistic lints that don't affect correctness
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]              // ASCII diagrams in docs
#![allow(clippy::unreadable_literal)]
#![allow(clippy::cast_possible_truncation)]  // Values are clamped before truncation
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]       // Acceptable for averages
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::use_self)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::return_self_not_must_use)]

pub mod codec;
pub mod config;
pub mod error;
pub mod presets;
pub mod profile;
pub mod report;
pub mod stats;
pub mod synth;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Phases per scenario.
pub const PHASE_COUNT: usize = 3;

/// Default scenario length (1200 s).
pub const DEFAULT_TOTAL_DURATION_MS: i64 = 1_200_000;

/// Default segment width (10 s).
pub const DEFAULT_SEGMENT_DURATION_MS: i64 = 10_000;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::{decode, encode, read_script, try_read_script, write_script, PhaseBuckets};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::profile::{CongestionLevel, CongestionProfile, ProfileRegistry};
    pub use crate::stats::{summarize, PhaseStats};
    pub use crate::synth::{ScenarioComposer, SegmentSynthesizer};
    pub use crate::types::*;
}
