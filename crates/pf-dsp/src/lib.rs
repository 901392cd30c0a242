//! pf-dsp: Filter engine for PedalForge
//!
//! - `biquad`: RBJ scalar designs and the direct form I reference filter
//! - `pack`: 4-lane biquad pack with parallel / serial / 2x2 wirings
//! - `onepole`: 4-lane first-order pack, same wirings
//! - `morph`: ramped coefficient updates for the pack
//! - `bank`: Linkwitz-Riley crossover splitter, band gate, noise gate
//! - `splitter`: fixed 8-band SIMD splitter
//! - `envelope`: peak/RMS followers
//! - `denorm`: denormal dither for targets without flush-to-zero
//!
//! Everything processes `pf_core::Sample` (f32) and is deterministic per
//! backend; pack arithmetic is bit-identical across SSE2, NEON and the
//! portable fallback.

pub mod bank;
pub mod biquad;
pub mod denorm;
pub mod envelope;
pub mod morph;
pub mod onepole;
pub mod pack;
pub mod splitter;

pub use bank::{BandGate, CrossoverSplitter, NoiseGate, scale_ramp};
pub use biquad::{Biquad, BiquadCoefs};
pub use denorm::DenormStop;
pub use envelope::{PeakFollower, RmsFollower};
pub use morph::Biquad4Morph;
pub use onepole::{OnePole4, OnePoleCoefs};
pub use pack::Biquad4;
pub use splitter::{SPLITTER_BANDS, SplitterSimd};
