//! pf-core: Shared types, traits, and utilities for PedalForge
//!
//! This crate provides the foundational types used across all PedalForge crates:
//! the `Sample` type, audio buffers, the processor contract implemented by every
//! effect and filter stage, and the common error type.

mod error;
mod sample;

pub use error::*;
pub use sample::*;

/// Standard sample rate options
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum SampleRate {
    Hz44100 = 44100,
    Hz48000 = 48000,
    Hz88200 = 88200,
    Hz96000 = 96000,
    Hz176400 = 176400,
    Hz192000 = 192000,
}

impl SampleRate {
    #[inline]
    pub fn as_f64(self) -> f64 {
        self as u32 as f64
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::Hz44100
    }
}

/// Buffer size options
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum BufferSize {
    Samples32 = 32,
    Samples64 = 64,
    Samples128 = 128,
    Samples256 = 256,
    Samples512 = 512,
    Samples1024 = 1024,
}

impl BufferSize {
    #[inline]
    pub fn as_usize(self) -> usize {
        self as u32 as usize
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self::Samples64
    }
}

/// Trait for all DSP processors
///
/// `reset` receives the stream parameters and returns the processor latency in
/// samples; hosts use it for delay compensation. `clear_buffers` zeroes delay
/// memory without touching the configuration.
pub trait Processor: Send {
    /// Prepare for a new stream. Returns latency in samples.
    fn reset(&mut self, sample_rate: f64, max_block_len: usize) -> usize;

    /// Zero all internal delay memory.
    fn clear_buffers(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;

    /// Process a block of samples, `dst` and `src` of equal length
    fn process_block(&mut self, dst: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src.iter()) {
            *d = self.process_sample(*s);
        }
    }

    /// Process a block in place (the in-place form of the host contract)
    fn process_block_in_place(&mut self, buf: &mut [Sample]) {
        for sample in buf.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Stereo processor trait
pub trait StereoProcessor: Processor {
    /// Process a stereo sample pair
    fn process_sample(&mut self, left: Sample, right: Sample) -> (Sample, Sample);

    /// Process stereo blocks in place
    fn process_block_in_place(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample(*l, *r);
        }
    }
}

/// Convert decibels to linear gain
#[inline]
pub fn db_to_gain(db: f64) -> Sample {
    10.0_f64.powf(db / 20.0) as Sample
}

/// Convert linear gain to decibels
#[inline]
pub fn gain_to_db(gain: Sample) -> f64 {
    20.0 * (gain.max(1e-30) as f64).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate() {
        assert_eq!(SampleRate::Hz48000.as_u32(), 48000);
        assert_eq!(SampleRate::default(), SampleRate::Hz44100);
    }

    #[test]
    fn test_db_conversion() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-6.0) - 0.501_187).abs() < 1e-4);
        assert!((gain_to_db(1.0)).abs() < 1e-6);
    }
}
