//! Envelope followers
//!
//! One-pole peak and RMS followers in the attack/release coefficient form:
//! `coef = exp(-1 / (ms * 0.001 * sample_rate))`. Block APIs write the
//! envelope alongside the signal so gates and meters can consume it.

use pf_core::Sample;

#[inline]
fn time_coef(ms: f64, sample_rate: f64) -> Sample {
    if ms <= 0.0 {
        return 0.0;
    }
    (-1.0 / (ms * 0.001 * sample_rate)).exp() as Sample
}

/// Peak follower with separate attack and release times
#[derive(Debug, Clone)]
pub struct PeakFollower {
    attack_coef: Sample,
    release_coef: Sample,
    env: Sample,
}

impl PeakFollower {
    pub fn new(attack_ms: f64, release_ms: f64, sample_rate: f64) -> Self {
        Self {
            attack_coef: time_coef(attack_ms, sample_rate),
            release_coef: time_coef(release_ms, sample_rate),
            env: 0.0,
        }
    }

    pub fn set_times(&mut self, attack_ms: f64, release_ms: f64, sample_rate: f64) {
        self.attack_coef = time_coef(attack_ms, sample_rate);
        self.release_coef = time_coef(release_ms, sample_rate);
    }

    pub fn reset(&mut self) {
        self.env = 0.0;
    }

    #[inline]
    pub fn env(&self) -> Sample {
        self.env
    }

    #[inline(always)]
    pub fn process_sample(&mut self, x: Sample) -> Sample {
        let rect = x.abs();
        let coef = if rect > self.env {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.env = rect + coef * (self.env - rect);
        self.env
    }

    pub fn process_block(&mut self, env_out: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(env_out.len(), src.len());
        for (e, s) in env_out.iter_mut().zip(src) {
            *e = self.process_sample(*s);
        }
    }
}

/// RMS follower: one pole over the squared signal
#[derive(Debug, Clone)]
pub struct RmsFollower {
    coef: Sample,
    mean_sq: Sample,
}

impl RmsFollower {
    pub fn new(window_ms: f64, sample_rate: f64) -> Self {
        Self {
            coef: time_coef(window_ms, sample_rate),
            mean_sq: 0.0,
        }
    }

    pub fn set_window(&mut self, window_ms: f64, sample_rate: f64) {
        self.coef = time_coef(window_ms, sample_rate);
    }

    pub fn reset(&mut self) {
        self.mean_sq = 0.0;
    }

    #[inline(always)]
    pub fn process_sample(&mut self, x: Sample) -> Sample {
        let sq = x * x;
        self.mean_sq = sq + self.coef * (self.mean_sq - sq);
        self.mean_sq.sqrt()
    }

    /// Feed a pre-averaged power value (downsampled-rate operation)
    #[inline(always)]
    pub fn process_power(&mut self, mean_square: Sample) -> Sample {
        self.mean_sq = mean_square + self.coef * (self.mean_sq - mean_square);
        self.mean_sq.sqrt()
    }

    pub fn process_block(&mut self, env_out: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(env_out.len(), src.len());
        for (e, s) in env_out.iter_mut().zip(src) {
            *e = self.process_sample(*s);
        }
    }
}
