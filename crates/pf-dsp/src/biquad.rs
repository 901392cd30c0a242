//! Scalar biquad designs and reference filter
//!
//! Designs run in f64 and quantize to f32 coefficients once, so the same
//! preset computes the same filter on every target. The scalar `Biquad` is
//! direct form I with the same state layout as the vector pack, which keeps
//! the two interchangeable in tests and lets the crossovers reuse it.

use pf_core::Sample;
use std::f64::consts::PI;

/// Normalized biquad coefficients (a0 divided out)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefs {
    pub b0: Sample,
    pub b1: Sample,
    pub b2: Sample,
    pub a1: Sample,
    pub a2: Sample,
}

impl Default for BiquadCoefs {
    fn default() -> Self {
        Self::bypass()
    }
}

struct RbjCommon {
    cos_omega: f64,
    alpha: f64,
}

fn rbj_common(freq: f64, q: f64, sample_rate: f64) -> RbjCommon {
    let omega = 2.0 * PI * freq / sample_rate;
    let sin_omega = omega.sin();
    RbjCommon {
        cos_omega: omega.cos(),
        alpha: sin_omega / (2.0 * q),
    }
}

impl BiquadCoefs {
    fn normalize(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: (b0 / a0) as Sample,
            b1: (b1 / a0) as Sample,
            b2: (b2 / a0) as Sample,
            a1: (a1 / a0) as Sample,
            a2: (a2 / a0) as Sample,
        }
    }

    /// Lowpass (RBJ cookbook)
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let c = rbj_common(freq, q, sample_rate);
        let b1 = 1.0 - c.cos_omega;
        Self::normalize(
            b1 / 2.0,
            b1,
            b1 / 2.0,
            1.0 + c.alpha,
            -2.0 * c.cos_omega,
            1.0 - c.alpha,
        )
    }

    /// Highpass (RBJ cookbook)
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let c = rbj_common(freq, q, sample_rate);
        let b1 = -(1.0 + c.cos_omega);
        Self::normalize(
            -b1 / 2.0,
            b1,
            -b1 / 2.0,
            1.0 + c.alpha,
            -2.0 * c.cos_omega,
            1.0 - c.alpha,
        )
    }

    /// Bandpass, constant 0 dB peak gain
    pub fn bandpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let c = rbj_common(freq, q, sample_rate);
        Self::normalize(
            c.alpha,
            0.0,
            -c.alpha,
            1.0 + c.alpha,
            -2.0 * c.cos_omega,
            1.0 - c.alpha,
        )
    }

    /// Notch
    pub fn notch(freq: f64, q: f64, sample_rate: f64) -> Self {
        let c = rbj_common(freq, q, sample_rate);
        Self::normalize(
            1.0,
            -2.0 * c.cos_omega,
            1.0,
            1.0 + c.alpha,
            -2.0 * c.cos_omega,
            1.0 - c.alpha,
        )
    }

    /// Second-order allpass
    pub fn allpass(freq: f64, q: f64, sample_rate: f64) -> Self {
        let c = rbj_common(freq, q, sample_rate);
        Self::normalize(
            1.0 - c.alpha,
            -2.0 * c.cos_omega,
            1.0 + c.alpha,
            1.0 + c.alpha,
            -2.0 * c.cos_omega,
            1.0 - c.alpha,
        )
    }

    /// Peaking EQ
    pub fn peaking(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let c = rbj_common(freq, q, sample_rate);
        Self::normalize(
            1.0 + c.alpha * a,
            -2.0 * c.cos_omega,
            1.0 - c.alpha * a,
            1.0 + c.alpha / a,
            -2.0 * c.cos_omega,
            1.0 - c.alpha / a,
        )
    }

    /// Low shelf
    pub fn low_shelf(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let c = rbj_common(freq, q, sample_rate);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * c.alpha;
        Self::normalize(
            a * ((a + 1.0) - (a - 1.0) * c.cos_omega + two_sqrt_a_alpha),
            2.0 * a * ((a - 1.0) - (a + 1.0) * c.cos_omega),
            a * ((a + 1.0) - (a - 1.0) * c.cos_omega - two_sqrt_a_alpha),
            (a + 1.0) + (a - 1.0) * c.cos_omega + two_sqrt_a_alpha,
            -2.0 * ((a - 1.0) + (a + 1.0) * c.cos_omega),
            (a + 1.0) + (a - 1.0) * c.cos_omega - two_sqrt_a_alpha,
        )
    }

    /// High shelf
    pub fn high_shelf(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let c = rbj_common(freq, q, sample_rate);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * c.alpha;
        Self::normalize(
            a * ((a + 1.0) + (a - 1.0) * c.cos_omega + two_sqrt_a_alpha),
            -2.0 * a * ((a - 1.0) + (a + 1.0) * c.cos_omega),
            a * ((a + 1.0) + (a - 1.0) * c.cos_omega - two_sqrt_a_alpha),
            (a + 1.0) - (a - 1.0) * c.cos_omega + two_sqrt_a_alpha,
            2.0 * ((a - 1.0) - (a + 1.0) * c.cos_omega),
            (a + 1.0) - (a - 1.0) * c.cos_omega - two_sqrt_a_alpha,
        )
    }

    /// Unity passthrough
    pub const fn bypass() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

/// Direct form I biquad, the scalar reference for the vector pack
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coefs: BiquadCoefs,
    x1: Sample,
    x2: Sample,
    y1: Sample,
    y2: Sample,
}

impl Biquad {
    pub fn new(coefs: BiquadCoefs) -> Self {
        Self {
            coefs,
            ..Default::default()
        }
    }

    #[inline]
    pub fn set_coefs(&mut self, coefs: BiquadCoefs) {
        self.coefs = coefs;
    }

    #[inline]
    pub fn coefs(&self) -> &BiquadCoefs {
        &self.coefs
    }

    pub fn clear_buffers(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    #[inline(always)]
    pub fn process_sample(&mut self, x: Sample) -> Sample {
        let c = &self.coefs;
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    pub fn process_block(&mut self, dst: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample(*s);
        }
    }

    pub fn process_block_in_place(&mut self, buf: &mut [Sample]) {
        for s in buf.iter_mut() {
            *s = self.process_sample(*s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_passthrough() {
        let mut f = Biquad::new(BiquadCoefs::bypass());
        for &x in &[0.5f32, -0.25, 1.0, 0.0] {
            assert_eq!(f.process_sample(x), x);
        }
    }

    #[test]
    fn test_lowpass_dc() {
        let mut f = Biquad::new(BiquadCoefs::lowpass(1000.0, 0.7071, 48000.0));
        for _ in 0..1000 {
            f.process_sample(1.0);
        }
        assert!((f.process_sample(1.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_highpass_dc() {
        let mut f = Biquad::new(BiquadCoefs::highpass(1000.0, 0.7071, 48000.0));
        for _ in 0..1000 {
            f.process_sample(1.0);
        }
        assert!(f.process_sample(1.0).abs() < 0.01);
    }

    #[test]
    fn test_allpass_unity_magnitude() {
        // Steady-state sine through an allpass keeps its amplitude
        let sr = 48000.0;
        let mut f = Biquad::new(BiquadCoefs::allpass(1000.0, 0.7071, sr));
        let freq = 500.0;
        let mut peak: f32 = 0.0;
        for n in 0..4800 {
            let x = (2.0 * PI * freq * n as f64 / sr).sin() as f32;
            let y = f.process_sample(x);
            if n > 2400 {
                peak = peak.max(y.abs());
            }
        }
        assert!((peak - 1.0).abs() < 0.01, "allpass peak {peak}");
    }

    #[test]
    fn test_clear_buffers() {
        let mut f = Biquad::new(BiquadCoefs::lowpass(1000.0, 0.7071, 48000.0));
        for _ in 0..100 {
            f.process_sample(1.0);
        }
        f.clear_buffers();
        assert_eq!(f.process_sample(0.0), 0.0);
    }
}
