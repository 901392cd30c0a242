//! 4-lane biquad pack
//!
//! One `Biquad4` holds four direct form I biquads in the lanes of a `Vf32`
//! and runs them in three wirings:
//!
//! - parallel: 4 independent filters, vector in, vector out
//! - serial with latency: 4 cascaded stages fed through a lane pipeline,
//!   scalar in/out, 4 samples of latency
//! - 2x2: 2 cascaded stages times 2 channels, 1 sample of latency
//!
//! The latency wirings keep the whole cascade inside one vector op per
//! sample; the `_imm` variants flush the cascade scalar-wise for callers that
//! cannot absorb latency. Stepping variants add a per-sample coefficient
//! increment for click-free parameter motion (the morph layer drives them).

use pf_core::Sample;
use pf_simd::Vf32;

use crate::biquad::BiquadCoefs;

/// Four biquads in SIMD lanes, direct form I
#[derive(Debug, Clone)]
pub struct Biquad4 {
    b0: Vf32,
    b1: Vf32,
    b2: Vf32,
    a1: Vf32,
    a2: Vf32,
    x1: Vf32,
    x2: Vf32,
    y1: Vf32,
    y2: Vf32,
}

impl Default for Biquad4 {
    fn default() -> Self {
        let mut pack = Self {
            b0: Vf32::zero(),
            b1: Vf32::zero(),
            b2: Vf32::zero(),
            a1: Vf32::zero(),
            a2: Vf32::zero(),
            x1: Vf32::zero(),
            x2: Vf32::zero(),
            y1: Vf32::zero(),
            y2: Vf32::zero(),
        };
        pack.neutralise();
        pack
    }
}

impl Biquad4 {
    /// Latency of the serial lane-pipeline wiring, in samples
    pub const LATENCY_SERIAL: usize = 4;
    /// Latency of the 2x2 wiring, in samples
    pub const LATENCY_2X2: usize = 1;

    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Coefficients
    // ========================================================================

    #[inline]
    pub fn set_z_eq(&mut self, b: [Vf32; 3], a: [Vf32; 2]) {
        self.b0 = b[0];
        self.b1 = b[1];
        self.b2 = b[2];
        self.a1 = a[0];
        self.a2 = a[1];
    }

    /// Same scalar design in all 4 lanes
    #[inline]
    pub fn set_z_eq_same(&mut self, coefs: &BiquadCoefs) {
        self.b0 = Vf32::splat(coefs.b0);
        self.b1 = Vf32::splat(coefs.b1);
        self.b2 = Vf32::splat(coefs.b2);
        self.a1 = Vf32::splat(coefs.a1);
        self.a2 = Vf32::splat(coefs.a2);
    }

    /// Replace one lane's coefficients, other lanes untouched
    pub fn set_z_eq_one(&mut self, lane: usize, coefs: &BiquadCoefs) {
        assert!(lane < 4);
        let mut b0 = self.b0.to_array();
        let mut b1 = self.b1.to_array();
        let mut b2 = self.b2.to_array();
        let mut a1 = self.a1.to_array();
        let mut a2 = self.a2.to_array();
        b0[lane] = coefs.b0;
        b1[lane] = coefs.b1;
        b2[lane] = coefs.b2;
        a1[lane] = coefs.a1;
        a2[lane] = coefs.a2;
        self.b0 = Vf32::from_array(b0);
        self.b1 = Vf32::from_array(b1);
        self.b2 = Vf32::from_array(b2);
        self.a1 = Vf32::from_array(a1);
        self.a2 = Vf32::from_array(a2);
    }

    #[inline]
    pub fn z_eq(&self) -> ([Vf32; 3], [Vf32; 2]) {
        ([self.b0, self.b1, self.b2], [self.a1, self.a2])
    }

    /// All lanes to unity passthrough
    pub fn neutralise(&mut self) {
        self.set_z_eq_same(&BiquadCoefs::bypass());
    }

    /// One lane to unity passthrough
    pub fn neutralise_one(&mut self, lane: usize) {
        self.set_z_eq_one(lane, &BiquadCoefs::bypass());
    }

    /// Zero all delay memory, coefficients untouched
    pub fn clear_buffers(&mut self) {
        self.x1 = Vf32::zero();
        self.x2 = Vf32::zero();
        self.y1 = Vf32::zero();
        self.y2 = Vf32::zero();
    }

    #[inline(always)]
    fn step_coefs(&mut self, b_inc: &[Vf32; 3], a_inc: &[Vf32; 2]) {
        self.b0 += b_inc[0];
        self.b1 += b_inc[1];
        self.b2 += b_inc[2];
        self.a1 += a_inc[0];
        self.a2 += a_inc[1];
    }

    // ========================================================================
    // Parallel wiring
    // ========================================================================

    #[inline(always)]
    pub fn process_sample_par(&mut self, x: Vf32) -> Vf32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    pub fn process_block_par(&mut self, dst: &mut [Vf32], src: &[Vf32]) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_par(*s);
        }
    }

    /// Parallel with per-sample coefficient increments
    pub fn process_block_par_step(
        &mut self,
        dst: &mut [Vf32],
        src: &[Vf32],
        b_inc: [Vf32; 3],
        a_inc: [Vf32; 2],
    ) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_par(*s);
            self.step_coefs(&b_inc, &a_inc);
        }
    }

    // ========================================================================
    // Serial wiring (lane pipeline, latency 4)
    // ========================================================================

    /// One sample through the 4-stage cascade pipeline.
    ///
    /// Stage n+1 consumes stage n's previous output, so the cascade result
    /// arrives `LATENCY_SERIAL` samples after its input.
    #[inline(always)]
    pub fn process_sample_ser_lat(&mut self, x: Sample) -> Sample {
        let delayed = self.y1.extract::<3>();
        let vin = Vf32::splat(x).compose::<3>(self.y1);
        self.process_sample_par(vin);
        delayed
    }

    pub fn process_block_ser_lat(&mut self, dst: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_ser_lat(*s);
        }
    }

    pub fn process_block_ser_lat_step(
        &mut self,
        dst: &mut [Sample],
        src: &[Sample],
        b_inc: [Vf32; 3],
        a_inc: [Vf32; 2],
    ) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_ser_lat(*s);
            self.step_coefs(&b_inc, &a_inc);
        }
    }

    /// 4-stage cascade flushed within the sample, no latency
    pub fn process_block_ser_imm(&mut self, dst: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(dst.len(), src.len());
        let b0 = self.b0.to_array();
        let b1 = self.b1.to_array();
        let b2 = self.b2.to_array();
        let a1 = self.a1.to_array();
        let a2 = self.a2.to_array();
        let mut x1 = self.x1.to_array();
        let mut x2 = self.x2.to_array();
        let mut y1 = self.y1.to_array();
        let mut y2 = self.y2.to_array();
        for (d, s) in dst.iter_mut().zip(src) {
            let mut v = *s;
            for st in 0..4 {
                let y = b0[st] * v + b1[st] * x1[st] + b2[st] * x2[st]
                    - a1[st] * y1[st]
                    - a2[st] * y2[st];
                x2[st] = x1[st];
                x1[st] = v;
                y2[st] = y1[st];
                y1[st] = y;
                v = y;
            }
            *d = v;
        }
        self.x1 = Vf32::from_array(x1);
        self.x2 = Vf32::from_array(x2);
        self.y1 = Vf32::from_array(y1);
        self.y2 = Vf32::from_array(y2);
    }

    // ========================================================================
    // 2x2 wiring (2 stages x 2 channels, latency 1)
    // ========================================================================

    /// One stereo sample through the 2-stage pipeline.
    ///
    /// Lanes 0/1 are stage 0 left/right, lanes 2/3 stage 1 left/right.
    /// Stage 1 consumes stage 0's previous output, so results arrive
    /// `LATENCY_2X2` sample late.
    #[inline(always)]
    pub fn process_sample_2x2_lat(&mut self, l: Sample, r: Sample) -> (Sample, Sample) {
        let y = self.y1.to_array();
        let vin = Vf32::new(l, r, y[0], y[1]);
        let out = self.process_sample_par(vin);
        (out.extract::<2>(), out.extract::<3>())
    }

    pub fn process_block_2x2_lat(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample_2x2_lat(*l, *r);
        }
    }

    pub fn process_block_2x2_lat_step(
        &mut self,
        left: &mut [Sample],
        right: &mut [Sample],
        b_inc: [Vf32; 3],
        a_inc: [Vf32; 2],
    ) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample_2x2_lat(*l, *r);
            self.step_coefs(&b_inc, &a_inc);
        }
    }

    /// 2-stage cascade flushed within the sample, no latency
    pub fn process_block_2x2_imm(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        let b0 = self.b0.to_array();
        let b1 = self.b1.to_array();
        let b2 = self.b2.to_array();
        let a1 = self.a1.to_array();
        let a2 = self.a2.to_array();
        let mut x1 = self.x1.to_array();
        let mut x2 = self.x2.to_array();
        let mut y1 = self.y1.to_array();
        let mut y2 = self.y2.to_array();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            for (ch, s) in [l, r].into_iter().enumerate() {
                let mut v = *s;
                // Stage lanes for this channel: ch and ch + 2
                for st in [ch, ch + 2] {
                    let y = b0[st] * v + b1[st] * x1[st] + b2[st] * x2[st]
                        - a1[st] * y1[st]
                        - a2[st] * y2[st];
                    x2[st] = x1[st];
                    x1[st] = v;
                    y2[st] = y1[st];
                    y1[st] = y;
                    v = y;
                }
                *s = v;
            }
        }
        self.x1 = Vf32::from_array(x1);
        self.x2 = Vf32::from_array(x2);
        self.y1 = Vf32::from_array(y1);
        self.y2 = Vf32::from_array(y2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biquad::Biquad;

    fn lowpass() -> BiquadCoefs {
        BiquadCoefs::lowpass(1000.0, 0.7071, 48000.0)
    }

    #[test]
    fn test_parallel_matches_scalar_per_lane() {
        let designs = [
            BiquadCoefs::lowpass(500.0, 0.7071, 48000.0),
            BiquadCoefs::highpass(2000.0, 1.0, 48000.0),
            BiquadCoefs::bandpass(1000.0, 2.0, 48000.0),
            BiquadCoefs::peaking(3000.0, 1.5, 6.0, 48000.0),
        ];
        let mut pack = Biquad4::new();
        let mut scalars: Vec<Biquad> = designs.iter().map(|c| Biquad::new(*c)).collect();
        for (lane, c) in designs.iter().enumerate() {
            pack.set_z_eq_one(lane, c);
        }

        let mut phase = 0.3f32;
        for _ in 0..256 {
            phase = (phase * 1.7 + 0.31).fract() - 0.5;
            let out = pack.process_sample_par(Vf32::splat(phase)).to_array();
            for (lane, f) in scalars.iter_mut().enumerate() {
                let want = f.process_sample(phase);
                assert!(
                    (out[lane] - want).abs() < 1e-6,
                    "lane {lane}: got {}, want {want}",
                    out[lane]
                );
            }
        }
    }

    #[test]
    fn test_serial_latency_exactly_four() {
        let mut pack = Biquad4::new();
        pack.neutralise();
        let mut out = Vec::new();
        for n in 0..16 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            out.push(pack.process_sample_ser_lat(x));
        }
        // Bypass cascade: the impulse reappears after exactly 4 samples
        for (n, &y) in out.iter().enumerate() {
            let want = if n == Biquad4::LATENCY_SERIAL { 1.0 } else { 0.0 };
            assert_eq!(y, want, "sample {n}");
        }
    }

    #[test]
    fn test_2x2_latency_exactly_one() {
        let mut pack = Biquad4::new();
        pack.neutralise();
        let mut left = vec![0.0f32; 8];
        let mut right = vec![0.0f32; 8];
        left[0] = 1.0;
        right[0] = -1.0;
        pack.process_block_2x2_lat(&mut left, &mut right);
        assert_eq!(left[Biquad4::LATENCY_2X2], 1.0);
        assert_eq!(right[Biquad4::LATENCY_2X2], -1.0);
        assert_eq!(left[0], 0.0);
        assert!(left[2..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_ser_imm_matches_scalar_cascade() {
        let c = lowpass();
        let mut pack = Biquad4::new();
        pack.set_z_eq_same(&c);
        let mut cascade: Vec<Biquad> = (0..4).map(|_| Biquad::new(c)).collect();

        let src: Vec<f32> = (0..64).map(|n| ((n * 37 + 11) % 64) as f32 / 64.0 - 0.5).collect();
        let mut dst = vec![0.0f32; src.len()];
        pack.process_block_ser_imm(&mut dst, &src);

        for (n, &x) in src.iter().enumerate() {
            let mut v = x;
            for f in cascade.iter_mut() {
                v = f.process_sample(v);
            }
            assert!((dst[n] - v).abs() < 1e-6, "sample {n}: got {}, want {v}", dst[n]);
        }
    }

    #[test]
    fn test_ser_lat_equals_ser_imm_shifted() {
        let c = lowpass();
        let mut lat = Biquad4::new();
        lat.set_z_eq_same(&c);
        let mut imm = Biquad4::new();
        imm.set_z_eq_same(&c);

        let src: Vec<f32> = (0..128)
            .map(|n| (n as f32 * 0.37).sin() * 0.5)
            .collect();
        let mut out_lat = vec![0.0f32; src.len()];
        let mut out_imm = vec![0.0f32; src.len()];
        lat.process_block_ser_lat(&mut out_lat, &src);
        imm.process_block_ser_imm(&mut out_imm, &src);

        for n in Biquad4::LATENCY_SERIAL..src.len() {
            let want = out_imm[n - Biquad4::LATENCY_SERIAL];
            assert!(
                (out_lat[n] - want).abs() < 1e-5,
                "sample {n}: lat {}, imm {}",
                out_lat[n],
                want
            );
        }
    }

    #[test]
    fn test_2x2_imm_matches_scalar_cascade() {
        let c = lowpass();
        let mut pack = Biquad4::new();
        pack.set_z_eq_same(&c);
        let mut casc_l: Vec<Biquad> = (0..2).map(|_| Biquad::new(c)).collect();
        let mut casc_r: Vec<Biquad> = (0..2).map(|_| Biquad::new(c)).collect();

        let mut left: Vec<f32> = (0..64).map(|n| (n as f32 * 0.21).sin()).collect();
        let mut right: Vec<f32> = (0..64).map(|n| (n as f32 * 0.13).cos()).collect();
        let src_l = left.clone();
        let src_r = right.clone();
        pack.process_block_2x2_imm(&mut left, &mut right);

        for n in 0..64 {
            let mut vl = src_l[n];
            let mut vr = src_r[n];
            for f in casc_l.iter_mut() {
                vl = f.process_sample(vl);
            }
            for f in casc_r.iter_mut() {
                vr = f.process_sample(vr);
            }
            assert!((left[n] - vl).abs() < 1e-6);
            assert!((right[n] - vr).abs() < 1e-6);
        }
    }

    #[test]
    fn test_neutralise_one_lane() {
        let mut pack = Biquad4::new();
        pack.set_z_eq_same(&lowpass());
        pack.neutralise_one(2);
        let out = pack.process_sample_par(Vf32::splat(1.0)).to_array();
        // Lane 2 passes the sample through unchanged
        assert_eq!(out[2], 1.0);
        assert!(out[0] < 1.0);
    }

    #[test]
    fn test_stepping_reaches_target() {
        let start = lowpass();
        let end = BiquadCoefs::highpass(4000.0, 1.0, 48000.0);
        let n = 32u32;
        let mut pack = Biquad4::new();
        pack.set_z_eq_same(&start);

        let inv = 1.0 / n as f32;
        let b_inc = [
            Vf32::splat((end.b0 - start.b0) * inv),
            Vf32::splat((end.b1 - start.b1) * inv),
            Vf32::splat((end.b2 - start.b2) * inv),
        ];
        let a_inc = [
            Vf32::splat((end.a1 - start.a1) * inv),
            Vf32::splat((end.a2 - start.a2) * inv),
        ];
        let src = vec![Vf32::zero(); n as usize];
        let mut dst = vec![Vf32::zero(); n as usize];
        pack.process_block_par_step(&mut dst, &src, b_inc, a_inc);

        let ([b0, _, _], [a1, _]) = pack.z_eq();
        // Accumulated steps land within float-step error of the target
        assert!((b0.extract::<0>() - end.b0).abs() < 1e-4);
        assert!((a1.extract::<0>() - end.a1).abs() < 1e-4);
    }

    #[test]
    fn test_clear_buffers_keeps_coefs() {
        let mut pack = Biquad4::new();
        pack.set_z_eq_same(&lowpass());
        for _ in 0..32 {
            pack.process_sample_par(Vf32::splat(0.7));
        }
        let before = pack.z_eq();
        pack.clear_buffers();
        assert_eq!(pack.z_eq().0[0], before.0[0]);
        assert_eq!(pack.process_sample_par(Vf32::zero()), Vf32::zero());
    }
}
