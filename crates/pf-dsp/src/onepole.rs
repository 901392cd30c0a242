//! 4-lane one-pole pack
//!
//! First-order sections with the same three wirings as `Biquad4`. The serial
//! pipeline carries the same 4-sample latency and the 2x2 wiring 1 sample,
//! so the two pack types can be mixed in one cascade with a single latency
//! report.

use pf_core::Sample;
use pf_simd::Vf32;

/// Normalized first-order coefficients (a0 divided out)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnePoleCoefs {
    pub b0: Sample,
    pub b1: Sample,
    pub a1: Sample,
}

impl Default for OnePoleCoefs {
    fn default() -> Self {
        Self::bypass()
    }
}

impl OnePoleCoefs {
    /// 6 dB/oct lowpass (bilinear transform)
    pub fn lowpass(freq: f64, sample_rate: f64) -> Self {
        let k = (std::f64::consts::PI * freq / sample_rate).tan();
        let norm = 1.0 / (k + 1.0);
        Self {
            b0: (k * norm) as Sample,
            b1: (k * norm) as Sample,
            a1: ((k - 1.0) * norm) as Sample,
        }
    }

    /// 6 dB/oct highpass (bilinear transform)
    pub fn highpass(freq: f64, sample_rate: f64) -> Self {
        let k = (std::f64::consts::PI * freq / sample_rate).tan();
        let norm = 1.0 / (k + 1.0);
        Self {
            b0: norm as Sample,
            b1: (-norm) as Sample,
            a1: ((k - 1.0) * norm) as Sample,
        }
    }

    /// First-order allpass
    pub fn allpass(freq: f64, sample_rate: f64) -> Self {
        let k = (std::f64::consts::PI * freq / sample_rate).tan();
        let c = ((k - 1.0) / (k + 1.0)) as Sample;
        Self {
            b0: c,
            b1: 1.0,
            a1: c,
        }
    }

    /// Unity passthrough
    pub const fn bypass() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            a1: 0.0,
        }
    }
}

/// Four one-pole sections in SIMD lanes
#[derive(Debug, Clone)]
pub struct OnePole4 {
    b0: Vf32,
    b1: Vf32,
    a1: Vf32,
    x1: Vf32,
    y1: Vf32,
}

impl Default for OnePole4 {
    fn default() -> Self {
        let mut pack = Self {
            b0: Vf32::zero(),
            b1: Vf32::zero(),
            a1: Vf32::zero(),
            x1: Vf32::zero(),
            y1: Vf32::zero(),
        };
        pack.neutralise();
        pack
    }
}

impl OnePole4 {
    /// Latency of the serial lane-pipeline wiring, in samples
    pub const LATENCY_SERIAL: usize = 4;
    /// Latency of the 2x2 wiring, in samples
    pub const LATENCY_2X2: usize = 1;

    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set_z_eq(&mut self, b: [Vf32; 2], a1: Vf32) {
        self.b0 = b[0];
        self.b1 = b[1];
        self.a1 = a1;
    }

    /// Same scalar design in all 4 lanes
    #[inline]
    pub fn set_z_eq_same(&mut self, coefs: &OnePoleCoefs) {
        self.b0 = Vf32::splat(coefs.b0);
        self.b1 = Vf32::splat(coefs.b1);
        self.a1 = Vf32::splat(coefs.a1);
    }

    /// Replace one lane's coefficients, other lanes untouched
    pub fn set_z_eq_one(&mut self, lane: usize, coefs: &OnePoleCoefs) {
        assert!(lane < 4);
        let mut b0 = self.b0.to_array();
        let mut b1 = self.b1.to_array();
        let mut a1 = self.a1.to_array();
        b0[lane] = coefs.b0;
        b1[lane] = coefs.b1;
        a1[lane] = coefs.a1;
        self.b0 = Vf32::from_array(b0);
        self.b1 = Vf32::from_array(b1);
        self.a1 = Vf32::from_array(a1);
    }

    #[inline]
    pub fn z_eq(&self) -> ([Vf32; 2], Vf32) {
        ([self.b0, self.b1], self.a1)
    }

    pub fn neutralise(&mut self) {
        self.set_z_eq_same(&OnePoleCoefs::bypass());
    }

    pub fn neutralise_one(&mut self, lane: usize) {
        self.set_z_eq_one(lane, &OnePoleCoefs::bypass());
    }

    pub fn clear_buffers(&mut self) {
        self.x1 = Vf32::zero();
        self.y1 = Vf32::zero();
    }

    #[inline(always)]
    fn step_coefs(&mut self, b_inc: &[Vf32; 2], a1_inc: Vf32) {
        self.b0 += b_inc[0];
        self.b1 += b_inc[1];
        self.a1 += a1_inc;
    }

    // ========================================================================
    // Parallel wiring
    // ========================================================================

    #[inline(always)]
    pub fn process_sample_par(&mut self, x: Vf32) -> Vf32 {
        let y = self.b0 * x + self.b1 * self.x1 - self.a1 * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    pub fn process_block_par(&mut self, dst: &mut [Vf32], src: &[Vf32]) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_par(*s);
        }
    }

    pub fn process_block_par_step(
        &mut self,
        dst: &mut [Vf32],
        src: &[Vf32],
        b_inc: [Vf32; 2],
        a1_inc: Vf32,
    ) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_par(*s);
            self.step_coefs(&b_inc, a1_inc);
        }
    }

    // ========================================================================
    // Serial wiring (lane pipeline, latency 4)
    // ========================================================================

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
        b_inc: [Vf32; 2],
        a1_inc: Vf32,
    ) {
        debug_assert_eq!(dst.len(), src.len());
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.process_sample_ser_lat(*s);
            self.step_coefs(&b_inc, a1_inc);
        }
    }

    /// 4-stage cascade flushed within the sample, no latency
    pub fn process_block_ser_imm(&mut self, dst: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(dst.len(), src.len());
        let b0 = self.b0.to_array();
        let b1 = self.b1.to_array();
        let a1 = self.a1.to_array();
        let mut x1 = self.x1.to_array();
        let mut y1 = self.y1.to_array();
        for (d, s) in dst.iter_mut().zip(src) {
            let mut v = *s;
            for st in 0..4 {
                let y = b0[st] * v + b1[st] * x1[st] - a1[st] * y1[st];
                x1[st] = v;
                y1[st] = y;
                v = y;
            }
            *d = v;
        }
        self.x1 = Vf32::from_array(x1);
        self.y1 = Vf32::from_array(y1);
    }

    // ========================================================================
    // 2x2 wiring (2 stages x 2 channels, latency 1)
    // ========================================================================

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
        b_inc: [Vf32; 2],
        a1_inc: Vf32,
    ) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample_2x2_lat(*l, *r);
            self.step_coefs(&b_inc, a1_inc);
        }
    }

    /// 2-stage cascade flushed within the sample, no latency
    pub fn process_block_2x2_imm(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        let b0 = self.b0.to_array();
        let b1 = self.b1.to_array();
        let a1 = self.a1.to_array();
        let mut x1 = self.x1.to_array();
        let mut y1 = self.y1.to_array();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            for (ch, s) in [l, r].into_iter().enumerate() {
                let mut v = *s;
                for st in [ch, ch + 2] {
                    let y = b0[st] * v + b1[st] * x1[st] - a1[st] * y1[st];
                    x1[st] = v;
                    y1[st] = y;
                    v = y;
                }
                *s = v;
            }
        }
        self.x1 = Vf32::from_array(x1);
        self.y1 = Vf32::from_array(y1);
    }
}
