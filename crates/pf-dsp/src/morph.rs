//! Coefficient morphing for the biquad pack
//!
//! `Biquad4Morph` moves the pack's coefficients to a new target over a fixed
//! number of samples instead of jumping, which keeps parameter changes
//! click-free. The ramp engine is a small state machine:
//!
//! - Idle: coefficients static, plain processing
//! - Ramping: per-sample linear step toward the target through the pack's
//!   stepping variants; on completion the coefficients snap exactly to the
//!   target so float drift never accumulates
//! - A retarget while a ramp is consuming samples goes into a single
//!   programmed slot (last writer wins) and starts when the current ramp
//!   completes; a retarget before any samples were consumed re-arms in place

use pf_simd::Vf32;

use crate::biquad::BiquadCoefs;
use crate::pack::Biquad4;

const DEFAULT_RAMP_LEN: u32 = 64;

#[derive(Debug, Clone, Copy)]
struct Target {
    b: [Vf32; 3],
    a: [Vf32; 2],
}

impl Target {
    fn splat(coefs: &BiquadCoefs) -> Self {
        Self {
            b: [
                Vf32::splat(coefs.b0),
                Vf32::splat(coefs.b1),
                Vf32::splat(coefs.b2),
            ],
            a: [Vf32::splat(coefs.a1), Vf32::splat(coefs.a2)],
        }
    }

    fn set_lane(&mut self, lane: usize, coefs: &BiquadCoefs) {
        let mut b0 = self.b[0].to_array();
        let mut b1 = self.b[1].to_array();
        let mut b2 = self.b[2].to_array();
        let mut a1 = self.a[0].to_array();
        let mut a2 = self.a[1].to_array();
        b0[lane] = coefs.b0;
        b1[lane] = coefs.b1;
        b2[lane] = coefs.b2;
        a1[lane] = coefs.a1;
        a2[lane] = coefs.a2;
        self.b = [
            Vf32::from_array(b0),
            Vf32::from_array(b1),
            Vf32::from_array(b2),
        ];
        self.a = [Vf32::from_array(a1), Vf32::from_array(a2)];
    }
}

/// Biquad pack with ramped coefficient updates (parallel wiring)
#[derive(Debug, Clone)]
pub struct Biquad4Morph {
    pack: Biquad4,
    target: Target,
    step_b: [Vf32; 3],
    step_a: [Vf32; 2],
    ramp_len: u32,
    /// Samples left in the active ramp; 0 = idle
    rem: u32,
    programmed: Option<Target>,
}

impl Default for Biquad4Morph {
    fn default() -> Self {
        let pack = Biquad4::new();
        let (b, a) = pack.z_eq();
        Self {
            pack,
            target: Target { b, a },
            step_b: [Vf32::zero(); 3],
            step_a: [Vf32::zero(); 2],
            ramp_len: DEFAULT_RAMP_LEN,
            rem: 0,
            programmed: None,
        }
    }
}

impl Biquad4Morph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ramp length in samples (>= 1).
    ///
    /// If a ramp is armed but has not consumed any samples yet, its step is
    /// rescaled to the new length; a ramp in flight keeps its old length.
    pub fn set_ramp_time(&mut self, samples: u32) {
        assert!(samples >= 1);
        if self.rem != 0 && self.rem == self.ramp_len {
            self.rem = samples;
            self.compute_step(samples);
        }
        self.ramp_len = samples;
    }

    fn compute_step(&mut self, len: u32) {
        let inv = Vf32::splat(1.0 / len as f32);
        let (cur_b, cur_a) = self.pack.z_eq();
        for i in 0..3 {
            self.step_b[i] = (self.target.b[i] - cur_b[i]) * inv;
        }
        for i in 0..2 {
            self.step_a[i] = (self.target.a[i] - cur_a[i]) * inv;
        }
    }

    fn apply_target(&mut self, target: Target, ramp: bool) {
        if !ramp {
            self.pack.set_z_eq(target.b, target.a);
            self.target = target;
            self.rem = 0;
            self.programmed = None;
            return;
        }
        if self.rem == 0 || self.rem == self.ramp_len {
            // Idle, or armed with no samples consumed yet: (re)arm in place
            self.target = target;
            self.rem = self.ramp_len;
            self.compute_step(self.ramp_len);
        } else {
            // Mid-flight: stash, last writer wins
            self.programmed = Some(target);
        }
    }

    /// Pending target a per-lane retarget merges into
    fn pending_target(&self) -> Target {
        self.programmed.unwrap_or(self.target)
    }

    pub fn set_z_eq(&mut self, b: [Vf32; 3], a: [Vf32; 2], ramp: bool) {
        self.apply_target(Target { b, a }, ramp);
    }

    pub fn set_z_eq_same(&mut self, coefs: &BiquadCoefs, ramp: bool) {
        self.apply_target(Target::splat(coefs), ramp);
    }

    /// Retarget a single lane; the other lanes keep their pending target
    pub fn set_z_eq_one(&mut self, lane: usize, coefs: &BiquadCoefs, ramp: bool) {
        assert!(lane < 4);
        let mut target = self.pending_target();
        target.set_lane(lane, coefs);
        self.apply_target(target, ramp);
    }

    pub fn neutralise(&mut self, ramp: bool) {
        self.set_z_eq_same(&BiquadCoefs::bypass(), ramp);
    }

    pub fn neutralise_one(&mut self, lane: usize, ramp: bool) {
        self.set_z_eq_one(lane, &BiquadCoefs::bypass(), ramp);
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.rem != 0
    }

    pub fn get_target_coefs(&self) -> ([Vf32; 3], [Vf32; 2]) {
        (self.target.b, self.target.a)
    }

    pub fn clear_buffers(&mut self) {
        self.pack.clear_buffers();
    }

    /// Direct access to the underlying pack (read-only)
    pub fn pack(&self) -> &Biquad4 {
        &self.pack
    }

    fn finish_ramp(&mut self) {
        // Exact snap kills accumulated float drift
        self.pack.set_z_eq(self.target.b, self.target.a);
        self.rem = 0;
        if let Some(next) = self.programmed.take() {
            self.target = next;
            self.rem = self.ramp_len;
            self.compute_step(self.ramp_len);
        }
    }

    #[inline]
    pub fn process_sample_par(&mut self, x: Vf32) -> Vf32 {
        if self.rem == 0 {
            return self.pack.process_sample_par(x);
        }
        let mut out = [Vf32::zero()];
        self.process_block_par(&mut out, &[x]);
        out[0]
    }

    pub fn process_block_par(&mut self, dst: &mut [Vf32], src: &[Vf32]) {
        debug_assert_eq!(dst.len(), src.len());
        let mut done = 0;
        while done < src.len() {
            if self.rem == 0 {
                self.pack
                    .process_block_par(&mut dst[done..], &src[done..]);
                return;
            }
            let run = (self.rem as usize).min(src.len() - done);
            self.pack.process_block_par_step(
                &mut dst[done..done + run],
                &src[done..done + run],
                self.step_b,
                self.step_a,
            );
            self.rem -= run as u32;
            done += run;
            if self.rem == 0 {
                self.finish_ramp();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lowpass() -> BiquadCoefs {
        BiquadCoefs::lowpass(1000.0, 0.7071, 48000.0)
    }

    fn highpass() -> BiquadCoefs {
        BiquadCoefs::highpass(4000.0, 1.0, 48000.0)
    }

    fn run(morph: &mut Biquad4Morph, n: usize) {
        let src = vec![Vf32::zero(); n];
        let mut dst = vec![Vf32::zero(); n];
        morph.process_block_par(&mut dst, &src);
    }

    fn coef_b0(morph: &Biquad4Morph) -> f32 {
        morph.pack().z_eq().0[0].extract::<0>()
    }

    #[test]
    fn test_immediate_set_no_ramp() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), lowpass().b0);
    }

    #[test]
    fn test_ramp_converges_exactly() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(32);
        m.set_z_eq_same(&highpass(), true);
        assert!(m.is_ramping());

        run(&mut m, 32);
        assert!(!m.is_ramping());
        // Bit-exact snap at completion, not within-epsilon
        assert_eq!(coef_b0(&m), highpass().b0);
    }

    #[test]
    fn test_partial_ramp_then_completion() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(64);
        m.set_z_eq_same(&highpass(), true);

        run(&mut m, 20);
        assert!(m.is_ramping());
        let mid = coef_b0(&m);
        assert!(mid != lowpass().b0 && mid != highpass().b0);

        run(&mut m, 44);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), highpass().b0);
    }

    #[test]
    fn test_midflight_retarget_is_programmed() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(32);
        m.set_z_eq_same(&highpass(), true);

        run(&mut m, 10);
        let before = coef_b0(&m);
        let third = BiquadCoefs::bandpass(2000.0, 1.0, 48000.0);
        m.set_z_eq_same(&third, true);
        // In-flight ramp undisturbed: next sample continues the old step
        let (tb, _) = m.get_target_coefs();
        assert_eq!(tb[0].extract::<0>(), highpass().b0);
        run(&mut m, 1);
        let after = coef_b0(&m);
        assert!((after - before).abs() < 0.5 * (highpass().b0 - lowpass().b0).abs() + 1e-3);

        // First ramp completes on highpass, then the programmed one runs
        run(&mut m, 21);
        assert!(m.is_ramping());
        run(&mut m, 32);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), third.b0);
    }

    #[test]
    fn test_programmed_last_writer_wins() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(32);
        m.set_z_eq_same(&highpass(), true);
        run(&mut m, 5);

        m.set_z_eq_same(&BiquadCoefs::notch(500.0, 2.0, 48000.0), true);
        let last = BiquadCoefs::bandpass(1500.0, 1.0, 48000.0);
        m.set_z_eq_same(&last, true);

        run(&mut m, 27 + 32);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), last.b0);
    }

    #[test]
    fn test_rearm_before_samples_consumed() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(32);
        m.set_z_eq_same(&highpass(), true);
        // No samples consumed: this replaces the armed ramp outright
        let other = BiquadCoefs::notch(500.0, 2.0, 48000.0);
        m.set_z_eq_same(&other, true);

        run(&mut m, 32);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), other.b0);
    }

    #[test]
    fn test_set_ramp_time_rescales_armed_ramp() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(32);
        m.set_z_eq_same(&highpass(), true);
        // Armed but unstarted: shortening the ramp reprices the step
        m.set_ramp_time(8);
        run(&mut m, 8);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), highpass().b0);
    }

    #[test]
    fn test_per_lane_ramp() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(16);
        m.set_z_eq_one(2, &highpass(), true);

        run(&mut m, 16);
        assert!(!m.is_ramping());
        let (b, _) = m.pack().z_eq();
        let b0 = b[0].to_array();
        assert_eq!(b0[2], highpass().b0);
        assert_eq!(b0[0], lowpass().b0);
        assert_eq!(b0[1], lowpass().b0);
        assert_eq!(b0[3], lowpass().b0);
    }

    #[test]
    fn test_immediate_set_cancels_ramp() {
        let mut m = Biquad4Morph::new();
        m.set_z_eq_same(&lowpass(), false);
        m.set_ramp_time(32);
        m.set_z_eq_same(&highpass(), true);
        run(&mut m, 10);

        m.set_z_eq_same(&lowpass(), false);
        assert!(!m.is_ramping());
        assert_eq!(coef_b0(&m), lowpass().b0);
    }
}
