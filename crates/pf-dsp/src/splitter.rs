//! Fixed 8-band SIMD splitter
//!
//! Binary crossover tree: one Linkwitz-Riley split per level (3 levels),
//! plus the allpass compensation that keeps the 8 bands phase-matched. Every
//! band's chain is the same depth (10 sections), so the 8 bands run as the
//! lanes of two `Biquad4` packs in parallel wiring: per input sample, 10
//! vector biquad steps produce all 8 band samples at once.

use pf_core::{PfError, PfResult, Sample};
use pf_simd::Vf32;

use crate::bank::scale_ramp;
use crate::biquad::BiquadCoefs;
use crate::pack::Biquad4;

const LR_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

pub const SPLITTER_BANDS: usize = 8;
/// Sections per band chain: 3 LR24 splits (2 biquads each) + 4 allpasses
const CHAIN_LEN: usize = 10;

/// 8-band crossover splitter on two biquad packs
pub struct SplitterSimd {
    /// Bands 0..4 in lanes, one pack per chain section
    lo: [Biquad4; CHAIN_LEN],
    /// Bands 4..8 in lanes
    hi: [Biquad4; CHAIN_LEN],
    gains: [Sample; SPLITTER_BANDS],
    freqs: [f64; 7],
}

impl SplitterSimd {
    /// `freqs` are the 7 ascending crossover frequencies
    pub fn new(freqs: [f64; 7], sample_rate: f64) -> PfResult<Self> {
        if freqs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PfError::InvalidParam(
                "crossover frequencies must be strictly ascending".into(),
            ));
        }
        if freqs.iter().any(|&f| f <= 0.0 || f >= sample_rate / 2.0) {
            return Err(PfError::InvalidParam(
                "crossover frequency outside (0, nyquist)".into(),
            ));
        }
        let mut splitter = Self {
            lo: std::array::from_fn(|_| Biquad4::new()),
            hi: std::array::from_fn(|_| Biquad4::new()),
            gains: [1.0; SPLITTER_BANDS],
            freqs,
        };
        splitter.design(sample_rate);
        Ok(splitter)
    }

    /// Per-band chain in the tree: LR4 at each of the band's 3 split
    /// frequencies, then the allpasses of the splits it did not pass.
    fn band_chain(band: usize, freqs: &[f64; 7], sample_rate: f64) -> [BiquadCoefs; CHAIN_LEN] {
        let lr = |f: f64, high: bool| {
            if high {
                BiquadCoefs::highpass(f, LR_Q, sample_rate)
            } else {
                BiquadCoefs::lowpass(f, LR_Q, sample_rate)
            }
        };
        let ap = |f: f64| BiquadCoefs::allpass(f, LR_Q, sample_rate);

        // Level 1 splits at freqs[3]; level 2 at freqs[1] / freqs[5];
        // level 3 at freqs[0] / freqs[2] / freqs[4] / freqs[6].
        let l1_high = band >= 4;
        let l2_freq = if l1_high { freqs[5] } else { freqs[1] };
        let l2_other = if l1_high { freqs[1] } else { freqs[5] };
        let l2_high = (band / 2) % 2 == 1;
        let leaf = [freqs[0], freqs[2], freqs[4], freqs[6]];
        let quarter = band / 2;
        let l3_freq = leaf[quarter];
        let l3_high = band % 2 == 1;

        // The three leaf frequencies this band did not split at
        let mut comp_leafs = [0.0; 3];
        let mut i = 0;
        for (q, &f) in leaf.iter().enumerate() {
            if q != quarter {
                comp_leafs[i] = f;
                i += 1;
            }
        }
        let split1 = lr(freqs[3], l1_high);
        let split2 = lr(l2_freq, l2_high);
        let split3 = lr(l3_freq, l3_high);
        [
            split1,
            split1,
            split2,
            split2,
            split3,
            split3,
            ap(l2_other),
            ap(comp_leafs[0]),
            ap(comp_leafs[1]),
            ap(comp_leafs[2]),
        ]
    }

    fn design(&mut self, sample_rate: f64) {
        for band in 0..SPLITTER_BANDS {
            let chain = Self::band_chain(band, &self.freqs, sample_rate);
            let (pack, lane) = if band < 4 {
                (&mut self.lo, band)
            } else {
                (&mut self.hi, band - 4)
            };
            for (stage, coefs) in pack.iter_mut().zip(chain.iter()) {
                stage.set_z_eq_one(lane, coefs);
            }
        }
    }

    /// Redesign for a new sample rate, keeping gains, clearing state
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.design(sample_rate);
        self.clear_buffers();
    }

    pub fn set_gain(&mut self, band: usize, gain: Sample) {
        self.gains[band] = gain;
    }

    pub fn gain(&self, band: usize) -> Sample {
        self.gains[band]
    }

    pub fn clear_buffers(&mut self) {
        for pack in self.lo.iter_mut().chain(self.hi.iter_mut()) {
            pack.clear_buffers();
        }
    }

    /// All 8 band samples for one input sample
    #[inline]
    pub fn process_sample(&mut self, x: Sample) -> [Sample; SPLITTER_BANDS] {
        let mut vlo = Vf32::splat(x);
        let mut vhi = vlo;
        for (lo, hi) in self.lo.iter_mut().zip(self.hi.iter_mut()) {
            vlo = lo.process_sample_par(vlo);
            vhi = hi.process_sample_par(vhi);
        }
        let mut out = [0.0; SPLITTER_BANDS];
        vlo.write_to(&mut out[..4]);
        vhi.write_to(&mut out[4..]);
        out
    }

    /// Split `src` into 8 band buffers, each resized to `src.len()`
    pub fn process_block(&mut self, bands_out: &mut [Vec<Sample>], src: &[Sample]) {
        assert_eq!(bands_out.len(), SPLITTER_BANDS);
        for band in bands_out.iter_mut() {
            band.clear();
            band.resize(src.len(), 0.0);
        }
        for (n, &x) in src.iter().enumerate() {
            let out = self.process_sample(x);
            for (band, &v) in bands_out.iter_mut().zip(out.iter()) {
                band[n] = v;
            }
        }
    }

    /// Recombine band buffers into `dst`, applying per-band gains
    pub fn sum_bands(&self, bands: &[Vec<Sample>], dst: &mut [Sample]) {
        assert_eq!(bands.len(), SPLITTER_BANDS);
        dst.fill(0.0);
        for (band, &g) in bands.iter().zip(self.gains.iter()) {
            debug_assert_eq!(band.len(), dst.len());
            for (d, s) in dst.iter_mut().zip(band) {
                *d += g * s;
            }
        }
    }

    /// Ramp one band's gain across a block that was already split
    pub fn ramp_band_gain(&mut self, band: usize, buf: &mut [Sample], to: Sample) {
        let from = self.gains[band];
        scale_ramp(buf, from, to);
        self.gains[band] = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREQS: [f64; 7] = [100.0, 250.0, 600.0, 1500.0, 3500.0, 8000.0, 16000.0];

    fn sine(freq: f64, sr: f64, len: usize) -> Vec<Sample> {
        (0..len)
            .map(|n| (2.0 * std::f64::consts::PI * freq * n as f64 / sr).sin() as Sample)
            .collect()
    }

    fn rms(buf: &[Sample]) -> Sample {
        (buf.iter().map(|x| x * x).sum::<Sample>() / buf.len() as Sample).sqrt()
    }

    #[test]
    fn test_rejects_unsorted_freqs() {
        let mut f = FREQS;
        f.swap(2, 3);
        assert!(SplitterSimd::new(f, 48000.0).is_err());
        assert!(SplitterSimd::new(FREQS, 48000.0).is_ok());
    }

    #[test]
    fn test_band_sum_is_magnitude_flat() {
        let sr = 48000.0;
        let len = 19200;
        for &probe in &[50.0, 175.0, 400.0, 1000.0, 2500.0, 5000.0, 12000.0, 20000.0] {
            let mut sp = SplitterSimd::new(FREQS, sr).unwrap();
            let src = sine(probe, sr, len);
            let mut bands = vec![Vec::new(); SPLITTER_BANDS];
            sp.process_block(&mut bands, &src);
            let mut sum = vec![0.0; len];
            sp.sum_bands(&bands, &mut sum);

            let got = rms(&sum[len / 2..]);
            let want = rms(&src[len / 2..]);
            let db = 20.0 * (got / want).log10();
            assert!(db.abs() < 0.1, "probe {probe} Hz: {db} dB");
        }
    }

    #[test]
    fn test_probe_lands_in_its_band() {
        let sr = 48000.0;
        let len = 19200;
        // Band edges per FREQS; probe well inside band 3 (600..1500)
        let mut sp = SplitterSimd::new(FREQS, sr).unwrap();
        let src = sine(1000.0, sr, len);
        let mut bands = vec![Vec::new(); SPLITTER_BANDS];
        sp.process_block(&mut bands, &src);

        let energies: Vec<Sample> = bands.iter().map(|b| rms(&b[len / 2..])).collect();
        let loudest = energies
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(loudest, 3, "energies {energies:?}");
        // Distant bands are well down
        assert!(energies[0] < 0.02);
        assert!(energies[7] < 0.02);
    }

    #[test]
    fn test_muted_band_removes_content() {
        let sr = 48000.0;
        let len = 19200;
        let mut sp = SplitterSimd::new(FREQS, sr).unwrap();
        sp.set_gain(3, 0.0);
        let src = sine(1000.0, sr, len);
        let mut bands = vec![Vec::new(); SPLITTER_BANDS];
        sp.process_block(&mut bands, &src);
        let mut sum = vec![0.0; len];
        sp.sum_bands(&bands, &mut sum);
        assert!(rms(&sum[len / 2..]) < 0.2, "rms {}", rms(&sum[len / 2..]));
    }

    #[test]
    fn test_clear_buffers_silences_tail() {
        let sr = 48000.0;
        let mut sp = SplitterSimd::new(FREQS, sr).unwrap();
        let src = sine(500.0, sr, 4800);
        let mut bands = vec![Vec::new(); SPLITTER_BANDS];
        sp.process_block(&mut bands, &src);
        sp.clear_buffers();
        let out = sp.process_sample(0.0);
        assert_eq!(out, [0.0; SPLITTER_BANDS]);
    }
}
