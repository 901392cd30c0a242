//! Multiband splitter and spectral noise gate
//!
//! `CrossoverSplitter` is a serial Linkwitz-Riley 24 dB/oct crossover chain
//! with allpass phase compensation: every band that leaves the chain early
//! passes the 2nd-order allpass of each later split, so the band sum equals
//! an allpass-filtered copy of the input (flat magnitude).
//!
//! `BandGate` gates one band from a downsampled RMS envelope, and `NoiseGate`
//! wires splitter, per-band gates, and the recombining sum into one
//! processor.

use pf_core::{PfError, PfResult, Processor, Sample};

use crate::biquad::{Biquad, BiquadCoefs};
use crate::envelope::RmsFollower;

const LR_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Per-sample linear gain ramp from `from` to `to` across the slice
#[inline]
pub fn scale_ramp(buf: &mut [Sample], from: Sample, to: Sample) {
    if buf.is_empty() {
        return;
    }
    let step = (to - from) / buf.len() as Sample;
    let mut g = from;
    for s in buf.iter_mut() {
        g += step;
        *s *= g;
    }
}

// ============================================================================
// CrossoverSplitter
// ============================================================================

/// N-band Linkwitz-Riley crossover tree (serial form), 2..=8 bands
pub struct CrossoverSplitter {
    freqs: Vec<f64>,
    gains: Vec<Sample>,
    /// Per split: two cascaded 2nd-order butterworth lowpasses (LR24)
    lp: Vec<[Biquad; 2]>,
    hp: Vec<[Biquad; 2]>,
    /// Per band: allpasses of every later split frequency
    comp: Vec<Vec<Biquad>>,
    residual: Vec<Sample>,
}

impl CrossoverSplitter {
    /// `freqs` are the ascending crossover frequencies; band count is
    /// `freqs.len() + 1` and must be 2..=8.
    pub fn new(freqs: &[f64], sample_rate: f64) -> PfResult<Self> {
        let bands = freqs.len() + 1;
        if !(2..=8).contains(&bands) {
            return Err(PfError::InvalidParam(format!(
                "band count {bands} outside 2..=8"
            )));
        }
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
            freqs: freqs.to_vec(),
            gains: vec![1.0; bands],
            lp: Vec::new(),
            hp: Vec::new(),
            comp: Vec::new(),
            residual: Vec::new(),
        };
        splitter.design(sample_rate);
        Ok(splitter)
    }

    pub fn bands(&self) -> usize {
        self.freqs.len() + 1
    }

    /// Redesign all sections for a new sample rate, clearing state
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.design(sample_rate);
    }

    fn design(&mut self, sample_rate: f64) {
        let splits = self.freqs.len();
        self.lp = self
            .freqs
            .iter()
            .map(|&f| {
                let c = BiquadCoefs::lowpass(f, LR_Q, sample_rate);
                [Biquad::new(c), Biquad::new(c)]
            })
            .collect();
        self.hp = self
            .freqs
            .iter()
            .map(|&f| {
                let c = BiquadCoefs::highpass(f, LR_Q, sample_rate);
                [Biquad::new(c), Biquad::new(c)]
            })
            .collect();
        // Band k left the chain at split k; later splits rotate its phase
        // via the LR24 allpass equivalent.
        self.comp = (0..self.bands())
            .map(|band| {
                self.freqs[(band + 1).min(splits)..]
                    .iter()
                    .map(|&f| Biquad::new(BiquadCoefs::allpass(f, LR_Q, sample_rate)))
                    .collect()
            })
            .collect();
    }

    pub fn set_gain(&mut self, band: usize, gain: Sample) {
        self.gains[band] = gain;
    }

    pub fn gain(&self, band: usize) -> Sample {
        self.gains[band]
    }

    pub fn clear_buffers(&mut self) {
        for pair in self.lp.iter_mut().chain(self.hp.iter_mut()) {
            pair[0].clear_buffers();
            pair[1].clear_buffers();
        }
        for chain in self.comp.iter_mut() {
            for f in chain.iter_mut() {
                f.clear_buffers();
            }
        }
    }

    /// Split `src` into per-band buffers. `bands_out.len()` must equal
    /// `bands()`; each buffer is resized to `src.len()`.
    pub fn process_block(&mut self, bands_out: &mut [Vec<Sample>], src: &[Sample]) {
        assert_eq!(bands_out.len(), self.bands());
        self.residual.clear();
        self.residual.extend_from_slice(src);

        let splits = self.freqs.len();
        for k in 0..splits {
            let band = &mut bands_out[k];
            band.clear();
            band.extend_from_slice(&self.residual);
            for f in self.lp[k].iter_mut() {
                f.process_block_in_place(band);
            }
            for f in self.hp[k].iter_mut() {
                f.process_block_in_place(&mut self.residual);
            }
        }
        let last = &mut bands_out[splits];
        last.clear();
        last.extend_from_slice(&self.residual);

        for (band, chain) in bands_out.iter_mut().zip(self.comp.iter_mut()) {
            for f in chain.iter_mut() {
                f.process_block_in_place(band);
            }
        }
    }

    /// Recombine band buffers into `dst`, applying per-band gains
    pub fn sum_bands(&self, bands: &[Vec<Sample>], dst: &mut [Sample]) {
        assert_eq!(bands.len(), self.bands());
        dst.fill(0.0);
        for (band, &g) in bands.iter().zip(self.gains.iter()) {
            debug_assert_eq!(band.len(), dst.len());
            for (d, s) in dst.iter_mut().zip(band) {
                *d += g * s;
            }
        }
    }
}

// ============================================================================
// BandGate
// ============================================================================

/// Spectral gate for one band
///
/// The band is chopped into `down_factor`-sample chunks; each chunk's mean
/// power feeds a one-pole RMS envelope running at the downsampled rate. The
/// gate gain is
/// `(1 - clamp((thr*g0 - 1)/(thr - 1), 0, 1))^4` with `g0 = level / max(rms, level)`
/// and is applied with a per-sample linear ramp, so a fully-open band passes
/// untouched and a band at the floor is silenced with a 4th-order knee.
pub struct BandGate {
    threshold: Sample,
    level: Sample,
    down_factor: usize,
    env: RmsFollower,
    cur_gain: Sample,
}

impl BandGate {
    /// `threshold` > 1 sets the knee steepness; `level` is the open
    /// reference level; `down_factor` the envelope downsampling.
    pub fn new(
        threshold: Sample,
        level: Sample,
        window_ms: f64,
        down_factor: usize,
        sample_rate: f64,
    ) -> PfResult<Self> {
        if threshold <= 1.0 {
            return Err(PfError::InvalidParam(format!(
                "gate threshold {threshold} must be > 1"
            )));
        }
        if down_factor == 0 {
            return Err(PfError::InvalidParam("down_factor must be >= 1".into()));
        }
        Ok(Self {
            threshold,
            level,
            down_factor,
            env: RmsFollower::new(window_ms, sample_rate / down_factor as f64),
            cur_gain: 1.0,
        })
    }

    pub fn set_level(&mut self, level: Sample) {
        self.level = level;
    }

    pub fn reset(&mut self) {
        self.env.reset();
        self.cur_gain = 1.0;
    }

    #[inline]
    pub fn gain(&self) -> Sample {
        self.cur_gain
    }

    pub fn process_band(&mut self, buf: &mut [Sample]) {
        for chunk in buf.chunks_mut(self.down_factor) {
            let mean_sq =
                chunk.iter().map(|x| x * x).sum::<Sample>() / chunk.len() as Sample;
            let rms = self.env.process_power(mean_sq);
            let g0 = self.level / rms.max(self.level);
            let knee = ((self.threshold * g0 - 1.0) / (self.threshold - 1.0)).clamp(0.0, 1.0);
            let open = 1.0 - knee;
            let target = open * open * open * open;
            scale_ramp(chunk, self.cur_gain, target);
            self.cur_gain = target;
        }
    }
}

// ============================================================================
// NoiseGate
// ============================================================================

/// Multiband noise gate: split, gate each band, recombine
pub struct NoiseGate {
    splitter: CrossoverSplitter,
    gates: Vec<BandGate>,
    bands: Vec<Vec<Sample>>,
    sample_rate: f64,
}

/// Envelope window for the per-band RMS followers
const GATE_WINDOW_MS: f64 = 20.0;
/// Envelope downsampling factor
const GATE_DOWN_FACTOR: usize = 16;

impl NoiseGate {
    pub fn new(
        freqs: &[f64],
        threshold: Sample,
        level: Sample,
        sample_rate: f64,
    ) -> PfResult<Self> {
        let splitter = CrossoverSplitter::new(freqs, sample_rate)?;
        let bands = splitter.bands();
        let gates = (0..bands)
            .map(|_| {
                BandGate::new(threshold, level, GATE_WINDOW_MS, GATE_DOWN_FACTOR, sample_rate)
            })
            .collect::<PfResult<Vec<_>>>()?;
        Ok(Self {
            splitter,
            gates,
            bands: vec![Vec::new(); bands],
            sample_rate,
        })
    }

    /// Per-band gate floor
    pub fn set_level(&mut self, band: usize, level: Sample) {
        self.gates[band].set_level(level);
    }

    pub fn bands(&self) -> usize {
        self.gates.len()
    }

    pub fn process_block(&mut self, dst: &mut [Sample], src: &[Sample]) {
        debug_assert_eq!(dst.len(), src.len());
        self.splitter.process_block(&mut self.bands, src);
        for (band, gate) in self.bands.iter_mut().zip(self.gates.iter_mut()) {
            gate.process_band(band);
        }
        self.splitter.sum_bands(&self.bands, dst);
    }

    pub fn process_block_in_place(&mut self, buf: &mut [Sample]) {
        self.splitter.process_block(&mut self.bands, buf);
        for (band, gate) in self.bands.iter_mut().zip(self.gates.iter_mut()) {
            gate.process_band(band);
        }
        self.splitter.sum_bands(&self.bands, buf);
    }
}

impl Processor for NoiseGate {
    fn reset(&mut self, sample_rate: f64, max_block_len: usize) -> usize {
        if sample_rate != self.sample_rate {
            log::debug!(
                "noise gate redesign: {} Hz -> {} Hz",
                self.sample_rate,
                sample_rate
            );
            self.sample_rate = sample_rate;
            self.splitter.set_sample_rate(sample_rate);
        }
        for band in self.bands.iter_mut() {
            band.reserve(max_block_len);
        }
        self.clear_buffers();
        self.latency()
    }

    fn clear_buffers(&mut self) {
        self.splitter.clear_buffers();
        for gate in self.gates.iter_mut() {
            gate.reset();
        }
    }
}
