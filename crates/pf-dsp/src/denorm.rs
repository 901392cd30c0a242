//! Denormal guard for targets without flush-to-zero
//!
//! IIR tails decay into the denormal range and stall the FPU on cores that
//! handle denormals in microcode. `DenormStop` injects inaudible wideband
//! noise around 1e-20 into a buffer at a fixed sample interval, keeping
//! filter state out of that range. The RNG is plain xorshift32 held per
//! instance, so independent chains never contend and results are
//! reproducible from the seed.

use pf_core::Sample;

const DEFAULT_INTERVAL: u32 = 32;
const NOISE_SCALE: Sample = 1.0e-20;

/// Per-instance denormal dither
#[derive(Debug, Clone)]
pub struct DenormStop {
    state: u32,
    interval: u32,
    countdown: u32,
}

impl Default for DenormStop {
    fn default() -> Self {
        Self::new(0x9E37_79B9)
    }
}

impl DenormStop {
    pub fn new(seed: u32) -> Self {
        Self {
            // xorshift must never hold 0
            state: if seed == 0 { 1 } else { seed },
            interval: DEFAULT_INTERVAL,
            countdown: 1,
        }
    }

    /// Samples between injections (>= 1)
    pub fn set_interval(&mut self, interval: u32) {
        assert!(interval >= 1);
        self.interval = interval;
        self.countdown = self.countdown.min(interval);
    }

    #[inline(always)]
    fn next_noise(&mut self) -> Sample {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // Map to roughly [-1, 1] and scale far below audibility
        (x as i32 as Sample) * (NOISE_SCALE / i32::MAX as Sample)
    }

    /// Add dither to every `interval`-th sample of `buf`
    pub fn process_block(&mut self, buf: &mut [Sample]) {
        let mut i = 0usize;
        while i < buf.len() {
            let gap = self.countdown as usize;
            if gap > buf.len() - i {
                self.countdown = (gap - (buf.len() - i)) as u32;
                return;
            }
            i += gap;
            buf[i - 1] += self.next_noise();
            self.countdown = self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_inaudible() {
        let mut d = DenormStop::new(12345);
        d.set_interval(1);
        let mut buf = vec![0.0f32; 256];
        d.process_block(&mut buf);
        assert!(buf.iter().all(|&x| x != 0.0));
        assert!(buf.iter().all(|&x| x.abs() < 1.0e-19));
    }

    #[test]
    fn test_interval_spacing_across_blocks() {
        let mut d = DenormStop::new(7);
        d.set_interval(10);
        // Two blocks of 16: injections land at absolute samples 0, 10, 20, 30
        let mut hits = Vec::new();
        for block in 0..2 {
            let mut buf = vec![0.0f32; 16];
            d.process_block(&mut buf);
            for (n, &x) in buf.iter().enumerate() {
                if x != 0.0 {
                    hits.push(block * 16 + n);
                }
            }
        }
        assert_eq!(hits, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_reproducible_from_seed() {
        let mut a = DenormStop::new(42);
        let mut b = DenormStop::new(42);
        let mut buf_a = vec![0.0f32; 128];
        let mut buf_b = vec![0.0f32; 128];
        a.process_block(&mut buf_a);
        b.process_block(&mut buf_b);
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut a = DenormStop::new(1);
        let mut b = DenormStop::new(2);
        let mut buf_a = vec![0.0f32; 128];
        let mut buf_b = vec![0.0f32; 128];
        a.set_interval(1);
        b.set_interval(1);
        a.process_block(&mut buf_a);
        b.process_block(&mut buf_b);
        assert_ne!(buf_a, buf_b);
    }

    #[test]
    fn test_keeps_filter_tail_out_of_denormals() {
        // A decaying one-pole tail with per-sample dither stays pinned near
        // the noise floor instead of decaying without bound
        let mut d = DenormStop::default();
        d.set_interval(1);
        let mut y = 1.0f32;
        let mut min_mag = f32::MAX;
        for _ in 0..64 {
            let mut block = [0.0f32; 32];
            d.process_block(&mut block);
            for x in block {
                y = y * 0.5 + x;
                if y != 0.0 {
                    min_mag = min_mag.min(y.abs());
                }
            }
        }
        assert!(min_mag >= 1.0e-30, "tail reached {min_mag}");
    }
}
