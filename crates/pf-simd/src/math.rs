//! Approximate vector math
//!
//! Deterministic polynomial and table approximations for the hot path. Every
//! function gives identical results on all backends and across all lanes, with
//! the error bound documented per function. Inputs outside the stated domain
//! give unspecified (but never UB) results.

use crate::{Vf32, Vs32};

// Cubic fit of log2(1+t) over [0, 1), |err| < 7.8e-4
const LOG2_C0: f32 = 1.424_600_5;
const LOG2_C1: f32 = -0.589_236_8;
const LOG2_C2: f32 = 0.165_411_1;

// Cubic fit of 2^f - 1 over [0, 1), |err| < 1.25e-4
const EXP2_C0: f32 = 0.695_555_44;
const EXP2_C1: f32 = 0.226_179_32;
const EXP2_C2: f32 = 0.078_140_67;

const MANTISSA_MASK: i32 = 0x007F_FFFF;
const ONE_BITS: i32 = 0x3F80_0000;

/// Inverse table: `INV_TABLE[i] = 1 / (1 + i/1024)` over [1, 2].
///
/// Process-wide, immutable, initialized at compile time. `div_approx` walks it
/// with linear interpolation between adjacent entries.
pub static INV_TABLE: [f32; 1025] = build_inv_table();

const fn build_inv_table() -> [f32; 1025] {
    let mut t = [0.0f32; 1025];
    let mut i = 0;
    while i < 1025 {
        t[i] = (1.0f64 / (1.0 + i as f64 / 1024.0)) as f32;
        i += 1;
    }
    t
}

/// Base-2 logarithm.
///
/// Domain: normal positive floats. Exponent comes from the bit pattern,
/// mantissa through a cubic. Absolute error < 1e-3.
#[inline]
pub fn log2_approx(x: Vf32) -> Vf32 {
    let bits = x.cast_s32();
    let e = (bits.shr_arith::<23>() - Vs32::splat(127)).conv_f32();
    let m = ((bits & Vs32::splat(MANTISSA_MASK)) | Vs32::splat(ONE_BITS)).cast_f32();
    let t = m - Vf32::splat(1.0);
    let p = Vf32::splat(LOG2_C2)
        .mul_add(t, Vf32::splat(LOG2_C1))
        .mul_add(t, Vf32::splat(LOG2_C0))
        * t;
    e + p
}

/// Base-2 exponential.
///
/// Domain: roughly [-125, 127]. Integer part rebuilds the exponent bits,
/// fraction through a cubic. Relative error < 2e-4.
#[inline]
pub fn exp2_approx(x: Vf32) -> Vf32 {
    let ipart = x.floor();
    let f = x - ipart;
    let p = Vf32::splat(EXP2_C2)
        .mul_add(f, Vf32::splat(EXP2_C1))
        .mul_add(f, Vf32::splat(EXP2_C0))
        .mul_add(f, Vf32::splat(1.0));
    let scale = (ipart.conv_s32() + Vs32::splat(127)).shl::<23>().cast_f32();
    p * scale
}

/// `base^exp` through log2/exp2. Domain: normal positive `base`.
#[inline]
pub fn pow_approx(base: Vf32, exp: Vf32) -> Vf32 {
    exp2_approx(log2_approx(base) * exp)
}

/// Reciprocal: hardware estimate plus one Newton step.
///
/// Relative error < 5e-5 on normal inputs (exact on the portable backend).
#[inline]
pub fn rcp_approx(x: Vf32) -> Vf32 {
    let e = Vf32(crate::backend::f32_rcp_est(x.0));
    // e' = e * (2 - x*e)
    e * (Vf32::splat(2.0) - x * e)
}

/// Reciprocal square root: estimate plus one Newton step.
///
/// Relative error < 5e-5 on normal positive inputs.
#[inline]
pub fn rsqrt_approx(x: Vf32) -> Vf32 {
    let e = Vf32(crate::backend::f32_rsqrt_est(x.0));
    newton_rsqrt(x, e)
}

/// Reciprocal square root with two Newton steps. Near full f32 precision.
#[inline]
pub fn rsqrt_approx2(x: Vf32) -> Vf32 {
    let e = Vf32(crate::backend::f32_rsqrt_est(x.0));
    newton_rsqrt(x, newton_rsqrt(x, e))
}

#[inline(always)]
fn newton_rsqrt(x: Vf32, e: Vf32) -> Vf32 {
    // e' = e * (1.5 - 0.5*x*e*e)
    let half_x = x * Vf32::splat(0.5);
    e * (Vf32::splat(1.5) - half_x * e * e)
}

/// Square root via `x * rsqrt(x)` with a zero guard.
///
/// Relative error < 5e-5 on normal positive inputs; exact 0 at 0.
#[inline]
pub fn sqrt_approx(x: Vf32) -> Vf32 {
    let r = x * rsqrt_approx(x);
    Vf32::select(x.eq(Vf32::zero()), Vf32::zero(), r)
}

/// Division via table-driven reciprocal multiply: `a * (1/b)`.
///
/// The reciprocal of each `b` lane comes from `INV_TABLE` indexed by the top
/// 10 mantissa bits, linearly interpolated against the next entry, with the
/// exponent negated in the bit pattern. Domain: `b` normal and nonzero (either
/// sign). Relative error < 1e-6.
#[inline]
pub fn div_approx(a: Vf32, b: Vf32) -> Vf32 {
    let lanes = b.to_array();
    let r = [
        recip_table(lanes[0]),
        recip_table(lanes[1]),
        recip_table(lanes[2]),
        recip_table(lanes[3]),
    ];
    a * Vf32::from_array(r)
}

#[inline(always)]
fn recip_table(x: f32) -> f32 {
    let bits = x.to_bits();
    let sign = bits & 0x8000_0000;
    let exp = ((bits >> 23) & 0xFF) as i32 - 127;
    let idx = ((bits >> 13) & 0x3FF) as usize;
    let frac = (bits & 0x1FFF) as f32 * (1.0 / 8192.0);
    let t0 = INV_TABLE[idx];
    let t1 = INV_TABLE[idx + 1];
    let inv_m = t0 + (t1 - t0) * frac;
    // 1/(m * 2^e) = (1/m) * 2^-e
    let inv_bits = inv_m.to_bits().wrapping_sub((exp as u32) << 23);
    f32::from_bits(sign | inv_bits)
}
