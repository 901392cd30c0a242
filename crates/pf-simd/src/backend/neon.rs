//! AArch64 backend (NEON)
//!
//! NEON is mandatory on AArch64. Conversions use `vcvtnq_s32_f32` so that
//! float-to-int rounding matches the SSE `cvtps2dq` ties-to-even behavior
//! bit for bit.

#![allow(clippy::missing_safety_doc)]

use core::arch::aarch64::*;

pub(crate) type F32R = float32x4_t;
pub(crate) type S32R = int32x4_t;
pub(crate) type U32R = uint32x4_t;

// ============================================================================
// f32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn f32_splat(v: f32) -> F32R {
    unsafe { vdupq_n_f32(v) }
}

#[inline(always)]
pub(crate) fn f32_from_array(a: [f32; 4]) -> F32R {
    unsafe { vld1q_f32(a.as_ptr()) }
}

#[inline(always)]
pub(crate) fn f32_to_array(r: F32R) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    unsafe { vst1q_f32(out.as_mut_ptr(), r) };
    out
}

/// # Safety
/// `ptr` must be 16-byte aligned and valid for reading 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_load(ptr: *const f32) -> F32R {
    unsafe { vld1q_f32(ptr) }
}

/// # Safety
/// `ptr` must be valid for reading 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_load_u(ptr: *const f32) -> F32R {
    unsafe { vld1q_f32(ptr) }
}

/// # Safety
/// `ptr` must be 16-byte aligned and valid for writing 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_store(ptr: *mut f32, r: F32R) {
    unsafe { vst1q_f32(ptr, r) }
}

/// # Safety
/// `ptr` must be valid for writing 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_store_u(ptr: *mut f32, r: F32R) {
    unsafe { vst1q_f32(ptr, r) }
}

#[inline(always)]
pub(crate) fn f32_add(a: F32R, b: F32R) -> F32R {
    unsafe { vaddq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_sub(a: F32R, b: F32R) -> F32R {
    unsafe { vsubq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_mul(a: F32R, b: F32R) -> F32R {
    unsafe { vmulq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_div(a: F32R, b: F32R) -> F32R {
    unsafe { vdivq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_neg(a: F32R) -> F32R {
    unsafe { vnegq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_abs(a: F32R) -> F32R {
    unsafe { vabsq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_min(a: F32R, b: F32R) -> F32R {
    // vminq follows IEEE minNum; SSE min_ps returns b on NaN or equal-zero
    // operands. minnm differs only in NaN handling, which we do not rely on.
    unsafe { vminq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_max(a: F32R, b: F32R) -> F32R {
    unsafe { vmaxq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_sqrt(a: F32R) -> F32R {
    unsafe { vsqrtq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_rcp_est(a: F32R) -> F32R {
    unsafe { vrecpeq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_rsqrt_est(a: F32R) -> F32R {
    unsafe { vrsqrteq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_cmp_eq(a: F32R, b: F32R) -> U32R {
    unsafe { vceqq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_cmp_lt(a: F32R, b: F32R) -> U32R {
    unsafe { vcltq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_cmp_le(a: F32R, b: F32R) -> U32R {
    unsafe { vcleq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_cmp_gt(a: F32R, b: F32R) -> U32R {
    unsafe { vcgtq_f32(a, b) }
}

#[inline(always)]
pub(crate) fn f32_cmp_ge(a: F32R, b: F32R) -> U32R {
    unsafe { vcgeq_f32(a, b) }
}

/// Per-lane bit blend: mask lane all-ones takes `a`, all-zeros takes `b`
#[inline(always)]
pub(crate) fn f32_select(mask: U32R, a: F32R, b: F32R) -> F32R {
    unsafe { vbslq_f32(mask, a, b) }
}

#[inline(always)]
pub(crate) fn f32_sum_h(a: F32R) -> f32 {
    unsafe { vaddvq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_min_h(a: F32R) -> f32 {
    unsafe { vminvq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_max_h(a: F32R) -> f32 {
    unsafe { vmaxvq_f32(a) }
}

#[inline(always)]
pub(crate) fn f32_movemask(a: F32R) -> u32 {
    mask_movemask(unsafe { vreinterpretq_u32_f32(a) })
}

/// Round to nearest (ties to even) and convert to i32 lanes
#[inline(always)]
pub(crate) fn f32_round_s32(a: F32R) -> S32R {
    unsafe { vcvtnq_s32_f32(a) }
}

/// Truncate toward zero and convert to i32 lanes
#[inline(always)]
pub(crate) fn f32_trunc_s32(a: F32R) -> S32R {
    unsafe { vcvtq_s32_f32(a) }
}

#[inline(always)]
pub(crate) fn s32_to_f32(a: S32R) -> F32R {
    unsafe { vcvtq_f32_s32(a) }
}

#[inline(always)]
pub(crate) fn f32_cast_s32(a: F32R) -> S32R {
    unsafe { vreinterpretq_s32_f32(a) }
}

#[inline(always)]
pub(crate) fn s32_cast_f32(a: S32R) -> F32R {
    unsafe { vreinterpretq_f32_s32(a) }
}

// ============================================================================
// i32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn s32_splat(v: i32) -> S32R {
    unsafe { vdupq_n_s32(v) }
}

#[inline(always)]
pub(crate) fn s32_from_array(a: [i32; 4]) -> S32R {
    unsafe { vld1q_s32(a.as_ptr()) }
}

#[inline(always)]
pub(crate) fn s32_to_array(r: S32R) -> [i32; 4] {
    let mut out = [0i32; 4];
    unsafe { vst1q_s32(out.as_mut_ptr(), r) };
    out
}

#[inline(always)]
pub(crate) fn s32_add(a: S32R, b: S32R) -> S32R {
    unsafe { vaddq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_sub(a: S32R, b: S32R) -> S32R {
    unsafe { vsubq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_mul(a: S32R, b: S32R) -> S32R {
    unsafe { vmulq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_and(a: S32R, b: S32R) -> S32R {
    unsafe { vandq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_or(a: S32R, b: S32R) -> S32R {
    unsafe { vorrq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_xor(a: S32R, b: S32R) -> S32R {
    unsafe { veorq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_not(a: S32R) -> S32R {
    unsafe { vmvnq_s32(a) }
}

#[inline(always)]
pub(crate) fn s32_shl<const N: i32>(a: S32R) -> S32R {
    unsafe { vshlq_n_s32::<N>(a) }
}

/// Arithmetic shift right (sign-propagating). Negative-amount `vshlq` form
/// because `vshrq_n` rejects a shift of 0.
#[inline(always)]
pub(crate) fn s32_shr<const N: i32>(a: S32R) -> S32R {
    unsafe { vshlq_s32(a, vdupq_n_s32(-N)) }
}

#[inline(always)]
pub(crate) fn s32_min(a: S32R, b: S32R) -> S32R {
    unsafe { vminq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_max(a: S32R, b: S32R) -> S32R {
    unsafe { vmaxq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_cmp_eq(a: S32R, b: S32R) -> U32R {
    unsafe { vceqq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_cmp_gt(a: S32R, b: S32R) -> U32R {
    unsafe { vcgtq_s32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_select(mask: U32R, a: S32R, b: S32R) -> S32R {
    unsafe { vbslq_s32(mask, a, b) }
}

// ============================================================================
// u32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn u32_splat(v: u32) -> U32R {
    unsafe { vdupq_n_u32(v) }
}

#[inline(always)]
pub(crate) fn u32_from_array(a: [u32; 4]) -> U32R {
    unsafe { vld1q_u32(a.as_ptr()) }
}

#[inline(always)]
pub(crate) fn u32_to_array(r: U32R) -> [u32; 4] {
    let mut out = [0u32; 4];
    unsafe { vst1q_u32(out.as_mut_ptr(), r) };
    out
}

#[inline(always)]
pub(crate) fn u32_add(a: U32R, b: U32R) -> U32R {
    unsafe { vaddq_u32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_sub(a: U32R, b: U32R) -> U32R {
    unsafe { vsubq_u32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_and(a: U32R, b: U32R) -> U32R {
    unsafe { vandq_u32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_or(a: U32R, b: U32R) -> U32R {
    unsafe { vorrq_u32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_xor(a: U32R, b: U32R) -> U32R {
    unsafe { veorq_u32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_not(a: U32R) -> U32R {
    unsafe { vmvnq_u32(a) }
}

#[inline(always)]
pub(crate) fn u32_shl<const N: i32>(a: U32R) -> U32R {
    unsafe { vshlq_n_u32::<N>(a) }
}

/// Logical shift right (zero-filling). Negative-amount `vshlq` form because
/// `vshrq_n` rejects a shift of 0.
#[inline(always)]
pub(crate) fn u32_shr<const N: i32>(a: U32R) -> U32R {
    unsafe { vshlq_u32(a, vdupq_n_s32(-N)) }
}

#[inline(always)]
pub(crate) fn u32_cmp_eq(a: U32R, b: U32R) -> U32R {
    unsafe { vceqq_u32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_select(mask: U32R, a: U32R, b: U32R) -> U32R {
    unsafe { vbslq_u32(mask, a, b) }
}

/// Sign bits of the four lanes packed into the low 4 bits
#[inline(always)]
pub(crate) fn mask_movemask(a: U32R) -> u32 {
    unsafe {
        let bits = vshrq_n_u32::<31>(a);
        let weights = vld1q_u32([1u32, 2, 4, 8].as_ptr());
        vaddvq_u32(vmulq_u32(bits, weights))
    }
}
