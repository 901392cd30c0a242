//! x86-64 backend (SSE2 baseline)
//!
//! SSE2 is part of the x86-64 ABI, so no runtime detection is needed and every
//! function here compiles to straight-line vector code. Integer lane multiply
//! has no SSE2 instruction (`pmulld` is SSE4.1); it is done lane by lane and
//! still vectorizes acceptably on the targets we care about.

#![allow(clippy::missing_safety_doc)]

use core::arch::x86_64::*;

pub(crate) type F32R = __m128;
pub(crate) type S32R = __m128i;
pub(crate) type U32R = __m128i;

// ============================================================================
// f32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn f32_splat(v: f32) -> F32R {
    unsafe { _mm_set1_ps(v) }
}

#[inline(always)]
pub(crate) fn f32_from_array(a: [f32; 4]) -> F32R {
    unsafe { _mm_loadu_ps(a.as_ptr()) }
}

#[inline(always)]
pub(crate) fn f32_to_array(r: F32R) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    unsafe { _mm_storeu_ps(out.as_mut_ptr(), r) };
    out
}

/// # Safety
/// `ptr` must be 16-byte aligned and valid for reading 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_load(ptr: *const f32) -> F32R {
    unsafe { _mm_load_ps(ptr) }
}

/// # Safety
/// `ptr` must be valid for reading 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_load_u(ptr: *const f32) -> F32R {
    unsafe { _mm_loadu_ps(ptr) }
}

/// # Safety
/// `ptr` must be 16-byte aligned and valid for writing 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_store(ptr: *mut f32, r: F32R) {
    unsafe { _mm_store_ps(ptr, r) }
}

/// # Safety
/// `ptr` must be valid for writing 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_store_u(ptr: *mut f32, r: F32R) {
    unsafe { _mm_storeu_ps(ptr, r) }
}

#[inline(always)]
pub(crate) fn f32_add(a: F32R, b: F32R) -> F32R {
    unsafe { _mm_add_ps(a, b) }
}

#[inline(always)]
pub(crate) fn f32_sub(a: F32R, b: F32R) -> F32R {
    unsafe { _mm_sub_ps(a, b) }
}

#[inline(always)]
pub(crate) fn f32_mul(a: F32R, b: F32R) -> F32R {
    unsafe { _mm_mul_ps(a, b) }
}

#[inline(always)]
pub(crate) fn f32_div(a: F32R, b: F32R) -> F32R {
    unsafe { _mm_div_ps(a, b) }
}

#[inline(always)]
pub(crate) fn f32_neg(a: F32R) -> F32R {
    unsafe { _mm_xor_ps(a, _mm_set1_ps(-0.0)) }
}

#[inline(always)]
pub(crate) fn f32_abs(a: F32R) -> F32R {
    unsafe { _mm_andnot_ps(_mm_set1_ps(-0.0), a) }
}

#[inline(always)]
pub(crate) fn f32_min(a: F32R, b: F32R) -> F32R {
    unsafe { _mm_min_ps(a, b) }
}

#[inline(always)]
pub(crate) fn f32_max(a: F32R, b: F32R) -> F32R {
    unsafe { _mm_max_ps(a, b) }
}

#[inline(always)]
pub(crate) fn f32_sqrt(a: F32R) -> F32R {
    unsafe { _mm_sqrt_ps(a) }
}

#[inline(always)]
pub(crate) fn f32_rcp_est(a: F32R) -> F32R {
    unsafe { _mm_rcp_ps(a) }
}

#[inline(always)]
pub(crate) fn f32_rsqrt_est(a: F32R) -> F32R {
    unsafe { _mm_rsqrt_ps(a) }
}

#[inline(always)]
pub(crate) fn f32_cmp_eq(a: F32R, b: F32R) -> U32R {
    unsafe { _mm_castps_si128(_mm_cmpeq_ps(a, b)) }
}

#[inline(always)]
pub(crate) fn f32_cmp_lt(a: F32R, b: F32R) -> U32R {
    unsafe { _mm_castps_si128(_mm_cmplt_ps(a, b)) }
}

#[inline(always)]
pub(crate) fn f32_cmp_le(a: F32R, b: F32R) -> U32R {
    unsafe { _mm_castps_si128(_mm_cmple_ps(a, b)) }
}

#[inline(always)]
pub(crate) fn f32_cmp_gt(a: F32R, b: F32R) -> U32R {
    unsafe { _mm_castps_si128(_mm_cmpgt_ps(a, b)) }
}

#[inline(always)]
pub(crate) fn f32_cmp_ge(a: F32R, b: F32R) -> U32R {
    unsafe { _mm_castps_si128(_mm_cmpge_ps(a, b)) }
}

/// Per-lane bit blend: mask lane all-ones takes `a`, all-zeros takes `b`
#[inline(always)]
pub(crate) fn f32_select(mask: U32R, a: F32R, b: F32R) -> F32R {
    unsafe {
        let m = _mm_castsi128_ps(mask);
        _mm_or_ps(_mm_and_ps(m, a), _mm_andnot_ps(m, b))
    }
}

#[inline(always)]
pub(crate) fn f32_sum_h(a: F32R) -> f32 {
    unsafe {
        // [a0+a1, a1+a0, a2+a3, a3+a2] then fold high pair onto low
        let shuf = _mm_shuffle_ps(a, a, 0b10_11_00_01);
        let sums = _mm_add_ps(a, shuf);
        let hi = _mm_movehl_ps(sums, sums);
        _mm_cvtss_f32(_mm_add_ss(sums, hi))
    }
}

#[inline(always)]
pub(crate) fn f32_min_h(a: F32R) -> f32 {
    unsafe {
        let shuf = _mm_shuffle_ps(a, a, 0b10_11_00_01);
        let mins = _mm_min_ps(a, shuf);
        let hi = _mm_movehl_ps(mins, mins);
        _mm_cvtss_f32(_mm_min_ss(mins, hi))
    }
}

#[inline(always)]
pub(crate) fn f32_max_h(a: F32R) -> f32 {
    unsafe {
        let shuf = _mm_shuffle_ps(a, a, 0b10_11_00_01);
        let maxs = _mm_max_ps(a, shuf);
        let hi = _mm_movehl_ps(maxs, maxs);
        _mm_cvtss_f32(_mm_max_ss(maxs, hi))
    }
}

#[inline(always)]
pub(crate) fn f32_movemask(a: F32R) -> u32 {
    unsafe { _mm_movemask_ps(a) as u32 }
}

/// Round to nearest (ties to even) and convert to i32 lanes
#[inline(always)]
pub(crate) fn f32_round_s32(a: F32R) -> S32R {
    unsafe { _mm_cvtps_epi32(a) }
}

/// Truncate toward zero and convert to i32 lanes
#[inline(always)]
pub(crate) fn f32_trunc_s32(a: F32R) -> S32R {
    unsafe { _mm_cvttps_epi32(a) }
}

#[inline(always)]
pub(crate) fn s32_to_f32(a: S32R) -> F32R {
    unsafe { _mm_cvtepi32_ps(a) }
}

#[inline(always)]
pub(crate) fn f32_cast_s32(a: F32R) -> S32R {
    unsafe { _mm_castps_si128(a) }
}

#[inline(always)]
pub(crate) fn s32_cast_f32(a: S32R) -> F32R {
    unsafe { _mm_castsi128_ps(a) }
}

// ============================================================================
// i32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn s32_splat(v: i32) -> S32R {
    unsafe { _mm_set1_epi32(v) }
}

#[inline(always)]
pub(crate) fn s32_from_array(a: [i32; 4]) -> S32R {
    unsafe { _mm_loadu_si128(a.as_ptr() as *const __m128i) }
}

#[inline(always)]
pub(crate) fn s32_to_array(r: S32R) -> [i32; 4] {
    let mut out = [0i32; 4];
    unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, r) };
    out
}

#[inline(always)]
pub(crate) fn s32_add(a: S32R, b: S32R) -> S32R {
    unsafe { _mm_add_epi32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_sub(a: S32R, b: S32R) -> S32R {
    unsafe { _mm_sub_epi32(a, b) }
}

/// Lane-wise wrapping multiply. No packed 32-bit multiply until SSE4.1,
/// so go through the lanes.
#[inline(always)]
pub(crate) fn s32_mul(a: S32R, b: S32R) -> S32R {
    let x = s32_to_array(a);
    let y = s32_to_array(b);
    s32_from_array([
        x[0].wrapping_mul(y[0]),
        x[1].wrapping_mul(y[1]),
        x[2].wrapping_mul(y[2]),
        x[3].wrapping_mul(y[3]),
    ])
}

#[inline(always)]
pub(crate) fn s32_and(a: S32R, b: S32R) -> S32R {
    unsafe { _mm_and_si128(a, b) }
}

#[inline(always)]
pub(crate) fn s32_or(a: S32R, b: S32R) -> S32R {
    unsafe { _mm_or_si128(a, b) }
}

#[inline(always)]
pub(crate) fn s32_xor(a: S32R, b: S32R) -> S32R {
    unsafe { _mm_xor_si128(a, b) }
}

#[inline(always)]
pub(crate) fn s32_not(a: S32R) -> S32R {
    unsafe { _mm_xor_si128(a, _mm_set1_epi32(-1)) }
}

#[inline(always)]
pub(crate) fn s32_shl<const N: i32>(a: S32R) -> S32R {
    unsafe { _mm_slli_epi32::<N>(a) }
}

/// Arithmetic shift right (sign-propagating)
#[inline(always)]
pub(crate) fn s32_shr<const N: i32>(a: S32R) -> S32R {
    unsafe { _mm_srai_epi32::<N>(a) }
}

#[inline(always)]
pub(crate) fn s32_min(a: S32R, b: S32R) -> S32R {
    // No packed signed min until SSE4.1
    let gt = s32_cmp_gt(a, b);
    s32_select(gt, b, a)
}

#[inline(always)]
pub(crate) fn s32_max(a: S32R, b: S32R) -> S32R {
    let gt = s32_cmp_gt(a, b);
    s32_select(gt, a, b)
}

#[inline(always)]
pub(crate) fn s32_cmp_eq(a: S32R, b: S32R) -> U32R {
    unsafe { _mm_cmpeq_epi32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_cmp_gt(a: S32R, b: S32R) -> U32R {
    unsafe { _mm_cmpgt_epi32(a, b) }
}

#[inline(always)]
pub(crate) fn s32_select(mask: U32R, a: S32R, b: S32R) -> S32R {
    unsafe { _mm_or_si128(_mm_and_si128(mask, a), _mm_andnot_si128(mask, b)) }
}

// ============================================================================
// u32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn u32_splat(v: u32) -> U32R {
    unsafe { _mm_set1_epi32(v as i32) }
}

#[inline(always)]
pub(crate) fn u32_from_array(a: [u32; 4]) -> U32R {
    unsafe { _mm_loadu_si128(a.as_ptr() as *const __m128i) }
}

#[inline(always)]
pub(crate) fn u32_to_array(r: U32R) -> [u32; 4] {
    let mut out = [0u32; 4];
    unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, r) };
    out
}

#[inline(always)]
pub(crate) fn u32_add(a: U32R, b: U32R) -> U32R {
    unsafe { _mm_add_epi32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_sub(a: U32R, b: U32R) -> U32R {
    unsafe { _mm_sub_epi32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_and(a: U32R, b: U32R) -> U32R {
    unsafe { _mm_and_si128(a, b) }
}

#[inline(always)]
pub(crate) fn u32_or(a: U32R, b: U32R) -> U32R {
    unsafe { _mm_or_si128(a, b) }
}

#[inline(always)]
pub(crate) fn u32_xor(a: U32R, b: U32R) -> U32R {
    unsafe { _mm_xor_si128(a, b) }
}

#[inline(always)]
pub(crate) fn u32_not(a: U32R) -> U32R {
    unsafe { _mm_xor_si128(a, _mm_set1_epi32(-1)) }
}

#[inline(always)]
pub(crate) fn u32_shl<const N: i32>(a: U32R) -> U32R {
    unsafe { _mm_slli_epi32::<N>(a) }
}

/// Logical shift right (zero-filling)
#[inline(always)]
pub(crate) fn u32_shr<const N: i32>(a: U32R) -> U32R {
    unsafe { _mm_srli_epi32::<N>(a) }
}

#[inline(always)]
pub(crate) fn u32_cmp_eq(a: U32R, b: U32R) -> U32R {
    unsafe { _mm_cmpeq_epi32(a, b) }
}

#[inline(always)]
pub(crate) fn u32_select(mask: U32R, a: U32R, b: U32R) -> U32R {
    unsafe { _mm_or_si128(_mm_and_si128(mask, a), _mm_andnot_si128(mask, b)) }
}

/// Sign bits of the four lanes packed into the low 4 bits
#[inline(always)]
pub(crate) fn mask_movemask(a: U32R) -> u32 {
    unsafe { _mm_movemask_ps(_mm_castsi128_ps(a)) as u32 }
}
