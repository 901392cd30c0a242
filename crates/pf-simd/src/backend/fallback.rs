//! Portable backend (plain arrays)
//!
//! Reference semantics for the other backends. Everything is written so that
//! the autovectorizer has a clean shot at it, but correctness comes first:
//! float-to-int rounding is ties-to-even to match `cvtps2dq` / `vcvtnq`.

#![allow(clippy::missing_safety_doc)]

pub(crate) type F32R = [f32; 4];
pub(crate) type S32R = [i32; 4];
pub(crate) type U32R = [u32; 4];

#[inline(always)]
fn map2_f32(a: F32R, b: F32R, f: impl Fn(f32, f32) -> f32) -> F32R {
    [f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2]), f(a[3], b[3])]
}

#[inline(always)]
fn cmp_f32(a: F32R, b: F32R, f: impl Fn(f32, f32) -> bool) -> U32R {
    let lane = |x, y| if f(x, y) { u32::MAX } else { 0 };
    [
        lane(a[0], b[0]),
        lane(a[1], b[1]),
        lane(a[2], b[2]),
        lane(a[3], b[3]),
    ]
}

// ============================================================================
// f32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn f32_splat(v: f32) -> F32R {
    [v; 4]
}

#[inline(always)]
pub(crate) fn f32_from_array(a: [f32; 4]) -> F32R {
    a
}

#[inline(always)]
pub(crate) fn f32_to_array(r: F32R) -> [f32; 4] {
    r
}

/// # Safety
/// `ptr` must be valid for reading 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_load(ptr: *const f32) -> F32R {
    unsafe { core::ptr::read(ptr as *const [f32; 4]) }
}

/// # Safety
/// `ptr` must be valid for reading 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_load_u(ptr: *const f32) -> F32R {
    unsafe { core::ptr::read_unaligned(ptr as *const [f32; 4]) }
}

/// # Safety
/// `ptr` must be valid for writing 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_store(ptr: *mut f32, r: F32R) {
    unsafe { core::ptr::write(ptr as *mut [f32; 4], r) }
}

/// # Safety
/// `ptr` must be valid for writing 4 floats.
#[inline(always)]
pub(crate) unsafe fn f32_store_u(ptr: *mut f32, r: F32R) {
    unsafe { core::ptr::write_unaligned(ptr as *mut [f32; 4], r) }
}

#[inline(always)]
pub(crate) fn f32_add(a: F32R, b: F32R) -> F32R {
    map2_f32(a, b, |x, y| x + y)
}

#[inline(always)]
pub(crate) fn f32_sub(a: F32R, b: F32R) -> F32R {
    map2_f32(a, b, |x, y| x - y)
}

#[inline(always)]
pub(crate) fn f32_mul(a: F32R, b: F32R) -> F32R {
    map2_f32(a, b, |x, y| x * y)
}

#[inline(always)]
pub(crate) fn f32_div(a: F32R, b: F32R) -> F32R {
    map2_f32(a, b, |x, y| x / y)
}

#[inline(always)]
pub(crate) fn f32_neg(a: F32R) -> F32R {
    [-a[0], -a[1], -a[2], -a[3]]
}

#[inline(always)]
pub(crate) fn f32_abs(a: F32R) -> F32R {
    [a[0].abs(), a[1].abs(), a[2].abs(), a[3].abs()]
}

#[inline(always)]
pub(crate) fn f32_min(a: F32R, b: F32R) -> F32R {
    // SSE semantics: returns the second operand when either is NaN
    map2_f32(a, b, |x, y| if x < y { x } else { y })
}

#[inline(always)]
pub(crate) fn f32_max(a: F32R, b: F32R) -> F32R {
    map2_f32(a, b, |x, y| if x > y { x } else { y })
}

#[inline(always)]
pub(crate) fn f32_sqrt(a: F32R) -> F32R {
    [a[0].sqrt(), a[1].sqrt(), a[2].sqrt(), a[3].sqrt()]
}

#[inline(always)]
pub(crate) fn f32_rcp_est(a: F32R) -> F32R {
    // Full-precision stands in for the hardware estimate; the Newton step in
    // `math` is a no-op on top of it.
    [1.0 / a[0], 1.0 / a[1], 1.0 / a[2], 1.0 / a[3]]
}

#[inline(always)]
pub(crate) fn f32_rsqrt_est(a: F32R) -> F32R {
    [
        1.0 / a[0].sqrt(),
        1.0 / a[1].sqrt(),
        1.0 / a[2].sqrt(),
        1.0 / a[3].sqrt(),
    ]
}

#[inline(always)]
pub(crate) fn f32_cmp_eq(a: F32R, b: F32R) -> U32R {
    cmp_f32(a, b, |x, y| x == y)
}

#[inline(always)]
pub(crate) fn f32_cmp_lt(a: F32R, b: F32R) -> U32R {
    cmp_f32(a, b, |x, y| x < y)
}

#[inline(always)]
pub(crate) fn f32_cmp_le(a: F32R, b: F32R) -> U32R {
    cmp_f32(a, b, |x, y| x <= y)
}

#[inline(always)]
pub(crate) fn f32_cmp_gt(a: F32R, b: F32R) -> U32R {
    cmp_f32(a, b, |x, y| x > y)
}

#[inline(always)]
pub(crate) fn f32_cmp_ge(a: F32R, b: F32R) -> U32R {
    cmp_f32(a, b, |x, y| x >= y)
}

/// Per-lane bit blend: mask lane all-ones takes `a`, all-zeros takes `b`
#[inline(always)]
pub(crate) fn f32_select(mask: U32R, a: F32R, b: F32R) -> F32R {
    let blend = |m: u32, x: f32, y: f32| {
        f32::from_bits((x.to_bits() & m) | (y.to_bits() & !m))
    };
    [
        blend(mask[0], a[0], b[0]),
        blend(mask[1], a[1], b[1]),
        blend(mask[2], a[2], b[2]),
        blend(mask[3], a[3], b[3]),
    ]
}

#[inline(always)]
pub(crate) fn f32_sum_h(a: F32R) -> f32 {
    // Pairwise order matches the SSE shuffle/movehl reduction
    (a[0] + a[1]) + (a[2] + a[3])
}

#[inline(always)]
pub(crate) fn f32_min_h(a: F32R) -> f32 {
    let lo = if a[0] < a[1] { a[0] } else { a[1] };
    let hi = if a[2] < a[3] { a[2] } else { a[3] };
    if lo < hi { lo } else { hi }
}

#[inline(always)]
pub(crate) fn f32_max_h(a: F32R) -> f32 {
    let lo = if a[0] > a[1] { a[0] } else { a[1] };
    let hi = if a[2] > a[3] { a[2] } else { a[3] };
    if lo > hi { lo } else { hi }
}

#[inline(always)]
pub(crate) fn f32_movemask(a: F32R) -> u32 {
    mask_movemask([
        a[0].to_bits(),
        a[1].to_bits(),
        a[2].to_bits(),
        a[3].to_bits(),
    ])
}

/// Round to nearest (ties to even) and convert to i32 lanes
#[inline(always)]
pub(crate) fn f32_round_s32(a: F32R) -> S32R {
    let lane = |x: f32| x.round_ties_even() as i32;
    [lane(a[0]), lane(a[1]), lane(a[2]), lane(a[3])]
}

/// Truncate toward zero and convert to i32 lanes
#[inline(always)]
pub(crate) fn f32_trunc_s32(a: F32R) -> S32R {
    [a[0] as i32, a[1] as i32, a[2] as i32, a[3] as i32]
}

#[inline(always)]
pub(crate) fn s32_to_f32(a: S32R) -> F32R {
    [a[0] as f32, a[1] as f32, a[2] as f32, a[3] as f32]
}

#[inline(always)]
pub(crate) fn f32_cast_s32(a: F32R) -> S32R {
    [
        a[0].to_bits() as i32,
        a[1].to_bits() as i32,
        a[2].to_bits() as i32,
        a[3].to_bits() as i32,
    ]
}

#[inline(always)]
pub(crate) fn s32_cast_f32(a: S32R) -> F32R {
    [
        f32::from_bits(a[0] as u32),
        f32::from_bits(a[1] as u32),
        f32::from_bits(a[2] as u32),
        f32::from_bits(a[3] as u32),
    ]
}

// ============================================================================
// i32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn s32_splat(v: i32) -> S32R {
    [v; 4]
}

#[inline(always)]
pub(crate) fn s32_from_array(a: [i32; 4]) -> S32R {
    a
}

#[inline(always)]
pub(crate) fn s32_to_array(r: S32R) -> [i32; 4] {
    r
}

#[inline(always)]
pub(crate) fn s32_add(a: S32R, b: S32R) -> S32R {
    [
        a[0].wrapping_add(b[0]),
        a[1].wrapping_add(b[1]),
        a[2].wrapping_add(b[2]),
        a[3].wrapping_add(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_sub(a: S32R, b: S32R) -> S32R {
    [
        a[0].wrapping_sub(b[0]),
        a[1].wrapping_sub(b[1]),
        a[2].wrapping_sub(b[2]),
        a[3].wrapping_sub(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_mul(a: S32R, b: S32R) -> S32R {
    [
        a[0].wrapping_mul(b[0]),
        a[1].wrapping_mul(b[1]),
        a[2].wrapping_mul(b[2]),
        a[3].wrapping_mul(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_and(a: S32R, b: S32R) -> S32R {
    [a[0] & b[0], a[1] & b[1], a[2] & b[2], a[3] & b[3]]
}

#[inline(always)]
pub(crate) fn s32_or(a: S32R, b: S32R) -> S32R {
    [a[0] | b[0], a[1] | b[1], a[2] | b[2], a[3] | b[3]]
}

#[inline(always)]
pub(crate) fn s32_xor(a: S32R, b: S32R) -> S32R {
    [a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]
}

#[inline(always)]
pub(crate) fn s32_not(a: S32R) -> S32R {
    [!a[0], !a[1], !a[2], !a[3]]
}

#[inline(always)]
pub(crate) fn s32_shl<const N: i32>(a: S32R) -> S32R {
    [a[0] << N, a[1] << N, a[2] << N, a[3] << N]
}

/// Arithmetic shift right (sign-propagating)
#[inline(always)]
pub(crate) fn s32_shr<const N: i32>(a: S32R) -> S32R {
    [a[0] >> N, a[1] >> N, a[2] >> N, a[3] >> N]
}

#[inline(always)]
pub(crate) fn s32_min(a: S32R, b: S32R) -> S32R {
    [
        a[0].min(b[0]),
        a[1].min(b[1]),
        a[2].min(b[2]),
        a[3].min(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_max(a: S32R, b: S32R) -> S32R {
    [
        a[0].max(b[0]),
        a[1].max(b[1]),
        a[2].max(b[2]),
        a[3].max(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_cmp_eq(a: S32R, b: S32R) -> U32R {
    let lane = |x: i32, y: i32| if x == y { u32::MAX } else { 0 };
    [
        lane(a[0], b[0]),
        lane(a[1], b[1]),
        lane(a[2], b[2]),
        lane(a[3], b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_cmp_gt(a: S32R, b: S32R) -> U32R {
    let lane = |x: i32, y: i32| if x > y { u32::MAX } else { 0 };
    [
        lane(a[0], b[0]),
        lane(a[1], b[1]),
        lane(a[2], b[2]),
        lane(a[3], b[3]),
    ]
}

#[inline(always)]
pub(crate) fn s32_select(mask: U32R, a: S32R, b: S32R) -> S32R {
    let blend = |m: u32, x: i32, y: i32| ((x as u32 & m) | (y as u32 & !m)) as i32;
    [
        blend(mask[0], a[0], b[0]),
        blend(mask[1], a[1], b[1]),
        blend(mask[2], a[2], b[2]),
        blend(mask[3], a[3], b[3]),
    ]
}

// ============================================================================
// u32 lanes
// ============================================================================

#[inline(always)]
pub(crate) fn u32_splat(v: u32) -> U32R {
    [v; 4]
}

#[inline(always)]
pub(crate) fn u32_from_array(a: [u32; 4]) -> U32R {
    a
}

#[inline(always)]
pub(crate) fn u32_to_array(r: U32R) -> [u32; 4] {
    r
}

#[inline(always)]
pub(crate) fn u32_add(a: U32R, b: U32R) -> U32R {
    [
        a[0].wrapping_add(b[0]),
        a[1].wrapping_add(b[1]),
        a[2].wrapping_add(b[2]),
        a[3].wrapping_add(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn u32_sub(a: U32R, b: U32R) -> U32R {
    [
        a[0].wrapping_sub(b[0]),
        a[1].wrapping_sub(b[1]),
        a[2].wrapping_sub(b[2]),
        a[3].wrapping_sub(b[3]),
    ]
}

#[inline(always)]
pub(crate) fn u32_and(a: U32R, b: U32R) -> U32R {
    [a[0] & b[0], a[1] & b[1], a[2] & b[2], a[3] & b[3]]
}

#[inline(always)]
pub(crate) fn u32_or(a: U32R, b: U32R) -> U32R {
    [a[0] | b[0], a[1] | b[1], a[2] | b[2], a[3] | b[3]]
}

#[inline(always)]
pub(crate) fn u32_xor(a: U32R, b: U32R) -> U32R {
    [a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]
}

#[inline(always)]
pub(crate) fn u32_not(a: U32R) -> U32R {
    [!a[0], !a[1], !a[2], !a[3]]
}

#[inline(always)]
pub(crate) fn u32_shl<const N: i32>(a: U32R) -> U32R {
    [a[0] << N, a[1] << N, a[2] << N, a[3] << N]
}

/// Logical shift right (zero-filling)
#[inline(always)]
pub(crate) fn u32_shr<const N: i32>(a: U32R) -> U32R {
    [a[0] >> N, a[1] >> N, a[2] >> N, a[3] >> N]
}

#[inline(always)]
pub(crate) fn u32_cmp_eq(a: U32R, b: U32R) -> U32R {
    let lane = |x: u32, y: u32| if x == y { u32::MAX } else { 0 };
    [
        lane(a[0], b[0]),
        lane(a[1], b[1]),
        lane(a[2], b[2]),
        lane(a[3], b[3]),
    ]
}

#[inline(always)]
pub(crate) fn u32_select(mask: U32R, a: U32R, b: U32R) -> U32R {
    let blend = |m: u32, x: u32, y: u32| (x & m) | (y & !m);
    [
        blend(mask[0], a[0], b[0]),
        blend(mask[1], a[1], b[1]),
        blend(mask[2], a[2], b[2]),
        blend(mask[3], a[3], b[3]),
    ]
}

/// Sign bits of the four lanes packed into the low 4 bits
#[inline(always)]
pub(crate) fn mask_movemask(a: U32R) -> u32 {
    (a[0] >> 31) | ((a[1] >> 31) << 1) | ((a[2] >> 31) << 2) | ((a[3] >> 31) << 3)
}
