//! 4-lane f32 vector

use crate::backend;
use crate::vs32::{Vs32, Vu32};

/// Four f32 lanes with 16-byte value semantics.
///
/// Lane order is little-endian memory order: lane 0 is the lowest address on
/// load/store. All arithmetic is plain IEEE-754 single precision and produces
/// identical results on every backend.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Vf32(pub(crate) backend::F32R);

impl Vf32 {
    pub const LANES: usize = 4;

    // ========================================================================
    // Constructors
    // ========================================================================

    #[inline(always)]
    pub fn splat(v: f32) -> Self {
        Self(backend::f32_splat(v))
    }

    #[inline(always)]
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self(backend::f32_from_array([a, b, c, d]))
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::splat(0.0)
    }

    #[inline(always)]
    pub fn from_array(a: [f32; 4]) -> Self {
        Self(backend::f32_from_array(a))
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; 4] {
        backend::f32_to_array(self.0)
    }

    /// Loads the first 4 values of `src`. Panics if `src.len() < 4`.
    #[inline(always)]
    pub fn from_slice(src: &[f32]) -> Self {
        assert!(src.len() >= 4);
        unsafe { Self(backend::f32_load_u(src.as_ptr())) }
    }

    /// Writes the 4 lanes into the start of `dst`. Panics if `dst.len() < 4`.
    #[inline(always)]
    pub fn write_to(self, dst: &mut [f32]) {
        assert!(dst.len() >= 4);
        unsafe { backend::f32_store_u(dst.as_mut_ptr(), self.0) }
    }

    /// Writes the first `n` lanes (n <= 4) into `dst`. Panics on short `dst`.
    #[inline]
    pub fn store_partial(self, dst: &mut [f32], n: usize) {
        assert!(n <= 4 && dst.len() >= n);
        let a = self.to_array();
        dst[..n].copy_from_slice(&a[..n]);
    }

    /// Aligned load.
    ///
    /// # Safety
    /// `ptr` must be 16-byte aligned and valid for reading 4 floats.
    #[inline(always)]
    pub unsafe fn load(ptr: *const f32) -> Self {
        debug_assert!(ptr as usize % 16 == 0);
        unsafe { Self(backend::f32_load(ptr)) }
    }

    /// Unaligned load.
    ///
    /// # Safety
    /// `ptr` must be valid for reading 4 floats.
    #[inline(always)]
    pub unsafe fn load_unaligned(ptr: *const f32) -> Self {
        unsafe { Self(backend::f32_load_u(ptr)) }
    }

    /// Aligned store.
    ///
    /// # Safety
    /// `ptr` must be 16-byte aligned and valid for writing 4 floats.
    #[inline(always)]
    pub unsafe fn store(self, ptr: *mut f32) {
        debug_assert!(ptr as usize % 16 == 0);
        unsafe { backend::f32_store(ptr, self.0) }
    }

    /// Unaligned store.
    ///
    /// # Safety
    /// `ptr` must be valid for writing 4 floats.
    #[inline(always)]
    pub unsafe fn store_unaligned(self, ptr: *mut f32) {
        unsafe { backend::f32_store_u(ptr, self.0) }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    #[inline(always)]
    pub fn abs(self) -> Self {
        Self(backend::f32_abs(self.0))
    }

    #[inline(always)]
    pub fn min(self, other: Self) -> Self {
        Self(backend::f32_min(self.0, other.0))
    }

    #[inline(always)]
    pub fn max(self, other: Self) -> Self {
        Self(backend::f32_max(self.0, other.0))
    }

    #[inline(always)]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    /// `self * b + c`. Kept unfused on every backend so results are
    /// bit-identical across architectures.
    #[inline(always)]
    pub fn mul_add(self, b: Self, c: Self) -> Self {
        Self(backend::f32_add(backend::f32_mul(self.0, b.0), c.0))
    }

    #[inline(always)]
    pub fn sqrt(self) -> Self {
        Self(backend::f32_sqrt(self.0))
    }

    // ========================================================================
    // Compares and selection
    // ========================================================================

    #[inline(always)]
    pub fn eq(self, other: Self) -> Vu32 {
        Vu32(backend::f32_cmp_eq(self.0, other.0))
    }

    #[inline(always)]
    pub fn lt(self, other: Self) -> Vu32 {
        Vu32(backend::f32_cmp_lt(self.0, other.0))
    }

    #[inline(always)]
    pub fn le(self, other: Self) -> Vu32 {
        Vu32(backend::f32_cmp_le(self.0, other.0))
    }

    #[inline(always)]
    pub fn gt(self, other: Self) -> Vu32 {
        Vu32(backend::f32_cmp_gt(self.0, other.0))
    }

    #[inline(always)]
    pub fn ge(self, other: Self) -> Vu32 {
        Vu32(backend::f32_cmp_ge(self.0, other.0))
    }

    /// Per-lane bit blend: where the mask lane is all-ones take `a`, else `b`
    #[inline(always)]
    pub fn select(mask: Vu32, a: Self, b: Self) -> Self {
        Self(backend::f32_select(mask.0, a.0, b.0))
    }

    // ========================================================================
    // Horizontal reductions
    // ========================================================================

    #[inline(always)]
    pub fn sum_h(self) -> f32 {
        backend::f32_sum_h(self.0)
    }

    #[inline(always)]
    pub fn min_h(self) -> f32 {
        backend::f32_min_h(self.0)
    }

    #[inline(always)]
    pub fn max_h(self) -> f32 {
        backend::f32_max_h(self.0)
    }

    /// The 4 lane sign bits packed into bits 0..4
    #[inline(always)]
    pub fn movemask(self) -> u32 {
        backend::f32_movemask(self.0)
    }

    // ========================================================================
    // Lane shuffles
    //
    // Written over lane arrays; the optimizer lowers these to single shuffle
    // instructions on the intrinsic backends.
    // ========================================================================

    /// [d, c, b, a]
    #[inline(always)]
    pub fn reverse(self) -> Self {
        let a = self.to_array();
        Self::from_array([a[3], a[2], a[1], a[0]])
    }

    /// Lanes move down by N positions, wrapping: out[i] = in[(i + N) % 4]
    #[inline(always)]
    pub fn rotate<const N: usize>(self) -> Self {
        const { assert!(N < 4) };
        let a = self.to_array();
        Self::from_array([a[N % 4], a[(N + 1) % 4], a[(N + 2) % 4], a[(N + 3) % 4]])
    }

    #[inline(always)]
    pub fn extract<const POS: usize>(self) -> f32 {
        const { assert!(POS < 4) };
        self.to_array()[POS]
    }

    #[inline(always)]
    pub fn insert<const POS: usize>(self, v: f32) -> Self {
        const { assert!(POS < 4) };
        let mut a = self.to_array();
        a[POS] = v;
        Self::from_array(a)
    }

    /// Broadcast lane POS into all 4 lanes
    #[inline(always)]
    pub fn spread<const POS: usize>(self) -> Self {
        const { assert!(POS < 4) };
        Self::splat(self.to_array()[POS])
    }

    /// 4-lane window starting at POS over the 8-lane concatenation
    /// [self, other]: out[i] = concat[POS + i]. POS in 0..=4.
    #[inline(always)]
    pub fn compose<const POS: usize>(self, other: Self) -> Self {
        const { assert!(POS <= 4) };
        let lo = self.to_array();
        let hi = other.to_array();
        let pick = |i: usize| if i < 4 { lo[i] } else { hi[i - 4] };
        Self::from_array([pick(POS), pick(POS + 1), pick(POS + 2), pick(POS + 3)])
    }

    /// [a0, b0, a1, b1]
    #[inline(always)]
    pub fn interleave_lo(self, other: Self) -> Self {
        let a = self.to_array();
        let b = other.to_array();
        Self::from_array([a[0], b[0], a[1], b[1]])
    }

    /// [a2, b2, a3, b3]
    #[inline(always)]
    pub fn interleave_hi(self, other: Self) -> Self {
        let a = self.to_array();
        let b = other.to_array();
        Self::from_array([a[2], b[2], a[3], b[3]])
    }

    /// Split interleaved pairs back out: ([a0,a2,b0,b2], [a1,a3,b1,b3])
    #[inline(always)]
    pub fn deinterleave(self, other: Self) -> (Self, Self) {
        let a = self.to_array();
        let b = other.to_array();
        (
            Self::from_array([a[0], a[2], b[0], b[2]]),
            Self::from_array([a[1], a[3], b[1], b[3]]),
        )
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Bit reinterpretation to i32 lanes
    #[inline(always)]
    pub fn cast_s32(self) -> Vs32 {
        Vs32(backend::f32_cast_s32(self.0))
    }

    /// Round to nearest (ties to even), convert to i32 lanes.
    /// Defined for |x| < 2^31 only.
    #[inline(always)]
    pub fn conv_s32(self) -> Vs32 {
        Vs32(backend::f32_round_s32(self.0))
    }

    /// Truncate toward zero, convert to i32 lanes. Defined for |x| < 2^31.
    #[inline(always)]
    pub fn trunc_s32(self) -> Vs32 {
        Vs32(backend::f32_trunc_s32(self.0))
    }

    /// Round to nearest integer (ties to even), result as f32.
    /// Defined for |x| < 2^31 only.
    #[inline(always)]
    pub fn round(self) -> Self {
        Self(backend::s32_to_f32(backend::f32_round_s32(self.0)))
    }

    /// Round toward negative infinity. Defined for |x| < 2^31 only.
    #[inline(always)]
    pub fn floor(self) -> Self {
        let t = Self(backend::s32_to_f32(backend::f32_trunc_s32(self.0)));
        let too_big = t.gt(self);
        Self::select(too_big, t - Self::splat(1.0), t)
    }
}

// ============================================================================
// Operators
// ============================================================================

impl core::ops::Add for Vf32 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(backend::f32_add(self.0, rhs.0))
    }
}

impl core::ops::Sub for Vf32 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(backend::f32_sub(self.0, rhs.0))
    }
}

impl core::ops::Mul for Vf32 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(backend::f32_mul(self.0, rhs.0))
    }
}

impl core::ops::Div for Vf32 {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        Self(backend::f32_div(self.0, rhs.0))
    }
}

impl core::ops::Neg for Vf32 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self(backend::f32_neg(self.0))
    }
}

impl core::ops::AddAssign for Vf32 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl core::ops::SubAssign for Vf32 {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl core::ops::MulAssign for Vf32 {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Default for Vf32 {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Vf32 {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl core::fmt::Debug for Vf32 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let a = self.to_array();
        write!(f, "Vf32({}, {}, {}, {})", a[0], a[1], a[2], a[3])
    }
}

impl From<[f32; 4]> for Vf32 {
    #[inline(always)]
    fn from(a: [f32; 4]) -> Self {
        Self::from_array(a)
    }
}

impl From<Vf32> for [f32; 4] {
    #[inline(always)]
    fn from(v: Vf32) -> Self {
        v.to_array()
    }
}
