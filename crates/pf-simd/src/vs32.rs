//! 4-lane i32 and u32 vectors
//!
//! `Vu32` doubles as the lane-mask type: compares produce lanes of all-ones
//! or all-zeros, and `select` blends by bit.

use crate::backend;
use crate::vf32::Vf32;

/// Four i32 lanes. Arithmetic wraps.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Vs32(pub(crate) backend::S32R);

impl Vs32 {
    pub const LANES: usize = 4;

    #[inline(always)]
    pub fn splat(v: i32) -> Self {
        Self(backend::s32_splat(v))
    }

    #[inline(always)]
    pub fn new(a: i32, b: i32, c: i32, d: i32) -> Self {
        Self(backend::s32_from_array([a, b, c, d]))
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::splat(0)
    }

    #[inline(always)]
    pub fn from_array(a: [i32; 4]) -> Self {
        Self(backend::s32_from_array(a))
    }

    #[inline(always)]
    pub fn to_array(self) -> [i32; 4] {
        backend::s32_to_array(self.0)
    }

    #[inline(always)]
    pub fn min(self, other: Self) -> Self {
        Self(backend::s32_min(self.0, other.0))
    }

    #[inline(always)]
    pub fn max(self, other: Self) -> Self {
        Self(backend::s32_max(self.0, other.0))
    }

    /// Per-lane absolute value. Wraps at `i32::MIN` (stays `i32::MIN`),
    /// like `i32::wrapping_abs`.
    #[inline(always)]
    pub fn abs(self) -> Self {
        let m = self.shr_arith::<31>();
        (self ^ m) - m
    }

    /// Bitwise AND across the 4 lanes
    #[inline(always)]
    pub fn and_h(self) -> i32 {
        let a = self.to_array();
        a[0] & a[1] & a[2] & a[3]
    }

    /// Bitwise OR across the 4 lanes
    #[inline(always)]
    pub fn or_h(self) -> i32 {
        let a = self.to_array();
        a[0] | a[1] | a[2] | a[3]
    }

    /// Logical shift left by a compile-time amount
    #[inline(always)]
    pub fn shl<const N: i32>(self) -> Self {
        const { assert!(N >= 0 && N < 32) };
        Self(backend::s32_shl::<N>(self.0))
    }

    /// Arithmetic shift right by a compile-time amount (sign-propagating)
    #[inline(always)]
    pub fn shr_arith<const N: i32>(self) -> Self {
        const { assert!(N >= 0 && N < 32) };
        Self(backend::s32_shr::<N>(self.0))
    }

    #[inline(always)]
    pub fn eq(self, other: Self) -> Vu32 {
        Vu32(backend::s32_cmp_eq(self.0, other.0))
    }

    #[inline(always)]
    pub fn gt(self, other: Self) -> Vu32 {
        Vu32(backend::s32_cmp_gt(self.0, other.0))
    }

    #[inline(always)]
    pub fn lt(self, other: Self) -> Vu32 {
        other.gt(self)
    }

    /// Per-lane bit blend: where the mask lane is all-ones take `a`, else `b`
    #[inline(always)]
    pub fn select(mask: Vu32, a: Self, b: Self) -> Self {
        Self(backend::s32_select(mask.0, a.0, b.0))
    }

    #[inline(always)]
    pub fn extract<const POS: usize>(self) -> i32 {
        const { assert!(POS < 4) };
        self.to_array()[POS]
    }

    #[inline(always)]
    pub fn insert<const POS: usize>(self, v: i32) -> Self {
        const { assert!(POS < 4) };
        let mut a = self.to_array();
        a[POS] = v;
        Self::from_array(a)
    }

    /// Exact i32 -> f32 lane conversion
    #[inline(always)]
    pub fn conv_f32(self) -> Vf32 {
        Vf32(backend::s32_to_f32(self.0))
    }

    /// Bit reinterpretation to f32 lanes
    #[inline(always)]
    pub fn cast_f32(self) -> Vf32 {
        Vf32(backend::s32_cast_f32(self.0))
    }

    /// Bit reinterpretation to u32 lanes
    #[inline(always)]
    pub fn cast_u32(self) -> Vu32 {
        let a = self.to_array();
        Vu32::from_array([a[0] as u32, a[1] as u32, a[2] as u32, a[3] as u32])
    }
}

impl core::ops::Add for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(backend::s32_add(self.0, rhs.0))
    }
}

impl core::ops::Sub for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(backend::s32_sub(self.0, rhs.0))
    }
}

impl core::ops::Mul for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(backend::s32_mul(self.0, rhs.0))
    }
}

impl core::ops::BitAnd for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(backend::s32_and(self.0, rhs.0))
    }
}

impl core::ops::BitOr for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(backend::s32_or(self.0, rhs.0))
    }
}

impl core::ops::BitXor for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Self(backend::s32_xor(self.0, rhs.0))
    }
}

impl core::ops::Not for Vs32 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(backend::s32_not(self.0))
    }
}

impl core::ops::AddAssign for Vs32 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl core::ops::SubAssign for Vs32 {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Default for Vs32 {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Vs32 {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl core::fmt::Debug for Vs32 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let a = self.to_array();
        write!(f, "Vs32({}, {}, {}, {})", a[0], a[1], a[2], a[3])
    }
}

// ============================================================================
// Vu32
// ============================================================================

/// Four u32 lanes, also the comparison-mask type
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Vu32(pub(crate) backend::U32R);

impl Vu32 {
    pub const LANES: usize = 4;

    #[inline(always)]
    pub fn splat(v: u32) -> Self {
        Self(backend::u32_splat(v))
    }

    #[inline(always)]
    pub fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self(backend::u32_from_array([a, b, c, d]))
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::splat(0)
    }

    /// Mask with every lane all-ones
    #[inline(always)]
    pub fn all_set() -> Self {
        Self::splat(u32::MAX)
    }

    #[inline(always)]
    pub fn from_array(a: [u32; 4]) -> Self {
        Self(backend::u32_from_array(a))
    }

    #[inline(always)]
    pub fn to_array(self) -> [u32; 4] {
        backend::u32_to_array(self.0)
    }

    #[inline(always)]
    pub fn shl<const N: i32>(self) -> Self {
        const { assert!(N >= 0 && N < 32) };
        Self(backend::u32_shl::<N>(self.0))
    }

    /// Logical shift right (zero-filling)
    #[inline(always)]
    pub fn shr<const N: i32>(self) -> Self {
        const { assert!(N >= 0 && N < 32) };
        Self(backend::u32_shr::<N>(self.0))
    }

    #[inline(always)]
    pub fn eq(self, other: Self) -> Vu32 {
        Vu32(backend::u32_cmp_eq(self.0, other.0))
    }

    #[inline(always)]
    pub fn select(mask: Vu32, a: Self, b: Self) -> Self {
        Self(backend::u32_select(mask.0, a.0, b.0))
    }

    // ========================================================================
    // Mask queries
    // ========================================================================

    /// The 4 lane sign bits packed into bits 0..4
    #[inline(always)]
    pub fn movemask(self) -> u32 {
        backend::mask_movemask(self.0)
    }

    /// True if any lane has its sign bit set
    #[inline(always)]
    pub fn any(self) -> bool {
        self.movemask() != 0
    }

    /// True if all 4 lanes have their sign bit set
    #[inline(always)]
    pub fn all(self) -> bool {
        self.movemask() == 0b1111
    }

    /// Number of lanes with the sign bit set
    #[inline(always)]
    pub fn count_bits(self) -> u32 {
        self.movemask().count_ones()
    }

    /// Bitwise AND across the 4 lanes
    #[inline(always)]
    pub fn and_h(self) -> u32 {
        let a = self.to_array();
        a[0] & a[1] & a[2] & a[3]
    }

    /// Bitwise OR across the 4 lanes
    #[inline(always)]
    pub fn or_h(self) -> u32 {
        let a = self.to_array();
        a[0] | a[1] | a[2] | a[3]
    }

    /// Bit reinterpretation to i32 lanes
    #[inline(always)]
    pub fn cast_s32(self) -> Vs32 {
        let a = self.to_array();
        Vs32::from_array([a[0] as i32, a[1] as i32, a[2] as i32, a[3] as i32])
    }
}

impl core::ops::Add for Vu32 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(backend::u32_add(self.0, rhs.0))
    }
}

impl core::ops::Sub for Vu32 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(backend::u32_sub(self.0, rhs.0))
    }
}

impl core::ops::BitAnd for Vu32 {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(backend::u32_and(self.0, rhs.0))
    }
}

impl core::ops::BitOr for Vu32 {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(backend::u32_or(self.0, rhs.0))
    }
}

impl core::ops::BitXor for Vu32 {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        Self(backend::u32_xor(self.0, rhs.0))
    }
}

impl core::ops::Not for Vu32 {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(backend::u32_not(self.0))
    }
}

impl Default for Vu32 {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Vu32 {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

impl core::fmt::Debug for Vu32 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let a = self.to_array();
        write!(f, "Vu32({:#010x}, {:#010x}, {:#010x}, {:#010x})", a[0], a[1], a[2], a[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s32_arithmetic_wraps() {
        let a = Vs32::new(i32::MAX, 1, -5, 100);
        let b = Vs32::new(1, 1, 5, -100);
        assert_eq!((a + b).to_array(), [i32::MIN, 2, 0, 0]);
        assert_eq!((a - b).to_array(), [i32::MAX - 1, 0, -10, 200]);
        let m = Vs32::new(3, -2, 0x10000, i32::MIN);
        let n = Vs32::new(7, 3, 0x10000, -1);
        assert_eq!((m * n).to_array(), [21, -6, 0, i32::MIN]);
    }

    #[test]
    fn test_s32_min_max() {
        let a = Vs32::new(1, -5, 3, i32::MIN);
        let b = Vs32::new(-1, 5, 3, i32::MAX);
        assert_eq!(a.min(b).to_array(), [-1, -5, 3, i32::MIN]);
        assert_eq!(a.max(b).to_array(), [1, 5, 3, i32::MAX]);
    }

    #[test]
    fn test_shifts() {
        let a = Vs32::new(-8, 8, 1, i32::MIN);
        assert_eq!(a.shl::<1>().to_array(), [-16, 16, 2, 0]);
        assert_eq!(a.shr_arith::<2>().to_array(), [-2, 2, 0, i32::MIN >> 2]);
        let u = Vu32::new(0x8000_0000, 4, 1, u32::MAX);
        assert_eq!(u.shr::<31>().to_array(), [1, 0, 0, 1]);
        assert_eq!(u.shl::<1>().to_array(), [0, 8, 2, u32::MAX - 1]);
    }

    #[test]
    fn test_s32_abs_wraps_at_min() {
        let a = Vs32::new(-7, 7, 0, i32::MIN);
        assert_eq!(a.abs().to_array(), [7, 7, 0, i32::MIN]);
        assert_eq!(Vs32::splat(i32::MAX).abs().to_array(), [i32::MAX; 4]);
    }

    #[test]
    fn test_horizontal_and_or() {
        let a = Vs32::new(0b1111, 0b1110, 0b1101, 0b1011);
        assert_eq!(a.and_h(), 0b1000);
        assert_eq!(a.or_h(), 0b1111);
        assert_eq!(Vs32::splat(-1).and_h(), -1);

        let m = Vu32::new(u32::MAX, u32::MAX, u32::MAX, 0);
        assert_eq!(m.and_h(), 0);
        assert_eq!(m.or_h(), u32::MAX);
        assert_eq!(Vu32::all_set().and_h(), u32::MAX);
    }

    #[test]
    fn test_s32_compares() {
        let a = Vs32::new(1, 2, 3, -1);
        let b = Vs32::new(1, 3, 2, 1);
        assert_eq!(a.eq(b).to_array(), [u32::MAX, 0, 0, 0]);
        assert_eq!(a.gt(b).to_array(), [0, 0, u32::MAX, 0]);
        assert_eq!(a.lt(b).to_array(), [0, u32::MAX, 0, u32::MAX]);
    }

    #[test]
    fn test_mask_queries() {
        let m = Vu32::new(u32::MAX, 0, u32::MAX, 0);
        assert_eq!(m.movemask(), 0b0101);
        assert!(m.any());
        assert!(!m.all());
        assert_eq!(m.count_bits(), 2);
        assert!(Vu32::all_set().all());
        assert!(!Vu32::zero().any());
    }

    #[test]
    fn test_select() {
        let m = Vu32::new(u32::MAX, 0, u32::MAX, 0);
        let a = Vs32::splat(1);
        let b = Vs32::splat(2);
        assert_eq!(Vs32::select(m, a, b).to_array(), [1, 2, 1, 2]);
    }

    #[test]
    fn test_bitwise() {
        let a = Vu32::splat(0b1100);
        let b = Vu32::splat(0b1010);
        assert_eq!((a & b).to_array(), [0b1000; 4]);
        assert_eq!((a | b).to_array(), [0b1110; 4]);
        assert_eq!((a ^ b).to_array(), [0b0110; 4]);
        assert_eq!((!Vu32::zero()).to_array(), [u32::MAX; 4]);
    }
}
