//! Alignment policy for raw-buffer vector access
//!
//! Filter kernels that walk raw f32 buffers are generic over `MemoryAccess`
//! and get monomorphized into an aligned and an unaligned variant with no
//! runtime branching. On x86-64 the aligned path uses `movaps`; on other
//! targets the two paths compile to the same code and the policy only keeps
//! the debug-time alignment checking.

use crate::Vf32;

/// Load/store policy over raw f32 pointers
pub trait MemoryAccess {
    /// # Safety
    /// `ptr` must be valid for reading 4 floats and satisfy `check_ptr`.
    unsafe fn load(ptr: *const f32) -> Vf32;

    /// # Safety
    /// `ptr` must be valid for writing 4 floats and satisfy `check_ptr`.
    unsafe fn store(ptr: *mut f32, v: Vf32);

    /// Whether `ptr` satisfies this policy's precondition
    fn check_ptr(ptr: *const f32) -> bool;
}

/// 16-byte aligned access
pub struct Aligned;

/// Arbitrary-alignment access
pub struct Unaligned;

impl MemoryAccess for Aligned {
    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Vf32 {
        debug_assert!(Self::check_ptr(ptr));
        unsafe { Vf32::load(ptr) }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, v: Vf32) {
        debug_assert!(Self::check_ptr(ptr));
        unsafe { v.store(ptr) }
    }

    #[inline(always)]
    fn check_ptr(ptr: *const f32) -> bool {
        !ptr.is_null() && (ptr as usize) % 16 == 0
    }
}

impl MemoryAccess for Unaligned {
    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Vf32 {
        debug_assert!(Self::check_ptr(ptr));
        unsafe { Vf32::load_unaligned(ptr) }
    }

    #[inline(always)]
    unsafe fn store(ptr: *mut f32, v: Vf32) {
        debug_assert!(Self::check_ptr(ptr));
        unsafe { v.store_unaligned(ptr) }
    }

    #[inline(always)]
    fn check_ptr(ptr: *const f32) -> bool {
        !ptr.is_null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 16-byte aligned backing storage for the aligned-path tests
    #[repr(align(16))]
    struct AlignedBuf([f32; 8]);

    #[test]
    fn test_aligned_check() {
        let buf = AlignedBuf([0.0; 8]);
        let p = buf.0.as_ptr();
        assert!(Aligned::check_ptr(p));
        assert!(!Aligned::check_ptr(unsafe { p.add(1) }));
        assert!(Unaligned::check_ptr(unsafe { p.add(1) }));
        assert!(!Unaligned::check_ptr(core::ptr::null()));
    }

    #[test]
    fn test_policies_agree_on_aligned_buffer() {
        let mut buf = AlignedBuf([1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        let p = buf.0.as_ptr();
        let a = unsafe { Aligned::load(p) };
        let u = unsafe { Unaligned::load(p) };
        assert_eq!(a, u);
        unsafe { Aligned::store(buf.0.as_mut_ptr().add(4), a) };
        assert_eq!(buf.0[4..8], [1.0, 2.0, 3.0, 4.0]);
        unsafe { Unaligned::store(buf.0.as_mut_ptr().add(4), u + u) };
        assert_eq!(buf.0[4..8], [2.0, 4.0, 6.0, 8.0]);
    }

    fn sum_with<A: MemoryAccess>(buf: &[f32]) -> f32 {
        let mut acc = Vf32::zero();
        for chunk in buf.chunks_exact(4) {
            acc += unsafe { A::load(chunk.as_ptr()) };
        }
        acc.sum_h()
    }

    #[test]
    fn test_generic_kernel_monomorphization() {
        let buf = AlignedBuf([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(sum_with::<Aligned>(&buf.0), 36.0);
        assert_eq!(sum_with::<Unaligned>(&buf.0), 36.0);
    }
}
