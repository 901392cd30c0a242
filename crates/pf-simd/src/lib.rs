//! pf-simd: 4-lane SIMD vector primitive for PedalForge
//!
//! Provides:
//! - `Vf32` / `Vs32` / `Vu32`: 4-lane vectors with 16-byte value semantics
//! - Compile-time backend selection (SSE2 / NEON / portable array)
//! - `MemoryAccess` alignment policy for raw-buffer kernels
//! - `math`: deterministic approximate transcendentals and the inverse table
//! - Denormal control (MXCSR flush-to-zero on x86-64)
//!
//! Everything except the documented estimate refinements is bit-identical
//! across backends, so filter state evolves the same way on the pedal
//! hardware and on development machines.

mod backend;
pub mod math;
mod mem;
mod vf32;
mod vs32;

pub use backend::backend_name;
pub use mem::{Aligned, MemoryAccess, Unaligned};
pub use vf32::Vf32;
pub use vs32::{Vs32, Vu32};

/// Enable flush-to-zero and denormals-are-zero for this thread.
///
/// On x86-64 this sets the MXCSR FTZ and DAZ bits so IIR tails never hit the
/// denormal microcode path. AArch64 runs with FTZ by default for NEON and the
/// portable backend relies on `DenormStop`-style dithering; both are no-ops
/// here.
pub fn set_flush_to_zero() {
    #[cfg(target_arch = "x86_64")]
    {
        #[allow(deprecated)]
        unsafe {
            use core::arch::x86_64::{_mm_getcsr, _mm_setcsr};
            _mm_setcsr(_mm_getcsr() | MXCSR_FTZ_DAZ);
        }
    }
}

/// Whether flush-to-zero is active for this thread
pub fn flush_to_zero_enabled() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        #[allow(deprecated)]
        unsafe {
            use core::arch::x86_64::_mm_getcsr;
            (_mm_getcsr() & MXCSR_FTZ_DAZ) == MXCSR_FTZ_DAZ
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

// FTZ (bit 15) + DAZ (bit 6)
#[cfg(target_arch = "x86_64")]
const MXCSR_FTZ_DAZ: u32 = 0x8040;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_nonempty() {
        assert!(!backend_name().is_empty());
    }

    #[test]
    fn test_flush_to_zero() {
        set_flush_to_zero();
        if cfg!(target_arch = "x86_64") {
            assert!(flush_to_zero_enabled());
        }
    }
}
