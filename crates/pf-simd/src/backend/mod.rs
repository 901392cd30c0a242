//! Architecture backends for the 4-lane vector types
//!
//! Exactly one backend is compiled per target:
//! - `sse` on x86-64 (SSE2 baseline, always available)
//! - `neon` on AArch64 (NEON always available)
//! - `fallback` everywhere else (plain 4-element arrays)
//!
//! Every backend exports the same function set over its own register types.
//! Results must match the fallback backend: float ops are exact IEEE-754
//! single precision, integer ops are bit-exact. Estimate instructions
//! (`f32_rcp_est`, `f32_rsqrt_est`) are the one exception; the refinement in
//! `math` brings them to the documented tolerance on every backend.

#[cfg(target_arch = "x86_64")]
mod sse;
#[cfg(target_arch = "x86_64")]
pub(crate) use sse::*;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
pub(crate) use neon::*;

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod fallback;
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub(crate) use fallback::*;

/// Human-readable name of the compiled backend
pub const fn backend_name() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        "SSE2"
    }
    #[cfg(target_arch = "aarch64")]
    {
        "NEON"
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        "Portable"
    }
}
