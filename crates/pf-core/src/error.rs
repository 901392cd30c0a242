//! Error types for PedalForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum PfError {
    #[error("DSP error: {0}")]
    Dsp(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Block length {0} exceeds configured maximum {1}")]
    BlockTooLong(usize, usize),

    #[error("Buffer underrun")]
    BufferUnderrun,

    #[error("Buffer overrun")]
    BufferOverrun,
}

/// Result type alias
pub type PfResult<T> = Result<T, PfError>;
