//! Real-time layer errors

use thiserror::Error;

/// Errors from the queue-return manager
///
/// Every variant is recoverable; hot-path callers get their cell handed back
/// alongside the error instead of losing it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RtError {
    #[error("forward queue full")]
    ForwardQueueFull,

    #[error("return queue still holds cells")]
    RetQueueNotEmpty,

    #[error("return queue handle still held elsewhere")]
    RetQueueBusy,

    #[error("return queue not registered with this manager")]
    UnknownRetQueue,
}
