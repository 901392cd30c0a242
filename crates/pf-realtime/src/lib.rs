//! pf-realtime: lock-free cell recycling for PedalForge
//!
//! Control threads talk to the audio thread through pooled message cells:
//!
//! - [`CellPool`] pre-allocates every cell at startup
//! - [`QueueRetMgr`] routes cells through one forward queue and hands each
//!   consumer-side cell a return path
//! - [`MsgCell::ret`] sends a spent cell home; [`QueueRetMgr::flush_ret_queue`]
//!   recycles it into the pool with its payload cleared but its allocation
//!   kept
//!
//! Everything on the audio-thread side is wait-free polling on
//! `crossbeam::queue::ArrayQueue`; no allocation, no locks, no blocking.

pub mod cell;
pub mod error;
pub mod mgr;
pub mod pool;

pub use cell::{MsgCell, Payload};
pub use error::RtError;
pub use mgr::{QueueRetMgr, RetQueue, RtStats};
pub use pool::CellPool;
