//! Message cells and their payloads
//!
//! A `MsgCell` is the unit that moves between threads: a reusable payload
//! plus the handle of the return queue it was sent through. Cells are
//! allocated once at pool construction and recycled forever after, so the
//! audio thread never touches the allocator.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::mgr::RetQueue;

/// A payload that can be recycled in place
///
/// `clear` must drop the payload's logical content while keeping its
/// allocation, so a flushed cell re-enters the pool at full capacity.
pub trait Payload: Send + Default {
    fn clear(&mut self);
}

/// `Vec::clear` keeps capacity, which is exactly the recycling contract
impl<T: Send> Payload for Vec<T> {
    fn clear(&mut self) {
        self.clear();
    }
}

/// A pooled message cell
///
/// While a cell is in flight it carries an `Arc` to the return queue it was
/// enqueued with; that keeps the queue alive until every outstanding cell
/// has come home.
#[derive(Debug)]
pub struct MsgCell<P: Payload> {
    payload: P,
    ret: Option<Arc<RetQueue<P>>>,
}

impl<P: Payload> Default for MsgCell<P> {
    fn default() -> Self {
        Self {
            payload: P::default(),
            ret: None,
        }
    }
}

impl<P: Payload> MsgCell<P> {
    pub fn new(payload: P) -> Self {
        Self { payload, ret: None }
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    #[inline]
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub(crate) fn set_ret(&mut self, ret: Option<Arc<RetQueue<P>>>) {
        self.ret = ret;
    }

    /// Send the cell back on the return queue captured at enqueue time.
    ///
    /// A cell that was never enqueued has no return path and is simply
    /// dropped. A full return queue also drops the cell; that case is
    /// counted in the manager's `dropped_on_ret` statistic. Either way the
    /// call never blocks.
    pub fn ret(mut self) {
        let Some(rq) = self.ret.take() else {
            return;
        };
        if rq.queue.push(self).is_err() {
            rq.counters.dropped_on_ret.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_without_return_path_drops_quietly() {
        let cell: MsgCell<Vec<f32>> = MsgCell::new(vec![1.0, 2.0]);
        cell.ret();
    }

    #[test]
    fn test_cell_is_debug_formattable() {
        let cell: MsgCell<Vec<f32>> = MsgCell::new(vec![0.5]);
        let s = format!("{cell:?}");
        assert!(s.contains("MsgCell"));
    }

    #[test]
    fn test_vec_payload_clear_keeps_capacity() {
        let mut v: Vec<f32> = Vec::with_capacity(256);
        v.extend_from_slice(&[1.0; 64]);
        Payload::clear(&mut v);
        assert!(v.is_empty());
        assert!(v.capacity() >= 256);
    }
}
