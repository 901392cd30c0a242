//! Queue-return manager
//!
//! One forward queue carries cells from producers to the single consumer;
//! per-producer return queues carry them back for recycling. Enqueue,
//! dequeue, return and flush are all `ArrayQueue` operations: lock-free,
//! non-blocking, allocation-free. The only lock is the `parking_lot` mutex
//! around the return-queue registry, taken on create and kill.
//!
//! Lifetime safety hangs on the `Arc` in each in-flight cell: a return queue
//! cannot be killed while any cell still references it, and `kill_ret_queue`
//! reports that as an error instead of asserting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;

use crate::cell::{MsgCell, Payload};
use crate::error::RtError;
use crate::pool::CellPool;

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) enqueued: AtomicU64,
    pub(crate) dequeued: AtomicU64,
    pub(crate) dropped_on_ret: AtomicU64,
}

/// Snapshot of the manager's traffic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtStats {
    pub enqueued: u64,
    pub dequeued: u64,
    pub dropped_on_ret: u64,
}

/// Return path for recycled cells
///
/// Created through [`QueueRetMgr::create_new_ret_queue`]; consumers never
/// touch it directly, they call [`MsgCell::ret`] on the cells they are done
/// with.
#[derive(Debug)]
pub struct RetQueue<P: Payload> {
    pub(crate) queue: ArrayQueue<MsgCell<P>>,
    pub(crate) counters: Arc<Counters>,
}

impl<P: Payload> RetQueue<P> {
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Forward queue plus return-queue registry
pub struct QueueRetMgr<P: Payload> {
    forward: ArrayQueue<MsgCell<P>>,
    ret_queues: Mutex<Vec<Arc<RetQueue<P>>>>,
    counters: Arc<Counters>,
}

impl<P: Payload> QueueRetMgr<P> {
    pub fn new(forward_capacity: usize) -> Self {
        Self {
            forward: ArrayQueue::new(forward_capacity),
            ret_queues: Mutex::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Register a new return queue. Setup path, takes the registry lock.
    pub fn create_new_ret_queue(&self, capacity: usize) -> Arc<RetQueue<P>> {
        let rq = Arc::new(RetQueue {
            queue: ArrayQueue::new(capacity),
            counters: Arc::clone(&self.counters),
        });
        let mut queues = self.ret_queues.lock();
        queues.push(Arc::clone(&rq));
        log::debug!(
            "created return queue (capacity {capacity}, {} registered)",
            queues.len()
        );
        rq
    }

    /// Send a cell to the consumer, stamping it with its return path.
    ///
    /// A full forward queue hands the cell straight back to the caller, who
    /// keeps ownership and can retry or recycle it.
    pub fn enqueue(
        &self,
        mut cell: MsgCell<P>,
        ret: &Arc<RetQueue<P>>,
    ) -> Result<(), (RtError, MsgCell<P>)> {
        cell.set_ret(Some(Arc::clone(ret)));
        match self.forward.push(cell) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(mut cell) => {
                cell.set_ret(None);
                Err((RtError::ForwardQueueFull, cell))
            }
        }
    }

    /// Poll the forward queue; never blocks
    #[inline]
    pub fn dequeue(&self) -> Option<MsgCell<P>> {
        let cell = self.forward.pop()?;
        self.counters.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(cell)
    }

    /// Cells waiting in the forward queue
    pub fn pending(&self) -> usize {
        self.forward.len()
    }

    /// Drain a return queue back into the pool, clearing each payload.
    /// Returns how many cells were recycled.
    pub fn flush_ret_queue(&self, ret: &RetQueue<P>, pool: &CellPool<P>) -> usize {
        let mut recycled = 0;
        while let Some(mut cell) = ret.queue.pop() {
            cell.payload_mut().clear();
            cell.set_ret(None);
            pool.return_cell(cell);
            recycled += 1;
        }
        recycled
    }

    /// Unregister and drop a return queue.
    ///
    /// Fails without side effects if any in-flight cell (or other clone)
    /// still references the queue, if it still holds cells, or if it was
    /// never registered here.
    pub fn kill_ret_queue(&self, ret: Arc<RetQueue<P>>) -> Result<(), RtError> {
        let mut queues = self.ret_queues.lock();
        let pos = queues
            .iter()
            .position(|q| Arc::ptr_eq(q, &ret))
            .ok_or(RtError::UnknownRetQueue)?;
        // Registry holds one reference, the caller holds one; anything past
        // that is an in-flight cell or a stray clone. Checked before
        // emptiness: a returning cell pushes itself and then drops its
        // handle, so once the count is down to 2 nobody can still push and
        // the emptiness read below cannot be raced stale.
        if Arc::strong_count(&ret) > 2 {
            return Err(RtError::RetQueueBusy);
        }
        if !ret.queue.is_empty() {
            return Err(RtError::RetQueueNotEmpty);
        }
        queues.swap_remove(pos);
        log::debug!("killed return queue ({} registered)", queues.len());
        Ok(())
    }

    pub fn stats(&self) -> RtStats {
        RtStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dequeued: self.counters.dequeued.load(Ordering::Relaxed),
            dropped_on_ret: self.counters.dropped_on_ret.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Mgr = QueueRetMgr<Vec<u32>>;

    #[test]
    fn test_forward_queue_is_fifo() {
        let mgr = Mgr::new(64);
        let pool: CellPool<Vec<u32>> = CellPool::new(64);
        let rq = mgr.create_new_ret_queue(64);

        for i in 0..32u32 {
            let mut cell = pool.take_cell().unwrap();
            cell.payload_mut().push(i);
            mgr.enqueue(cell, &rq).map_err(|(e, _)| e).unwrap();
        }
        for i in 0..32u32 {
            let cell = mgr.dequeue().unwrap();
            assert_eq!(cell.payload().as_slice(), &[i]);
            cell.ret();
        }
        assert!(mgr.dequeue().is_none());
        assert_eq!(mgr.flush_ret_queue(&rq, &pool), 32);
        assert_eq!(pool.available(), 64);
    }

    #[test]
    fn test_enqueue_full_returns_cell() {
        let mgr = Mgr::new(1);
        let pool: CellPool<Vec<u32>> = CellPool::new(2);
        let rq = mgr.create_new_ret_queue(2);

        let first = pool.take_cell().unwrap();
        assert!(mgr.enqueue(first, &rq).is_ok());

        let mut second = pool.take_cell().unwrap();
        second.payload_mut().push(7);
        let (err, cell) = mgr.enqueue(second, &rq).unwrap_err();
        assert_eq!(err, RtError::ForwardQueueFull);
        // Ownership came back with the payload intact
        assert_eq!(cell.payload().as_slice(), &[7]);
        pool.return_cell(cell);
    }

    #[test]
    fn test_flush_clears_payloads() {
        let mgr = Mgr::new(8);
        let pool: CellPool<Vec<u32>> = CellPool::new(8);
        let rq = mgr.create_new_ret_queue(8);

        let mut cell = pool.take_cell().unwrap();
        cell.payload_mut().extend_from_slice(&[1, 2, 3]);
        mgr.enqueue(cell, &rq).map_err(|(e, _)| e).unwrap();
        mgr.dequeue().unwrap().ret();

        assert_eq!(mgr.flush_ret_queue(&rq, &pool), 1);
        let cell = pool.take_cell().unwrap();
        assert!(cell.payload().is_empty());
    }

    #[test]
    fn test_kill_rejects_non_empty_queue() {
        let mgr = Mgr::new(8);
        let pool: CellPool<Vec<u32>> = CellPool::new(8);
        let rq = mgr.create_new_ret_queue(8);

        mgr.enqueue(pool.take_cell().unwrap(), &rq)
            .map_err(|(e, _)| e)
            .unwrap();
        mgr.dequeue().unwrap().ret();

        assert_eq!(
            mgr.kill_ret_queue(Arc::clone(&rq)),
            Err(RtError::RetQueueNotEmpty)
        );
        mgr.flush_ret_queue(&rq, &pool);
        assert!(mgr.kill_ret_queue(rq).is_ok());
    }

    #[test]
    fn test_kill_rejects_queue_with_cells_in_flight() {
        let mgr = Mgr::new(8);
        let pool: CellPool<Vec<u32>> = CellPool::new(8);
        let rq = mgr.create_new_ret_queue(8);

        // Cell sits in the forward queue holding its return handle
        mgr.enqueue(pool.take_cell().unwrap(), &rq)
            .map_err(|(e, _)| e)
            .unwrap();
        assert_eq!(
            mgr.kill_ret_queue(Arc::clone(&rq)),
            Err(RtError::RetQueueBusy)
        );

        mgr.dequeue().unwrap().ret();
        mgr.flush_ret_queue(&rq, &pool);
        assert!(mgr.kill_ret_queue(rq).is_ok());
    }

    #[test]
    fn test_kill_checks_holders_before_contents() {
        // While any holder remains it could still push, so the holder check
        // must win over the emptiness check.
        let mgr = Mgr::new(8);
        let pool: CellPool<Vec<u32>> = CellPool::new(8);
        let rq = mgr.create_new_ret_queue(8);

        for _ in 0..2 {
            mgr.enqueue(pool.take_cell().unwrap(), &rq)
                .map_err(|(e, _)| e)
                .unwrap();
        }
        // One cell back home, one still in flight with its handle
        mgr.dequeue().unwrap().ret();
        assert_eq!(
            mgr.kill_ret_queue(Arc::clone(&rq)),
            Err(RtError::RetQueueBusy)
        );

        // Last holder gone, contents now the blocker
        mgr.dequeue().unwrap().ret();
        assert_eq!(
            mgr.kill_ret_queue(Arc::clone(&rq)),
            Err(RtError::RetQueueNotEmpty)
        );

        mgr.flush_ret_queue(&rq, &pool);
        assert!(mgr.kill_ret_queue(rq).is_ok());
    }

    #[test]
    fn test_kill_rejects_unknown_queue() {
        let mgr_a = Mgr::new(4);
        let mgr_b = Mgr::new(4);
        let rq = mgr_a.create_new_ret_queue(4);
        assert_eq!(mgr_b.kill_ret_queue(rq), Err(RtError::UnknownRetQueue));
    }

    #[test]
    fn test_dropped_on_ret_is_counted() {
        let mgr = Mgr::new(8);
        let pool: CellPool<Vec<u32>> = CellPool::new(8);
        // Return queue too small for the traffic
        let rq = mgr.create_new_ret_queue(1);

        for _ in 0..3 {
            mgr.enqueue(pool.take_cell().unwrap(), &rq)
                .map_err(|(e, _)| e)
                .unwrap();
        }
        for _ in 0..3 {
            mgr.dequeue().unwrap().ret();
        }
        // One fits, two dropped
        let stats = mgr.stats();
        assert_eq!(stats.enqueued, 3);
        assert_eq!(stats.dequeued, 3);
        assert_eq!(stats.dropped_on_ret, 2);
        assert_eq!(rq.len(), 1);
    }
}
