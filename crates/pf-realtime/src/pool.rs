//! Fixed-capacity cell pool
//!
//! All cells a manager will ever route are created here, up front. Take and
//! return are single `ArrayQueue` operations, lock-free and allocation-free.

use crossbeam::queue::ArrayQueue;

use crate::cell::{MsgCell, Payload};

/// Pre-allocated pool of message cells
pub struct CellPool<P: Payload> {
    cells: ArrayQueue<MsgCell<P>>,
    capacity: usize,
}

impl<P: Payload> CellPool<P> {
    /// Build a pool holding `capacity` default-payload cells
    pub fn new(capacity: usize) -> Self {
        let cells = ArrayQueue::new(capacity);
        for _ in 0..capacity {
            // Freshly sized queue cannot be full here
            let _ = cells.push(MsgCell::default());
        }
        Self { cells, capacity }
    }

    /// Take a free cell; `None` means the pool is exhausted right now.
    ///
    /// Exhaustion is an expected overload condition, not a fault. The caller
    /// skips the message and retries later, once cells have been flushed
    /// back.
    #[inline]
    pub fn take_cell(&self) -> Option<MsgCell<P>> {
        self.cells.pop()
    }

    /// Put a cell back. A cell pushed into an already-full pool did not come
    /// from it and is dropped.
    #[inline]
    pub fn return_cell(&self, cell: MsgCell<P>) {
        let _ = self.cells.push(cell);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cells currently sitting in the pool
    pub fn available(&self) -> usize {
        self.cells.len()
    }
}
