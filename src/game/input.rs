//! Per-seat pending action flags shared between connection handlers and the
//! tick loop

use std::sync::atomic::{AtomicBool, Ordering};

use super::state::Seat;

/// One "action pending" flag per seat.
///
/// Presses collapse: any number of presses between two ticks yield a single
/// action. The tick consumes a flag with [`InputBuffer::take`], which reads
/// and clears it in one atomic step.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pending: [AtomicBool; 2],
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an action as pending for the seat
    pub fn press(&self, seat: Seat) {
        self.pending[seat.index()].store(true, Ordering::Release);
    }

    /// Read and clear the seat's flag
    pub fn take(&self, seat: Seat) -> bool {
        self.pending[seat.index()].swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming
    #[cfg(test)]
    pub fn is_pending(&self, seat: Seat) -> bool {
        self.pending[seat.index()].load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        for flag in &self.pending {
            flag.store(false, Ordering::Release);
        }
    }
}
