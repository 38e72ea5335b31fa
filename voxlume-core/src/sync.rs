//! Frame commit handshake
//!
//! A single-slot rendezvous between the frame producer and the layer tick.
//! The producer is the only writer that sets the ready flag and the tick is
//! the only writer that clears it. The tick clears the flag after the swap,
//! so a producer that sees the flag clear also sees the new buffer roles.

use core::hint::spin_loop;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};

/// Ready flag plus a completion signal for async producers
pub struct FrameSync<M: RawMutex> {
    ready: AtomicBool,
    swapped: Signal<M, ()>,
}

impl<M: RawMutex> Default for FrameSync<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> FrameSync<M> {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            swapped: Signal::new(),
        }
    }

    /// Mark the rendering buffer as complete (producer side)
    pub fn request(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Check if a completed frame is waiting for the swap
    pub fn is_pending(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Acknowledge the swap (tick side)
    pub fn complete(&self) {
        self.ready.store(false, Ordering::Release);
        self.swapped.signal(());
    }

    /// Request a swap and spin until the tick has performed it
    ///
    /// Blocks forever if the tick is not running.
    pub fn commit(&self) {
        self.request();
        while self.is_pending() {
            spin_loop();
        }
    }

    /// Request a swap and wait for it without spinning
    pub async fn commit_async(&self) {
        self.swapped.reset();
        self.request();
        self.swapped.wait().await;
    }
}
