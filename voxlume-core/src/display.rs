//! Producer-facing display handle
//!
//! [`Display`] owns the voxel store and the commit handshake. It is meant to
//! live in a `static` shared by the frame producer and the layer tick:
//!
//! ```ignore
//! static DISPLAY: Display<CriticalSectionRawMutex> = Display::new();
//!
//! DISPLAY.write_voxel(0, 0, 0, Color::RED);
//! DISPLAY.commit_frame();
//! ```
//!
//! Every access takes the store lock for the duration of one voxel, so the
//! tick is never held off for longer than that.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::color::Color;
use crate::store::{BufferRole, VoxelStore};
use crate::sync::FrameSync;

/// Double-buffered cube shared between producer and multiplexer
pub struct Display<M: RawMutex> {
    store: Mutex<M, RefCell<VoxelStore>>,
    sync: FrameSync<M>,
}

impl<M: RawMutex> Default for Display<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Display<M> {
    pub const fn new() -> Self {
        Self {
            store: Mutex::new(RefCell::new(VoxelStore::new())),
            sync: FrameSync::new(),
        }
    }

    /// Run `f` with exclusive access to the store
    pub fn with_store<R>(&self, f: impl FnOnce(&mut VoxelStore) -> R) -> R {
        self.store.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Commit handshake
    pub fn sync(&self) -> &FrameSync<M> {
        &self.sync
    }

    /// Write a voxel of the frame being drawn
    ///
    /// Coordinates outside the cube are ignored.
    pub fn write_voxel(&self, x: usize, y: usize, z: usize, color: Color) {
        self.with_store(|s| s.write(BufferRole::Rendering, x, y, z, color));
    }

    /// Read a voxel of the frame being shown
    pub fn read_displayed_voxel(&self, x: usize, y: usize, z: usize) -> Color {
        self.with_store(|s| s.read(BufferRole::Displayed, x, y, z))
    }

    /// Read a voxel of the frame being drawn
    pub fn read_rendering_voxel(&self, x: usize, y: usize, z: usize) -> Color {
        self.with_store(|s| s.read(BufferRole::Rendering, x, y, z))
    }

    /// Average `color` into a voxel of the frame being drawn
    pub fn merge_voxel(&self, x: usize, y: usize, z: usize, color: Color) {
        self.with_store(|s| s.merge(x, y, z, color));
    }

    /// Start the next frame from the one being shown
    pub fn copy_displayed(&self) {
        self.with_store(|s| s.copy_displayed());
    }

    /// Start the next frame from the one being shown, moved down a layer
    pub fn shift_down(&self) {
        self.with_store(|s| s.shift_down());
    }

    pub fn clear_rendering(&self) {
        self.with_store(|s| s.clear(BufferRole::Rendering));
    }

    pub fn fill_rendering(&self, color: Color) {
        self.with_store(|s| s.fill(BufferRole::Rendering, color));
    }

    /// Check if a committed frame is still waiting for the swap
    pub fn is_frame_pending(&self) -> bool {
        self.sync.is_pending()
    }

    /// Hand the drawn frame to the multiplexer
    ///
    /// Spins until the next layer-cycle boundary has swapped the buffers.
    /// On return the frame is displayed and the rendering buffer is black.
    pub fn commit_frame(&self) {
        self.sync.commit();
    }

    /// Hand the drawn frame to the multiplexer without spinning
    pub async fn commit_frame_async(&self) {
        self.sync.commit_async().await;
    }
}
