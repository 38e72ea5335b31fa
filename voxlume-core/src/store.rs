//! Double-buffered voxel store
//!
//! Two full cube grids exist for the lifetime of the driver. One is the
//! displayed buffer, read by the layer encoder; the other is the rendering
//! buffer, written by the frame producer. A swap exchanges the roles and
//! wipes the new rendering buffer so every frame starts from black.
//!
//! Coordinates outside the cube are clipped: writes are ignored and reads
//! return black. No other voxel is ever touched by an out-of-range access.

use crate::color::Color;

/// Voxels along the x axis
pub const WIDTH: usize = 9;
/// Voxels along the y axis (number of multiplexed layers)
pub const HEIGHT: usize = 9;
/// Voxels along the z axis
pub const DEPTH: usize = 9;

type Grid = [[[Color; DEPTH]; HEIGHT]; WIDTH];

const BLACK_GRID: Grid = [[[Color::BLACK; DEPTH]; HEIGHT]; WIDTH];

/// Which of the two buffers an access targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferRole {
    /// Frame currently being shown
    Displayed,
    /// Frame currently being drawn
    Rendering,
}

/// Two W×H×D color grids with a displayed/rendering role assignment
#[derive(Clone)]
pub struct VoxelStore {
    grids: [Grid; 2],
    displayed: usize,
}

impl Default for VoxelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelStore {
    /// Create a store with both buffers black
    pub const fn new() -> Self {
        Self {
            grids: [BLACK_GRID; 2],
            displayed: 0,
        }
    }

    /// Check if a coordinate lies inside the cube
    #[inline]
    pub const fn contains(x: usize, y: usize, z: usize) -> bool {
        x < WIDTH && y < HEIGHT && z < DEPTH
    }

    /// Index of the displayed buffer
    pub fn displayed_index(&self) -> usize {
        self.displayed
    }

    /// Index of the rendering buffer
    pub fn rendering_index(&self) -> usize {
        1 - self.displayed
    }

    #[inline]
    fn index(&self, role: BufferRole) -> usize {
        match role {
            BufferRole::Displayed => self.displayed_index(),
            BufferRole::Rendering => self.rendering_index(),
        }
    }

    /// Store a color (ignored outside the cube)
    #[inline]
    pub fn write(&mut self, role: BufferRole, x: usize, y: usize, z: usize, color: Color) {
        if !Self::contains(x, y, z) {
            return;
        }
        let i = self.index(role);
        self.grids[i][x][y][z] = color;
    }

    /// Load a color (black outside the cube)
    #[inline]
    pub fn read(&self, role: BufferRole, x: usize, y: usize, z: usize) -> Color {
        if !Self::contains(x, y, z) {
            return Color::BLACK;
        }
        self.grids[self.index(role)][x][y][z]
    }

    /// Exchange the buffer roles and wipe the new rendering buffer
    ///
    /// Only the layer tick calls this, with the producer excluded.
    pub fn swap(&mut self) {
        self.displayed = 1 - self.displayed;
        let rendering = self.rendering_index();
        self.grids[rendering] = BLACK_GRID;
    }

    /// Set every voxel of a buffer to `color`
    pub fn fill(&mut self, role: BufferRole, color: Color) {
        let i = self.index(role);
        for plane in self.grids[i].iter_mut() {
            for row in plane.iter_mut() {
                row.fill(color);
            }
        }
    }

    /// Set every voxel of a buffer to black
    pub fn clear(&mut self, role: BufferRole) {
        self.fill(role, Color::BLACK);
    }

    /// Copy the displayed frame into the rendering buffer
    pub fn copy_displayed(&mut self) {
        let displayed = self.grids[self.displayed];
        self.grids[self.rendering_index()] = displayed;
    }

    /// Render the displayed frame moved down by one layer
    ///
    /// The bottom layer of the displayed frame falls out and the top layer of
    /// the rendering buffer becomes black.
    pub fn shift_down(&mut self) {
        let (displayed, rendering) = (self.displayed, self.rendering_index());
        for x in 0..WIDTH {
            for z in 0..DEPTH {
                for y in 1..HEIGHT {
                    self.grids[rendering][x][y - 1][z] = self.grids[displayed][x][y][z];
                }
                self.grids[rendering][x][HEIGHT - 1][z] = Color::BLACK;
            }
        }
    }

    /// Average `color` into the rendering buffer
    pub fn merge(&mut self, x: usize, y: usize, z: usize, color: Color) {
        let current = self.read(BufferRole::Rendering, x, y, z);
        self.write(BufferRole::Rendering, x, y, z, current.average(color));
    }
}

impl core::fmt::Debug for VoxelStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VoxelStore")
            .field("displayed", &self.displayed)
            .finish_non_exhaustive()
    }
}
