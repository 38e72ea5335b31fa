//! Voxel colors

use voxlume_protocol::GS_MAX;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 12-bit-per-primary RGB color
///
/// Each primary is a grayscale value in `0..=4095`. Black is all zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

const fn saturate(v: u16) -> u16 {
    if v > GS_MAX {
        GS_MAX
    } else {
        v
    }
}

const fn mean(a: u16, b: u16) -> u16 {
    ((a as u32 + b as u32) >> 1) as u16
}

impl Color {
    /// Full-scale intensity of one primary
    pub const MAX: u16 = GS_MAX;

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xFFF, 0xFFF, 0xFFF);
    pub const RED: Self = Self::new(0xFFF, 0, 0);
    pub const GREEN: Self = Self::new(0, 0xFFF, 0);
    pub const BLUE: Self = Self::new(0, 0, 0xFFF);
    pub const YELLOW: Self = Self::new(0xFFF, 0xFFF, 0);
    pub const ORANGE: Self = Self::new(0xFFF, 0x800, 0);
    pub const PINK: Self = Self::new(0x800, 0x300, 0x800);
    pub const CYAN: Self = Self::new(0, 0xFFF, 0xFFF);
    pub const MAGENTA: Self = Self::new(0xFFF, 0, 0xFFF);
    pub const BROWN: Self = Self::new(0x7B0, 0x400, 0x130);

    /// Create a color, saturating each primary at 4095
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self {
            r: saturate(r),
            g: saturate(g),
            b: saturate(b),
        }
    }

    /// Check if every primary is off
    pub const fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Per-primary mean of two colors, rounding down
    ///
    /// This is the blend used when a voxel is merged into a partially drawn
    /// frame. The result is saturated like [`Color::new`].
    pub const fn average(self, other: Self) -> Self {
        Self::new(mean(self.r, other.r), mean(self.g, other.g), mean(self.b, other.b))
    }
}
