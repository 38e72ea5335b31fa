//! Layer enable pin assignment

use crate::config::ConfigError;
use crate::store::HEIGHT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logical layer to enable pin mapping
///
/// `slots[y]` is the index of the enable pin that lights layer `y`. The extra
/// last entry is the wrap sentinel and must equal the first, so the layer
/// after the top one is always `slots[y + 1]` without a modulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerPinTable {
    pub slots: [u8; HEIGHT + 1],
    /// Layers are switched through P-channel MOSFETs with pull-ups: LOW = on
    pub active_low: bool,
}

impl Default for LayerPinTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl LayerPinTable {
    /// Pin `y` drives layer `y`, active low
    pub const fn identity() -> Self {
        let mut slots = [0; HEIGHT + 1];
        let mut y = 0;
        while y < HEIGHT {
            slots[y] = y as u8;
            y += 1;
        }
        Self {
            slots,
            active_low: true,
        }
    }

    /// Pin slot for layer `y`, where `y == HEIGHT` is the sentinel
    #[inline]
    pub fn slot(&self, y: usize) -> usize {
        self.slots[y] as usize
    }

    /// Pin level that switches a layer on or off
    #[inline]
    pub const fn level(&self, on: bool) -> bool {
        on != self.active_low
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots[HEIGHT] != self.slots[0] {
            return Err(ConfigError::SentinelMismatch);
        }
        let mut used = [false; HEIGHT];
        for &slot in &self.slots[..HEIGHT] {
            let slot = slot as usize;
            if slot >= HEIGHT {
                return Err(ConfigError::SlotOutOfRange);
            }
            if used[slot] {
                return Err(ConfigError::DuplicateSlot);
            }
            used[slot] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let table = LayerPinTable::identity();
        assert_eq!(table.slots, [0, 1, 2, 3, 4, 5, 6, 7, 8, 0]);
        assert_eq!(table.slot(HEIGHT), table.slot(0));
        assert_eq!(table.validate(), Ok(()));
    }

    #[test]
    fn test_levels() {
        let mut table = LayerPinTable::identity();
        assert!(!table.level(true));
        assert!(table.level(false));
        table.active_low = false;
        assert!(table.level(true));
        assert!(!table.level(false));
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut table = LayerPinTable::identity();
        table.slots[HEIGHT] = 1;
        assert_eq!(table.validate(), Err(ConfigError::SentinelMismatch));

        let mut table = LayerPinTable::identity();
        table.slots[4] = HEIGHT as u8;
        assert_eq!(table.validate(), Err(ConfigError::SlotOutOfRange));

        let mut table = LayerPinTable::identity();
        table.slots[4] = 3;
        assert_eq!(table.validate(), Err(ConfigError::DuplicateSlot));
    }

    #[test]
    fn test_reversed_table_is_valid() {
        let table = LayerPinTable {
            slots: [8, 7, 6, 5, 4, 3, 2, 1, 0, 8],
            active_low: true,
        };
        assert_eq!(table.validate(), Ok(()));
    }
}
