//! Display configuration
//!
//! Everything here is fixed at bring-up: the multiplex timing derived from
//! the bus clock and the assignment of logical layers to layer enable pins.
//! Configuration is validated once when the scheduler is built; the tick
//! itself has no error path.

mod layers;
mod timing;

pub use layers::LayerPinTable;
pub use timing::TimingConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Grayscale clock high + low counts must be even for a centre-aligned timer
    OddGsclkPeriod,
    /// A clock, count or rate is zero
    ZeroClock,
    /// Prescaler is not a power of two up to 128, or the timer modulo
    /// does not fit the 16-bit counter
    InvalidPrescaler,
    /// A derived timer count does not fit in 32 bits
    Overflow,
    /// One layer burst takes at least a full layer period
    TransferExceedsLayerPeriod,
    /// The wrap sentinel differs from the first layer slot
    SentinelMismatch,
    /// A layer slot names a pin that does not exist
    SlotOutOfRange,
    /// Two layers share one enable pin
    DuplicateSlot,
}

/// Complete multiplexer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    pub timing: TimingConfig,
    pub layers: LayerPinTable,
}

impl DisplayConfig {
    /// Validate timing and layer table
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.layers.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(DisplayConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_timing_checked_before_layers() {
        let mut config = DisplayConfig::default();
        config.timing.serial_hz = 0;
        config.layers.slots[0] = 3;
        assert_eq!(config.validate(), Err(ConfigError::ZeroClock));
    }
}
