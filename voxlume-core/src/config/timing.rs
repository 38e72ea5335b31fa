//! Multiplex timing
//!
//! The grayscale clock and the layer tick come from one timer. The driver
//! chips need 4096 grayscale clocks per PWM cycle, and the layer advances
//! once per PWM cycle, so every rate below follows from the bus clock and the
//! grayscale clock high/low counts.
//!
//! The timer runs centre-aligned (counting up then down), which halves the
//! modulo relative to the bus cycles of one PWM cycle:
//!
//! ```text
//!  bus cycles per layer = gs_count * (gsclk_high + gsclk_low)
//!  timer modulo         = gs_count * (gsclk_high + gsclk_low) / 2 / prescaler
//!
//!  counter  0 ──────▶ modulo ──────▶ 0
//!                  ▲ latch_match
//!                  ▲ blank_match (one count later, brackets latch)
//! ```

use voxlume_protocol::{FRAME_BITS, SERIAL_CLOCK_HZ};

use crate::config::ConfigError;
use crate::store::HEIGHT;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NS_PER_S: u64 = 1_000_000_000;

/// Timer and serial link rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Timer input clock (Hz)
    pub bus_hz: u32,
    /// Bus cycles the grayscale clock stays high
    pub gsclk_high: u32,
    /// Bus cycles the grayscale clock stays low
    pub gsclk_low: u32,
    /// Timer input divider
    pub timer_prescaler: u32,
    /// Grayscale clocks per PWM cycle
    pub gs_count: u32,
    /// Serial clock of the grayscale burst (Hz)
    pub serial_hz: u32,
}

impl Default for TimingConfig {
    /// Reference board: 60 MHz peripheral bus
    fn default() -> Self {
        Self {
            bus_hz: 60_000_000,
            gsclk_high: 6,
            gsclk_low: 10,
            timer_prescaler: 4,
            gs_count: 4096,
            serial_hz: SERIAL_CLOCK_HZ,
        }
    }
}

impl TimingConfig {
    /// RP2040 at its default 125 MHz system clock
    pub const fn rp2040() -> Self {
        Self {
            bus_hz: 125_000_000,
            gsclk_high: 16,
            gsclk_low: 16,
            timer_prescaler: 4,
            gs_count: 4096,
            serial_hz: SERIAL_CLOCK_HZ,
        }
    }

    /// Bus cycles per grayscale clock
    pub const fn gsclk_period(&self) -> u32 {
        self.gsclk_high.saturating_add(self.gsclk_low)
    }

    /// Grayscale clock frequency (Hz)
    pub const fn gsclk_hz(&self) -> u32 {
        self.bus_hz / self.gsclk_period()
    }

    /// Centre-aligned timer modulo
    pub const fn timer_modulo(&self) -> u32 {
        (self.gsclk_period() / 2).saturating_mul(self.gs_count) / self.timer_prescaler
    }

    /// Counter value at which the latch strobe fires
    pub const fn latch_match(&self) -> u32 {
        self.timer_modulo()
            .saturating_sub(4 / self.timer_prescaler)
            .saturating_sub(3)
    }

    /// Counter value at which the blank strobe fires
    pub const fn blank_match(&self) -> u32 {
        self.latch_match() + 1
    }

    /// Bus cycles per layer
    pub const fn layer_cycles(&self) -> u64 {
        self.gs_count as u64 * self.gsclk_period() as u64
    }

    /// Layer tick frequency (Hz)
    pub const fn layer_hz(&self) -> u32 {
        (self.bus_hz as u64 / self.layer_cycles()) as u32
    }

    /// Layer tick period (ns)
    pub const fn layer_period_ns(&self) -> u64 {
        self.layer_cycles().saturating_mul(NS_PER_S) / self.bus_hz as u64
    }

    /// Full-cube refresh rate (Hz)
    pub const fn refresh_hz(&self) -> u32 {
        self.layer_hz() / HEIGHT as u32
    }

    /// Time to clock one layer burst (ns)
    pub const fn transfer_ns(&self) -> u64 {
        FRAME_BITS as u64 * NS_PER_S / self.serial_hz as u64
    }

    /// Check rates and the per-layer transfer budget
    ///
    /// The burst for a layer must finish within one layer period, otherwise
    /// the next latch loads a partial burst.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus_hz == 0
            || self.gsclk_high == 0
            || self.gsclk_low == 0
            || self.gs_count == 0
            || self.serial_hz == 0
        {
            return Err(ConfigError::ZeroClock);
        }
        let period = self
            .gsclk_high
            .checked_add(self.gsclk_low)
            .ok_or(ConfigError::Overflow)?;
        if period % 2 != 0 {
            return Err(ConfigError::OddGsclkPeriod);
        }
        if !self.timer_prescaler.is_power_of_two() || self.timer_prescaler > 128 {
            return Err(ConfigError::InvalidPrescaler);
        }
        let modulo = (period / 2)
            .checked_mul(self.gs_count)
            .ok_or(ConfigError::Overflow)?
            / self.timer_prescaler;
        if modulo == 0 || modulo > u16::MAX as u32 {
            return Err(ConfigError::InvalidPrescaler);
        }
        if self.transfer_ns() >= self.layer_period_ns() {
            return Err(ConfigError::TransferExceedsLayerPeriod);
        }
        Ok(())
    }
}
