//! Grayscale chain transmitter
//!
//! One layer of grayscale data is handed to the transmitter per multiplex
//! tick. The transfer must run without further CPU involvement (DMA or an
//! equivalent peripheral engine) and finish before the next tick latches it.

/// Serial output engine feeding the driver chain
pub trait Transmitter {
    /// Begin an asynchronous transfer of `data`
    ///
    /// Returns immediately. The implementation must copy or otherwise own
    /// the bytes for the duration of the transfer, because the caller
    /// overwrites its buffer on the next tick.
    fn start(&mut self, data: &[u8]);

    /// Check if a previously started transfer is still in flight
    fn is_busy(&self) -> bool;

    /// Transmit `data` and wait for completion
    ///
    /// Only used during bring-up, before the multiplex tick is running.
    fn write_blocking(&mut self, data: &[u8]);
}

/// Progress of one staged burst, for transmitters that clock it out after
/// the tick returns
///
/// A burst that finishes after the tick meant to latch it keeps the link busy
/// until the next burst is staged, so that tick still sees the overrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BurstState {
    staged: bool,
    late: bool,
}

impl BurstState {
    pub const fn new() -> Self {
        Self {
            staged: false,
            late: false,
        }
    }

    /// A new burst was handed over by the tick
    pub fn stage(&mut self) {
        self.staged = true;
        self.late = false;
    }

    /// Check if a burst is waiting to be clocked out
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// The staged burst has been clocked out
    ///
    /// `late` is whether it finished after the tick that latches it.
    pub fn finish(&mut self, late: bool) {
        self.staged = false;
        self.late = late;
    }

    /// Value for [`Transmitter::is_busy`]
    pub fn is_busy(&self) -> bool {
        self.staged || self.late
    }
}

/// Serial link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
}

impl SerialConfig {
    /// Configuration for the grayscale chain at `frequency`
    ///
    /// The chain samples on the rising edge with the clock idling low, MSB
    /// first.
    pub const fn grayscale(frequency: u32) -> Self {
        Self {
            frequency,
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::grayscale(5_000_000)
    }
}

/// Serial clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low
    IdleLow,
    /// Clock idles high
    IdleHigh,
}

/// Serial clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on the first clock edge
    CaptureOnFirstTransition,
    /// Data captured on the second clock edge
    CaptureOnSecondTransition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_link_samples_rising_edge() {
        let config = SerialConfig::grayscale(5_000_000);
        assert_eq!(config.polarity, Polarity::IdleLow);
        assert_eq!(config.phase, Phase::CaptureOnFirstTransition);
        assert_eq!(config, SerialConfig::default());
    }

    #[test]
    fn test_burst_busy_until_clocked_out() {
        let mut burst = BurstState::new();
        assert!(!burst.is_busy());

        burst.stage();
        assert!(burst.is_staged());
        assert!(burst.is_busy());

        burst.finish(false);
        assert!(!burst.is_staged());
        assert!(!burst.is_busy());
    }

    #[test]
    fn test_late_burst_stays_busy_until_next_stage() {
        let mut burst = BurstState::new();
        burst.stage();
        burst.finish(true);
        assert!(!burst.is_staged());
        assert!(burst.is_busy());

        burst.stage();
        burst.finish(false);
        assert!(!burst.is_busy());
    }
}
