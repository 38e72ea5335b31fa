//! SPI grayscale link
//!
//! The layer tick stages the burst and returns; the multiplexer task then
//! clocks it out with DMA while the layer is lit. A burst that completes
//! after the next tick was due reports the link as busy at that tick, so the
//! scheduler counts it as an overrun.

use defmt::*;
use embassy_rp::spi::{
    Async, Config as SpiConfig, Instance, Phase as RpPhase, Polarity as RpPolarity, Spi,
};
use embassy_time::Instant;
use heapless::Vec;
use voxlume_hal::{BurstState, Phase, Polarity, SerialConfig, Transmitter};
use voxlume_protocol::FRAME_BYTES;

/// SPI peripheral configuration for the grayscale chain
///
/// The RP2040 SPI block always shifts MSB first, which is what the chain
/// expects.
pub fn spi_config(serial: &SerialConfig) -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = serial.frequency;
    config.polarity = match serial.polarity {
        Polarity::IdleLow => RpPolarity::IdleLow,
        Polarity::IdleHigh => RpPolarity::IdleHigh,
    };
    config.phase = match serial.phase {
        Phase::CaptureOnFirstTransition => RpPhase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => RpPhase::CaptureOnSecondTransition,
    };
    config
}

/// DMA-backed [`Transmitter`] over an async SPI bus
pub struct SpiLink<'d, T: Instance> {
    spi: Spi<'d, T, Async>,
    staged: Vec<u8, FRAME_BYTES>,
    burst: BurstState,
}

impl<'d, T: Instance> SpiLink<'d, T> {
    /// Wrap an SPI bus already configured with [`spi_config`]
    pub fn new(spi: Spi<'d, T, Async>) -> Self {
        Self {
            spi,
            staged: Vec::new(),
            burst: BurstState::new(),
        }
    }

    /// Clock out the staged burst
    ///
    /// `deadline` is when the next tick latches the burst. Finishing after it
    /// keeps [`is_busy`](Transmitter::is_busy) true until the next
    /// [`start`](Transmitter::start). Completes immediately if nothing is
    /// staged.
    pub async fn pump(&mut self, deadline: Instant) {
        if !self.burst.is_staged() {
            return;
        }
        if let Err(e) = self.spi.write(&self.staged).await {
            warn!("Grayscale burst failed: {:?}", e);
        }
        self.burst.finish(Instant::now() > deadline);
    }
}

impl<T: Instance> Transmitter for SpiLink<'_, T> {
    fn start(&mut self, data: &[u8]) {
        self.staged.clear();
        if self.staged.extend_from_slice(data).is_err() {
            warn!("Burst of {} bytes exceeds one layer", data.len());
            return;
        }
        self.burst.stage();
    }

    fn is_busy(&self) -> bool {
        self.burst.is_busy()
    }

    fn write_blocking(&mut self, data: &[u8]) {
        if let Err(e) = self.spi.blocking_write(data) {
            warn!("Blocking SPI write failed: {:?}", e);
        }
    }
}
