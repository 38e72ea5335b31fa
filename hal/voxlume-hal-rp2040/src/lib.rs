//! RP2040 implementation of the Voxlume cube driver HAL
//!
//! This crate provides the production hardware behind the `voxlume-hal`
//! traits:
//!
//! - SPI0/SPI1 with DMA as the grayscale [`Transmitter`](voxlume_hal::Transmitter)
//! - A PWM slice as the grayscale clock and [`LayerTimer`](voxlume_hal::LayerTimer)
//! - GPIO outputs for the strobes and layer enables
//! - The async multiplexer loop
//!
//! Pin selection and executor setup belong to the firmware.

#![no_std]

pub mod gsclk;
pub mod link;
pub mod pins;
pub mod runner;

pub use gsclk::{gsclk_config, PwmGsclk};
pub use link::{spi_config, SpiLink};
pub use pins::{multiplex_pins, CubePin};
pub use runner::run_multiplexer;
