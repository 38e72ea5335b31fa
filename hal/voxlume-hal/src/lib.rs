//! Voxlume Hardware Abstraction Layer
//!
//! This crate defines the hardware-access traits used by the cube driver.
//! The scheduling, encoding and buffer logic in `voxlume-core` only talks to
//! these traits, so it can run against a real chip or against the recording
//! simulation in [`sim`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  voxlume-core (scheduler, encoder, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  voxlume-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ voxlume-hal-  │       │  sim (host    │
//! │    rp2040     │       │   testing)    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Layer enables and the blank/latch strobes
//! - [`transmit::Transmitter`] - Fire-and-forget serial burst to the driver chain
//! - [`timer::LayerTimer`] - Periodic multiplex tick source

#![cfg_attr(not(feature = "sim"), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
#[cfg(feature = "sim")]
pub mod sim;
pub mod timer;
pub mod transmit;

// Re-export key traits at crate root for convenience
pub use gpio::{HalPin, OutputPin};
pub use timer::LayerTimer;
pub use transmit::{BurstState, Phase, Polarity, SerialConfig, Transmitter};
