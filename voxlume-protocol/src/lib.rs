//! Grayscale chain format for the Voxlume cube
//!
//! This crate defines the byte layout clocked into the chain of eighteen
//! 16-channel, 12-bit PWM LED drivers. One layer of the cube is transmitted
//! per multiplex period as a single MSB-first burst.
//!
//! # Chain Overview
//!
//! ```text
//!  MCU ──SIN──▶ chip 0 ──SOUT/SIN──▶ chip 1 ── ... ──▶ chip 17
//!              ch 0..15             ch 16..31         ch 272..287
//! ```
//!
//! Data clocked in first travels furthest, so the burst starts with the
//! highest channel and ends with channel 0:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┬─────┬─────────────┐
//! │ ch 287 (12 bit)      │ ch 286 (12 bit)      │ ... │ ch 0        │
//! └──────────────────────┴──────────────────────┴─────┴─────────────┘
//!   └──── 3 bytes per channel pair ────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod gs;

pub use gs::{
    GsError, GsFrame, CHANNELS_PER_CHIP, CHANNEL_COUNT, CHIP_COUNT, FRAME_BITS, FRAME_BYTES,
    GS_BITS, GS_MAX, RESET_BYTES, SERIAL_CLOCK_HZ,
};
