//! Board-agnostic display driver for the Voxlume LED cube
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Voxel colors and the double-buffered voxel store
//! - The fixed channel address table of the cube PCB
//! - The layer encoder that packs one layer into a grayscale frame
//! - The frame commit handshake between producer and interrupt
//! - The layer multiplexer state machine
//! - Timing and layer pin configuration
//!
//! # Contexts
//!
//! ```text
//!  producer (thread mode)            layer tick (interrupt)
//!  ──────────────────────            ──────────────────────
//!  Display::write_voxel ──┐      ┌── LayerScheduler::tick
//!                         ▼      ▼
//!                  ┌──────────────────┐
//!                  │ Display          │
//!                  │  VoxelStore x2   │──▶ ChannelEncoder ──▶ Transmitter
//!                  │  FrameSync       │
//!                  └──────────────────┘
//!  Display::commit_frame (spins until the tick swaps buffers)
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod channel_map;
pub mod color;
pub mod config;
pub mod display;
pub mod encoder;
pub mod scheduler;
pub mod store;
pub mod sync;

pub use color::Color;
pub use config::{ConfigError, DisplayConfig, LayerPinTable, TimingConfig};
pub use display::Display;
pub use encoder::ChannelEncoder;
pub use scheduler::{LayerScheduler, MultiplexPins, SchedulerStats};
pub use store::{BufferRole, VoxelStore, DEPTH, HEIGHT, WIDTH};
pub use sync::FrameSync;
