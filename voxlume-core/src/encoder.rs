//! Layer encoder
//!
//! Converts one horizontal layer of the displayed buffer into the grayscale
//! burst for the driver chain. Runs in the layer tick, once per layer.

use voxlume_protocol::{GsFrame, GS_MAX};

use crate::channel_map;
use crate::store::{BufferRole, VoxelStore, DEPTH, HEIGHT, WIDTH};

/// Owns the transmission buffer and fills it one layer at a time
#[derive(Debug, Default)]
pub struct ChannelEncoder {
    frame: GsFrame,
}

impl ChannelEncoder {
    /// Create an encoder with an all-black buffer
    pub const fn new() -> Self {
        Self {
            frame: GsFrame::new(),
        }
    }

    /// Pack layer `y` of the displayed buffer
    ///
    /// Every mapped channel is rewritten, so no state carries over from the
    /// previous layer. Layers outside the cube encode as black. Primaries
    /// above full scale encode as full scale.
    pub fn encode(&mut self, store: &VoxelStore, y: usize) -> &GsFrame {
        if y >= HEIGHT {
            self.frame.clear();
            return &self.frame;
        }
        for x in 0..WIDTH {
            for z in 0..DEPTH {
                let color = store.read(BufferRole::Displayed, x, y, z);
                let [b, g, r] = channel_map::channels(x, z);
                self.frame.write_channel(b, color.b.min(GS_MAX));
                self.frame.write_channel(g, color.g.min(GS_MAX));
                self.frame.write_channel(r, color.r.min(GS_MAX));
            }
        }
        &self.frame
    }

    /// Reset the buffer to black
    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// Last encoded buffer
    pub fn frame(&self) -> &GsFrame {
        &self.frame
    }
}
