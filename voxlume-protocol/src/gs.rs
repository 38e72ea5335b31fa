//! Grayscale frame packing
//!
//! Frame format:
//! - 288 channels of 12 bits each, 432 bytes total
//! - Channels are ordered from the far end of the chain (channel 287 first)
//! - Each value is MSB first; two channels share three bytes
//!
//! For a pair at distance `2k` and `2k + 1` from the far end, starting at
//! byte `3k`:
//!
//! ```text
//!  byte 3k      byte 3k+1    byte 3k+2
//! ┌──────────┬──────┬──────┬──────────┐
//! │ even hi8 │ even │ odd  │ odd lo8  │
//! │          │ lo4  │ hi4  │          │
//! └──────────┴──────┴──────┴──────────┘
//! ```

/// Number of driver chips in the chain
pub const CHIP_COUNT: usize = 18;

/// Grayscale channels per driver chip
pub const CHANNELS_PER_CHIP: usize = 16;

/// Total physical channels in the chain
pub const CHANNEL_COUNT: usize = CHANNELS_PER_CHIP * CHIP_COUNT;

/// Bits per grayscale value
pub const GS_BITS: usize = 12;

/// Maximum grayscale value
pub const GS_MAX: u16 = (1 << GS_BITS) - 1;

/// Bits clocked per layer
pub const FRAME_BITS: usize = CHANNEL_COUNT * GS_BITS;

/// Bytes clocked per layer
pub const FRAME_BYTES: usize = FRAME_BITS / 8;

/// Bytes clocked during the power-on reset to overflow the input register
pub const RESET_BYTES: usize = FRAME_BYTES + 1;

/// Serial clock rate for the grayscale burst
pub const SERIAL_CLOCK_HZ: u32 = 5_000_000;

/// Errors from the checked packing API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GsError {
    /// Channel index is not below [`CHANNEL_COUNT`]
    ChannelOutOfRange,
    /// Value does not fit in 12 bits
    ValueOutOfRange,
}

/// One layer's worth of packed grayscale data
///
/// The buffer is overwritten every layer tick and carries no state between
/// frames. Channels that are never written (spare outputs on the board) keep
/// whatever value was last packed into them, which is zero from construction.
#[derive(Clone, PartialEq, Eq)]
pub struct GsFrame {
    bytes: [u8; FRAME_BYTES],
}

impl Default for GsFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl GsFrame {
    /// Create an all-black frame
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_BYTES],
        }
    }

    /// Wrap bytes captured from the wire
    pub const fn from_bytes(bytes: [u8; FRAME_BYTES]) -> Self {
        Self { bytes }
    }

    /// Zero every channel
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Packed bytes, in transmission order
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte offset of the 12-bit slot for `channel`
    ///
    /// Returns the offset and whether the value starts on a byte boundary.
    #[inline]
    const fn slot(channel: usize) -> (usize, bool) {
        let from_far_end = CHANNEL_COUNT - channel - 1;
        ((from_far_end * 3) >> 1, from_far_end & 1 == 0)
    }

    /// Pack a grayscale value without validation
    ///
    /// This is the hot path used by the layer encoder. Values are truncated
    /// to 12 bits; channels outside the chain are ignored.
    #[inline]
    pub fn write_channel(&mut self, channel: u16, value: u16) {
        let channel = channel as usize;
        if channel >= CHANNEL_COUNT {
            return;
        }
        let value = value & GS_MAX;
        let (i, aligned) = Self::slot(channel);

        if aligned {
            self.bytes[i] = (value >> 4) as u8;
            self.bytes[i + 1] = ((value << 4) as u8) | (self.bytes[i + 1] & 0x0F);
        } else {
            self.bytes[i] = (self.bytes[i] & 0xF0) | (value >> 8) as u8;
            self.bytes[i + 1] = value as u8;
        }
    }

    /// Pack a grayscale value, rejecting bad channels and values
    pub fn set_channel(&mut self, channel: u16, value: u16) -> Result<(), GsError> {
        if channel as usize >= CHANNEL_COUNT {
            return Err(GsError::ChannelOutOfRange);
        }
        if value > GS_MAX {
            return Err(GsError::ValueOutOfRange);
        }
        self.write_channel(channel, value);
        Ok(())
    }

    /// Unpack the grayscale value of a channel
    pub fn channel(&self, channel: u16) -> Option<u16> {
        let channel = channel as usize;
        if channel >= CHANNEL_COUNT {
            return None;
        }
        let (i, aligned) = Self::slot(channel);
        let hi = self.bytes[i] as u16;
        let lo = self.bytes[i + 1] as u16;

        Some(if aligned {
            (hi << 4) | (lo >> 4)
        } else {
            ((hi & 0x0F) << 8) | lo
        })
    }
}

impl core::fmt::Debug for GsFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let lit = (0..CHANNEL_COUNT as u16)
            .filter(|&c| self.channel(c).unwrap_or(0) != 0)
            .count();
        f.debug_struct("GsFrame")
            .field("bytes", &FRAME_BYTES)
            .field("lit_channels", &lit)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GsFrame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "GsFrame[{=[u8]:x}]", &self.bytes[..]);
    }
}
