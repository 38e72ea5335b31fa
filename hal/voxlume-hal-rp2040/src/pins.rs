//! Strobe and layer enable outputs

use embassy_rp::gpio::Output;
use voxlume_core::{LayerPinTable, MultiplexPins, HEIGHT};
use voxlume_hal::HalPin;

/// GPIO output as seen by the multiplexer
pub type CubePin<'d> = HalPin<Output<'d>>;

/// Wrap GPIO outputs for the multiplexer
///
/// Blank starts high (outputs off), latch low, and every layer enable at its
/// off level for `table`.
pub fn multiplex_pins<'d>(
    blank: Output<'d>,
    latch: Output<'d>,
    layers: [Output<'d>; HEIGHT],
    table: &LayerPinTable,
) -> MultiplexPins<CubePin<'d>> {
    let off = table.level(false);
    MultiplexPins {
        blank: HalPin::new(blank, true),
        latch: HalPin::new(latch, false),
        layers: layers.map(|pin| HalPin::new(pin, off)),
    }
}
