//! GPIO pin abstractions
//!
//! Layer enable lines and the blank/latch strobes are plain digital outputs.
//! The multiplexer drives them directly from the tick handler, so the trait
//! is infallible.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Adapter for infallible `embedded-hal` 1.0 output pins
///
/// Chip HALs whose GPIO types implement `embedded_hal::digital::OutputPin`
/// with `Error = Infallible` can be used by the multiplexer through this
/// wrapper. The last driven level is tracked locally so reading it back
/// does not need `&mut` access to the pin.
pub struct HalPin<P> {
    pin: P,
    high: bool,
}

impl<P> HalPin<P>
where
    P: embedded_hal::digital::OutputPin<Error = core::convert::Infallible>,
{
    /// Wrap a pin, driving it to `initial_high`
    pub fn new(pin: P, initial_high: bool) -> Self {
        let mut wrapped = Self { pin, high: false };
        wrapped.set_state(initial_high);
        wrapped
    }

    /// Release the underlying pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for HalPin<P>
where
    P: embedded_hal::digital::OutputPin<Error = core::convert::Infallible>,
{
    fn set_high(&mut self) {
        match self.pin.set_high() {
            Ok(()) => self.high = true,
            Err(never) => match never {},
        }
    }

    fn set_low(&mut self) {
        match self.pin.set_low() {
            Ok(()) => self.high = false,
            Err(never) => match never {},
        }
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
