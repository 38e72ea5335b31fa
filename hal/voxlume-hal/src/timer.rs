//! Multiplex timer abstraction

/// Periodic timer that paces the layer multiplexer
///
/// On hardware the timer both generates the grayscale clock and raises the
/// tick interrupt once per grayscale cycle. The tick handler clears the
/// overflow flag before returning so the interrupt does not refire.
pub trait LayerTimer {
    /// Start generating ticks
    fn start(&mut self);

    /// Stop generating ticks
    fn stop(&mut self);

    /// Clear the overflow/status flag raised by the last tick
    fn clear_overflow(&mut self);
}
