//! Layer multiplexer
//!
//! The scheduler runs from the periodic layer tick (highest priority, run to
//! completion). Each tick switches the electrically active layer and starts
//! the burst for the layer after it, so data is always one layer ahead of
//! the light:
//!
//! ```text
//! tick      n            n+1          n+2
//!           │            │            │
//! active    ├─ layer k ──┼─ layer k+1 ┼─ layer k+2
//! burst     ├─ data k+1 ─┼─ data k+2 ─┼─ data k+3
//! latch     ▲ data k     ▲ data k+1   ▲ data k+2
//! ```
//!
//! Every transition is bracketed outside-in: blank rises, latch rises, the
//! layer enables change, latch falls, blank falls.
//!
//! Once per cycle, on the tick that makes the top layer active, the pending
//! frame (if any) is swapped in before the bytes for layer 0 are encoded.

use embassy_sync::blocking_mutex::raw::RawMutex;
use voxlume_hal::{LayerTimer, OutputPin, Transmitter};
use voxlume_protocol::RESET_BYTES;

use crate::config::{ConfigError, DisplayConfig, LayerPinTable};
use crate::display::Display;
use crate::encoder::ChannelEncoder;
use crate::store::HEIGHT;

/// Strobes and layer enables driven by the multiplexer
pub struct MultiplexPins<P> {
    /// Output blanking (high = all outputs off)
    pub blank: P,
    /// Grayscale latch (rising edge loads the shift register)
    pub latch: P,
    /// Layer enable pins, indexed by layer pin slot
    pub layers: [P; HEIGHT],
}

/// Runtime counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerStats {
    /// Layer ticks handled
    pub ticks: u32,
    /// Full layer cycles completed
    pub cycles: u32,
    /// Frames swapped in
    pub swaps: u32,
    /// Ticks at which the previous burst was still in flight
    pub overruns: u32,
}

/// Interrupt-side state machine cycling through the layers
pub struct LayerScheduler<'a, M, P, T, L>
where
    M: RawMutex,
    P: OutputPin,
    T: Transmitter,
    L: LayerTimer,
{
    display: &'a Display<M>,
    pins: MultiplexPins<P>,
    link: T,
    timer: L,
    encoder: ChannelEncoder,
    layers: LayerPinTable,
    /// Currently active layer
    offset: usize,
    stats: SchedulerStats,
}

impl<'a, M, P, T, L> LayerScheduler<'a, M, P, T, L>
where
    M: RawMutex,
    P: OutputPin,
    T: Transmitter,
    L: LayerTimer,
{
    /// Build a scheduler over validated configuration
    ///
    /// No hardware is touched until [`start`](Self::start).
    pub fn new(
        display: &'a Display<M>,
        pins: MultiplexPins<P>,
        link: T,
        timer: L,
        config: &DisplayConfig,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Rejected display config: {}", e);
            return Err(e);
        }
        Ok(Self {
            display,
            pins,
            link,
            timer,
            encoder: ChannelEncoder::new(),
            layers: config.layers,
            offset: 0,
            stats: SchedulerStats::default(),
        })
    }

    /// Reset the driver chain and start multiplexing
    ///
    /// Overflowing the input shift register by one byte and latching resets
    /// the chips; a black frame is then latched so the outputs start dark.
    /// Layer 0 is lit and the burst for layer 1 is in flight when the timer
    /// starts.
    pub fn start(&mut self) {
        self.pins.blank.set_high();
        let off = self.layers.level(false);
        for pin in self.pins.layers.iter_mut() {
            pin.set_state(off);
        }

        self.link.write_blocking(&[0; RESET_BYTES]);
        self.pulse_latch();
        self.encoder.clear();
        self.link.write_blocking(self.encoder.frame().as_bytes());
        self.pulse_latch();

        self.offset = 0;
        self.drive_layer(self.layers.slot(0), true);
        self.send(1);

        self.pins.blank.set_low();
        self.timer.start();
    }

    /// Stop multiplexing with every layer off
    pub fn stop(&mut self) {
        self.timer.stop();
        self.pins.blank.set_high();
        let off = self.layers.level(false);
        for pin in self.pins.layers.iter_mut() {
            pin.set_state(off);
        }
    }

    /// Handle one layer tick
    pub fn tick(&mut self) {
        let current = self.layers.slot(self.offset);
        let next = self.layers.slot(self.offset + 1);

        self.pins.blank.set_high();
        self.pins.latch.set_high();
        self.drive_layer(current, false);
        self.drive_layer(next, true);
        self.pins.latch.set_low();
        self.pins.blank.set_low();
        self.timer.clear_overflow();

        self.offset = (self.offset + 1) % HEIGHT;
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        let upcoming = if self.offset == HEIGHT - 1 {
            self.stats.cycles = self.stats.cycles.wrapping_add(1);
            self.swap_if_ready();
            0
        } else {
            self.offset + 1
        };

        if self.link.is_busy() {
            self.stats.overruns = self.stats.overruns.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("Layer burst overrun before layer {}", self.offset);
        }
        self.send(upcoming);
    }

    /// Currently active layer
    pub fn layer(&self) -> usize {
        self.offset
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Transmitter, for drivers that complete transfers outside the tick
    pub fn link_mut(&mut self) -> &mut T {
        &mut self.link
    }

    fn swap_if_ready(&mut self) {
        let sync = self.display.sync();
        if !sync.is_pending() {
            return;
        }
        let _displayed = self.display.with_store(|store| {
            store.swap();
            store.displayed_index()
        });
        sync.complete();
        self.stats.swaps = self.stats.swaps.wrapping_add(1);
        #[cfg(feature = "defmt")]
        defmt::trace!("Frame swapped, displaying buffer {}", _displayed);
    }

    fn send(&mut self, y: usize) {
        let encoder = &mut self.encoder;
        self.display.with_store(|store| {
            encoder.encode(store, y);
        });
        self.link.start(self.encoder.frame().as_bytes());
    }

    fn drive_layer(&mut self, slot: usize, on: bool) {
        let level = self.layers.level(on);
        self.pins.layers[slot].set_state(level);
    }

    fn pulse_latch(&mut self) {
        self.pins.latch.set_high();
        self.pins.latch.set_low();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_map::{channel, Primary};
    use crate::color::Color;
    use crate::config::TimingConfig;
    use crate::store::{BufferRole, DEPTH, WIDTH};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use portable_atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::vec::Vec;
    use voxlume_hal::sim::{SimEvent, SimLine, SimLog, SimPin, SimTimer, SimTransmitter};
    use voxlume_hal::BurstState;
    use voxlume_protocol::{GsFrame, CHANNEL_COUNT, FRAME_BYTES};

    type TestDisplay = Display<CriticalSectionRawMutex>;
    type TestScheduler<'a> =
        LayerScheduler<'a, CriticalSectionRawMutex, SimPin, SimTransmitter, SimTimer>;

    fn pins(log: &SimLog) -> MultiplexPins<SimPin> {
        MultiplexPins {
            blank: log.pin(SimLine::Blank, true),
            latch: log.pin(SimLine::Latch, false),
            layers: core::array::from_fn(|i| log.pin(SimLine::Layer(i as u8), true)),
        }
    }

    fn scheduler<'a>(
        display: &'a TestDisplay,
        log: &SimLog,
    ) -> (TestScheduler<'a>, SimTransmitter) {
        let link = log.transmitter();
        let scheduler = LayerScheduler::new(
            display,
            pins(log),
            link.clone(),
            log.timer(),
            &DisplayConfig::default(),
        );
        match scheduler {
            Ok(s) => (s, link),
            Err(e) => panic!("default config rejected: {:?}", e),
        }
    }

    fn decode(bytes: &[u8]) -> GsFrame {
        let bytes: [u8; FRAME_BYTES] = bytes.try_into().expect("burst length");
        GsFrame::from_bytes(bytes)
    }

    fn layer_pin_events(events: &[SimEvent]) -> Vec<(u8, bool)> {
        events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Pin {
                    line: SimLine::Layer(i),
                    high,
                } => Some((*i, *high)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let mut config = DisplayConfig::default();
        config.timing = TimingConfig {
            serial_hz: 100_000,
            ..TimingConfig::default()
        };
        let result = LayerScheduler::new(
            &display,
            pins(&log),
            log.transmitter(),
            log.timer(),
            &config,
        );
        assert!(matches!(result, Err(ConfigError::TransferExceedsLayerPeriod)));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_start_resets_chain_then_primes_layer_one() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, link) = scheduler(&display, &log);

        sched.start();
        let events = log.take();

        let blocking: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::BlockingWrite { len } => Some(*len),
                _ => None,
            })
            .collect();
        assert_eq!(blocking, [RESET_BYTES, FRAME_BYTES]);
        assert!(link.transfers()[..2]
            .iter()
            .all(|t| t.iter().all(|&b| b == 0)));

        // Blank first, timer last, layer 0 is the only one lit
        assert_eq!(
            events.first(),
            Some(&SimEvent::Pin {
                line: SimLine::Blank,
                high: true
            })
        );
        assert_eq!(events.last(), Some(&SimEvent::TimerStarted));
        assert_eq!(layer_pin_events(&events).last(), Some(&(0, false)));
        assert_eq!(
            events.iter().filter(|e| matches!(e, SimEvent::TransferStarted { .. })).count(),
            1
        );
        assert_eq!(sched.layer(), 0);
    }

    #[test]
    fn test_tick_strobe_order() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, _link) = scheduler(&display, &log);
        sched.start();
        log.clear();

        sched.tick();

        let pin = |line, high| SimEvent::Pin { line, high };
        assert_eq!(
            log.events(),
            [
                pin(SimLine::Blank, true),
                pin(SimLine::Latch, true),
                pin(SimLine::Layer(0), true),
                pin(SimLine::Layer(1), false),
                pin(SimLine::Latch, false),
                pin(SimLine::Blank, false),
                SimEvent::OverflowCleared,
                SimEvent::TransferStarted { len: FRAME_BYTES },
            ]
        );
        assert_eq!(sched.layer(), 1);
    }

    #[test]
    fn test_cycle_visits_every_layer_once() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, _link) = scheduler(&display, &log);
        sched.start();
        log.clear();

        let mut visited = [0u32; HEIGHT];
        for _ in 0..HEIGHT {
            sched.tick();
            visited[sched.layer()] += 1;
        }

        assert_eq!(visited, [1; HEIGHT]);
        assert_eq!(sched.layer(), 0);
        assert_eq!(sched.stats().cycles, 1);
        assert_eq!(sched.stats().ticks, HEIGHT as u32);

        // Exactly one enable goes on per tick and the wrap uses the first pin
        let switched_on: Vec<u8> = layer_pin_events(&log.events())
            .into_iter()
            .filter(|&(_, high)| !high)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(switched_on, [1, 2, 3, 4, 5, 6, 7, 8, 0]);
    }

    #[test]
    fn test_bursts_run_one_layer_ahead() {
        let display = TestDisplay::new();
        for y in 0..HEIGHT {
            display.write_voxel(0, y, 0, Color::new(y as u16 + 1, 0, 0));
        }
        display.with_store(|s| s.swap());

        let log = SimLog::new();
        let (mut sched, link) = scheduler(&display, &log);
        sched.start();

        let red = channel(0, 0, Primary::Red).unwrap_or(u16::MAX);
        let burst_layer = |link: &SimTransmitter| {
            let frame = decode(&link.last_transfer().unwrap_or_default());
            frame.channel(red).map(|v| v as usize - 1)
        };

        assert_eq!(burst_layer(&link), Some(1));
        for _ in 0..2 * HEIGHT {
            sched.tick();
            assert_eq!(burst_layer(&link), Some((sched.layer() + 1) % HEIGHT));
        }
    }

    #[test]
    fn test_pending_frame_swaps_once_at_cycle_boundary() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, _link) = scheduler(&display, &log);
        sched.start();

        display.write_voxel(4, 4, 4, Color::CYAN);
        display.sync().request();

        for _ in 0..HEIGHT - 2 {
            sched.tick();
        }
        assert_eq!(sched.stats().swaps, 0);
        assert!(display.is_frame_pending());

        // The tick that lights the top layer is the boundary
        sched.tick();
        assert_eq!(sched.layer(), HEIGHT - 1);
        assert_eq!(sched.stats().swaps, 1);
        assert!(!display.is_frame_pending());
        assert_eq!(display.read_displayed_voxel(4, 4, 4), Color::CYAN);
        assert_eq!(display.read_rendering_voxel(4, 4, 4), Color::BLACK);

        for _ in 0..HEIGHT {
            sched.tick();
        }
        assert_eq!(sched.stats().swaps, 1);
        assert_eq!(sched.stats().cycles, 2);
    }

    #[test]
    fn test_no_swap_without_commit() {
        let display = TestDisplay::new();
        display.write_voxel(1, 1, 1, Color::WHITE);
        let log = SimLog::new();
        let (mut sched, _link) = scheduler(&display, &log);
        sched.start();

        for _ in 0..3 * HEIGHT {
            sched.tick();
        }
        assert_eq!(sched.stats().swaps, 0);
        assert_eq!(display.read_rendering_voxel(1, 1, 1), Color::WHITE);
        assert_eq!(display.read_displayed_voxel(1, 1, 1), Color::BLACK);
    }

    #[test]
    fn test_full_red_voxel_reaches_its_channel() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, link) = scheduler(&display, &log);
        sched.start();

        display.write_voxel(0, 0, 0, Color::new(4095, 0, 0));
        display.sync().request();
        while sched.stats().swaps == 0 {
            sched.tick();
        }

        // The swap tick encodes layer 0 from the new displayed buffer
        let frame = decode(&link.last_transfer().unwrap_or_default());
        let red = channel(0, 0, Primary::Red).unwrap_or(u16::MAX);
        for c in 0..CHANNEL_COUNT as u16 {
            let expected = if c == red { 4095 } else { 0 };
            assert_eq!(frame.channel(c), Some(expected), "channel {}", c);
        }
    }

    #[test]
    fn test_overrun_is_counted_not_corrected() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, link) = scheduler(&display, &log);
        sched.start();
        let sent = link.transfer_count();

        link.set_busy(true);
        sched.tick();
        sched.tick();
        link.set_busy(false);
        sched.tick();

        assert_eq!(sched.stats().overruns, 2);
        assert_eq!(sched.layer(), 3);
        assert_eq!(link.transfer_count(), sent + 3);
    }

    /// Link that clocks bursts out after the tick, like a DMA pump task
    #[derive(Default)]
    struct PumpedLink {
        burst: BurstState,
    }

    impl Transmitter for PumpedLink {
        fn start(&mut self, _data: &[u8]) {
            self.burst.stage();
        }

        fn is_busy(&self) -> bool {
            self.burst.is_busy()
        }

        fn write_blocking(&mut self, _data: &[u8]) {}
    }

    #[test]
    fn test_late_pumped_burst_counts_overrun() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let sched = LayerScheduler::new(
            &display,
            pins(&log),
            PumpedLink::default(),
            log.timer(),
            &DisplayConfig::default(),
        );
        let mut sched = match sched {
            Ok(s) => s,
            Err(e) => panic!("default config rejected: {:?}", e),
        };

        sched.start();
        sched.link_mut().burst.finish(false);
        sched.tick();
        assert_eq!(sched.stats().overruns, 0);

        // Finished, but after the tick that latches it was due
        sched.link_mut().burst.finish(true);
        sched.tick();
        assert_eq!(sched.stats().overruns, 1);

        sched.link_mut().burst.finish(false);
        sched.tick();
        assert_eq!(sched.stats().overruns, 1);
    }

    #[test]
    fn test_out_of_range_write_isolated() {
        let display = TestDisplay::new();
        display.fill_rendering(Color::PINK);
        display.write_voxel(0, HEIGHT, 0, Color::WHITE);
        display.write_voxel(0, HEIGHT + 1, DEPTH - 1, Color::WHITE);

        for x in 0..WIDTH {
            for y in 0..HEIGHT {
                for z in 0..DEPTH {
                    assert_eq!(display.read_rendering_voxel(x, y, z), Color::PINK);
                }
            }
        }
        assert_eq!(
            display.with_store(|s| s.read(BufferRole::Rendering, 0, HEIGHT, 0)),
            Color::BLACK
        );
    }

    #[test]
    fn test_stop_turns_layers_off() {
        let display = TestDisplay::new();
        let log = SimLog::new();
        let (mut sched, _link) = scheduler(&display, &log);
        sched.start();
        sched.tick();
        log.clear();

        sched.stop();
        let events = log.events();
        assert_eq!(events.first(), Some(&SimEvent::TimerStopped));
        assert!(layer_pin_events(&events).iter().all(|&(_, high)| high));
    }

    #[test]
    fn test_producer_and_tick_threads() {
        let display = TestDisplay::new();
        let running = AtomicBool::new(true);

        thread::scope(|s| {
            s.spawn(|| {
                let log = SimLog::new();
                let (mut sched, _link) = scheduler(&display, &log);
                sched.start();
                while running.load(Ordering::Acquire) {
                    sched.tick();
                }
            });

            for frame in 0..5u16 {
                display.write_voxel(2, 2, 2, Color::new(frame * 100, 0, 0));
                display.commit_frame();
                assert_eq!(display.read_displayed_voxel(2, 2, 2), Color::new(frame * 100, 0, 0));
                assert_eq!(display.read_rendering_voxel(2, 2, 2), Color::BLACK);
            }
            running.store(false, Ordering::Release);
        });
    }
}
