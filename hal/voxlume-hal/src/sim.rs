//! Recording simulation backend
//!
//! Host-side implementations of the HAL traits. Every pin write, transfer
//! and timer operation is appended to one shared, ordered [`SimLog`], so
//! tests can assert on the exact strobe sequence of a multiplex tick and
//! decode every byte sequence handed to the transmitter.
//!
//! All handles are `Send` so a scheduler built from them can be driven from
//! a separate thread that stands in for the timer interrupt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use crate::gpio::OutputPin;
use crate::timer::LayerTimer;
use crate::transmit::Transmitter;

/// Simulated output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimLine {
    /// Output blanking strobe
    Blank,
    /// Data latch strobe
    Latch,
    /// Layer enable line (pin slot index)
    Layer(u8),
}

/// One recorded hardware operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// A pin was driven
    Pin { line: SimLine, high: bool },
    /// An asynchronous transfer was started
    TransferStarted { len: usize },
    /// A blocking transfer was performed
    BlockingWrite { len: usize },
    /// The layer timer was started
    TimerStarted,
    /// The layer timer was stopped
    TimerStopped,
    /// The timer overflow flag was cleared
    OverflowCleared,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shared, ordered record of simulated hardware operations
#[derive(Debug, Clone, Default)]
pub struct SimLog {
    events: Arc<Mutex<Vec<SimEvent>>>,
}

impl SimLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&self, event: SimEvent) {
        lock(&self.events).push(event);
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<SimEvent> {
        lock(&self.events).clone()
    }

    /// Remove and return all events so far
    pub fn take(&self) -> Vec<SimEvent> {
        core::mem::take(&mut *lock(&self.events))
    }

    /// Discard all events
    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    /// Create a pin that records into this log
    ///
    /// The initial level is not recorded.
    pub fn pin(&self, line: SimLine, initial_high: bool) -> SimPin {
        SimPin {
            line,
            high: initial_high,
            log: self.clone(),
        }
    }

    /// Create a transmitter that records into this log
    pub fn transmitter(&self) -> SimTransmitter {
        SimTransmitter {
            log: self.clone(),
            transfers: Arc::new(Mutex::new(Vec::new())),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a timer that records into this log
    pub fn timer(&self) -> SimTimer {
        SimTimer {
            log: self.clone(),
            running: false,
        }
    }
}

/// Simulated output pin
#[derive(Debug)]
pub struct SimPin {
    line: SimLine,
    high: bool,
    log: SimLog,
}

impl SimPin {
    /// Line this pin drives
    pub fn line(&self) -> SimLine {
        self.line
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) {
        self.high = true;
        self.log.record(SimEvent::Pin {
            line: self.line,
            high: true,
        });
    }

    fn set_low(&mut self) {
        self.high = false;
        self.log.record(SimEvent::Pin {
            line: self.line,
            high: false,
        });
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Simulated serial transmitter
///
/// Clones share state, so a test can keep a handle while the scheduler owns
/// the other. Transfers complete instantly unless the transmitter is forced
/// busy with [`SimTransmitter::set_busy`].
#[derive(Debug, Clone)]
pub struct SimTransmitter {
    log: SimLog,
    transfers: Arc<Mutex<Vec<Vec<u8>>>>,
    busy: Arc<AtomicBool>,
}

impl SimTransmitter {
    /// Force the transmitter to report an in-flight transfer
    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    /// Every byte sequence transmitted so far, blocking writes included
    pub fn transfers(&self) -> Vec<Vec<u8>> {
        lock(&self.transfers).clone()
    }

    /// The most recent byte sequence
    pub fn last_transfer(&self) -> Option<Vec<u8>> {
        lock(&self.transfers).last().cloned()
    }

    /// Number of transfers so far
    pub fn transfer_count(&self) -> usize {
        lock(&self.transfers).len()
    }
}

impl Transmitter for SimTransmitter {
    fn start(&mut self, data: &[u8]) {
        lock(&self.transfers).push(data.to_vec());
        self.log.record(SimEvent::TransferStarted { len: data.len() });
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn write_blocking(&mut self, data: &[u8]) {
        lock(&self.transfers).push(data.to_vec());
        self.log.record(SimEvent::BlockingWrite { len: data.len() });
    }
}

/// Simulated layer timer
///
/// Ticks are not generated; the test (or a thread standing in for the
/// interrupt) calls the scheduler's tick directly.
#[derive(Debug)]
pub struct SimTimer {
    log: SimLog,
    running: bool,
}

impl SimTimer {
    /// Check if the timer has been started
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl LayerTimer for SimTimer {
    fn start(&mut self) {
        self.running = true;
        self.log.record(SimEvent::TimerStarted);
    }

    fn stop(&mut self) {
        self.running = false;
        self.log.record(SimEvent::TimerStopped);
    }

    fn clear_overflow(&mut self) {
        self.log.record(SimEvent::OverflowCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_shared_and_ordered() {
        let log = SimLog::new();
        let mut blank = log.pin(SimLine::Blank, false);
        let mut tx = log.transmitter();
        let mut timer = log.timer();

        blank.set_high();
        tx.start(&[1, 2, 3]);
        timer.clear_overflow();

        assert_eq!(
            log.events(),
            vec![
                SimEvent::Pin {
                    line: SimLine::Blank,
                    high: true
                },
                SimEvent::TransferStarted { len: 3 },
                SimEvent::OverflowCleared,
            ]
        );
    }

    #[test]
    fn test_transmitter_handles_share_state() {
        let log = SimLog::new();
        let handle = log.transmitter();
        let mut tx = handle.clone();

        assert!(!tx.is_busy());
        handle.set_busy(true);
        assert!(tx.is_busy());

        tx.write_blocking(&[0; 4]);
        tx.start(&[9]);
        assert_eq!(handle.transfer_count(), 2);
        assert_eq!(handle.last_transfer(), Some(vec![9]));
    }

    #[test]
    fn test_take_drains_log() {
        let log = SimLog::new();
        let mut timer = log.timer();
        timer.start();
        assert!(timer.is_running());
        assert_eq!(log.take(), vec![SimEvent::TimerStarted]);
        assert!(log.events().is_empty());
        timer.stop();
        assert!(!timer.is_running());
        log.clear();
        assert!(log.events().is_empty());
    }
}
