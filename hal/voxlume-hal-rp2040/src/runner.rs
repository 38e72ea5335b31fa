//! Multiplexer task body
//!
//! The loop must run on a high-priority interrupt executor so that it
//! preempts the frame producer spinning in `commit_frame`:
//!
//! ```ignore
//! static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
//!
//! #[embassy_executor::task]
//! async fn multiplex_task(mut scheduler: Scheduler) {
//!     run_multiplexer(&mut scheduler, &TimingConfig::rp2040()).await
//! }
//! ```

use defmt::*;
use embassy_rp::spi::Instance;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Ticker};
use voxlume_core::{LayerScheduler, TimingConfig};
use voxlume_hal::{LayerTimer, OutputPin};

use crate::link::SpiLink;

/// Reset the chain, then tick the scheduler once per layer period forever
///
/// Each burst is pumped against the instant of the tick that latches it. A
/// late burst is counted as an overrun by that tick; the ticker then catches
/// up, so the layers after it are shortened rather than skipped.
pub async fn run_multiplexer<M, P, T, L>(
    scheduler: &mut LayerScheduler<'_, M, P, SpiLink<'_, T>, L>,
    timing: &TimingConfig,
) -> !
where
    M: RawMutex,
    P: OutputPin,
    T: Instance,
    L: LayerTimer,
{
    let period = Duration::from_nanos(timing.layer_period_ns());

    scheduler.start();
    let mut ticker = Ticker::every(period);
    let mut due = Instant::now() + period;
    scheduler.link_mut().pump(due).await;
    info!(
        "Multiplexer started: {} Hz layers, {} Hz refresh",
        timing.layer_hz(),
        timing.refresh_hz()
    );

    let mut reported = 0;

    loop {
        ticker.next().await;
        scheduler.tick();
        due += period;
        scheduler.link_mut().pump(due).await;

        let overruns = scheduler.stats().overruns;
        if overruns != reported {
            warn!("Layer overruns: {}", overruns);
            reported = overruns;
        }
    }
}
