//! PWM grayscale clock
//!
//! One PWM slice toggles the grayscale clock input of every chip in the
//! chain. A wrap of the slice is one grayscale clock; 4096 of them make one
//! PWM cycle of the drivers and therefore one layer period.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::types::extra::U4;
use fixed::FixedU16;
use voxlume_core::TimingConfig;
use voxlume_hal::LayerTimer;

/// Smallest divider the slice accepts (1.0 in 8.4 fixed point)
const MIN_DIVIDER_X16: u32 = 16;

/// Largest divider the slice accepts (255 + 15/16)
const MAX_DIVIDER_X16: u32 = 0x0FFF;

/// Calculate the slice divider that turns `sys_clk_hz` into the timing's bus clock
///
/// The divider is 8.4 fixed point, so the quotient is computed in
/// sixteenths and clamped to the valid range.
pub fn clock_divider(sys_clk_hz: u32, bus_hz: u32) -> FixedU16<U4> {
    if bus_hz == 0 {
        return FixedU16::from_bits(MAX_DIVIDER_X16 as u16);
    }
    let div_x16 = (sys_clk_hz as u64 * 16) / bus_hz as u64;
    let div_x16 = (div_x16 as u32).clamp(MIN_DIVIDER_X16, MAX_DIVIDER_X16);
    FixedU16::from_bits(div_x16 as u16)
}

/// PWM configuration for the grayscale clock
///
/// Output A is high for `gsclk_high` bus cycles out of every
/// `gsclk_high + gsclk_low`. The slice starts disabled.
pub fn gsclk_config(timing: &TimingConfig, sys_clk_hz: u32) -> PwmConfig {
    let mut config = PwmConfig::default();
    config.divider = clock_divider(sys_clk_hz, timing.bus_hz);
    config.top = (timing.gsclk_period().saturating_sub(1)).min(u16::MAX as u32) as u16;
    config.compare_a = timing.gsclk_high.min(u16::MAX as u32) as u16;
    config.phase_correct = false;
    config.enable = false;
    config
}

/// Grayscale clock slice used as the layer timer
pub struct PwmGsclk<'d> {
    pwm: Pwm<'d>,
    config: PwmConfig,
}

impl<'d> PwmGsclk<'d> {
    /// Configure the slice, leaving it stopped
    pub fn new(mut pwm: Pwm<'d>, timing: &TimingConfig, sys_clk_hz: u32) -> Self {
        let config = gsclk_config(timing, sys_clk_hz);
        pwm.set_config(&config);
        Self { pwm, config }
    }

    fn set_enabled(&mut self, enable: bool) {
        self.config.enable = enable;
        self.pwm.set_config(&self.config);
    }
}

impl LayerTimer for PwmGsclk<'_> {
    fn start(&mut self) {
        self.pwm.set_counter(0);
        self.set_enabled(true);
    }

    fn stop(&mut self) {
        self.set_enabled(false);
    }

    /// Clear the wrap flag and restart the clock on the blank edge
    fn clear_overflow(&mut self) {
        self.pwm.clear_wrapped();
        self.pwm.set_counter(0);
    }
}
