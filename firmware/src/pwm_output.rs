//! Servo PWM outputs on the RP2040 PWM slices.

use embassy_rp::pwm::{Config, PwmOutput};
use embedded_hal::pwm::SetDutyCycle;
use fixed::traits::ToFixed;
use servo_core::{Axis, DutyOutput, OutputError, PwmTiming};

/// Build a slice configuration whose counter wraps once per servo period.
///
/// The divider is the smallest integer that keeps `top` within 16 bits. At
/// the default 125 MHz system clock and 50 Hz this gives a divider of 39 and
/// a `top` of 64101.
#[must_use]
pub fn servo_pwm_config(clk_sys_hz: u32, timing: &PwmTiming) -> Config {
    let freq_hz = 1_000_000 / timing.period_us.max(1);
    let ticks = clk_sys_hz / freq_hz.max(1);
    let divider = (ticks / u16::MAX as u32 + 1).min(u8::MAX as u32) as u8;
    let top = (ticks / divider as u32).saturating_sub(1).min(u16::MAX as u32) as u16;

    let mut config = Config::default();
    config.divider = divider.to_fixed();
    config.top = top;
    config
}

/// Three servo outputs, one per axis.
///
/// Pitch, roll and yaw are bound to GPIO 12, 13, 14 (slice 6 A/B, slice 7 A).
/// Duty values arrive in the engine's resolution and are rescaled to the
/// slice counter range.
pub struct PwmServoOutput<'d> {
    pitch: PwmOutput<'d>,
    roll: PwmOutput<'d>,
    yaw: PwmOutput<'d>,
    levels: u16,
}

impl<'d> PwmServoOutput<'d> {
    pub fn new(
        pitch: PwmOutput<'d>,
        roll: PwmOutput<'d>,
        yaw: PwmOutput<'d>,
        timing: &PwmTiming,
    ) -> Self {
        Self {
            pitch,
            roll,
            yaw,
            levels: timing.resolution_levels.min(u16::MAX as u32) as u16,
        }
    }
}

impl DutyOutput for PwmServoOutput<'_> {
    fn set_duty(&mut self, axis: Axis, duty: u16) -> Result<(), OutputError> {
        let output = match axis {
            Axis::Pitch => &mut self.pitch,
            Axis::Roll => &mut self.roll,
            Axis::Yaw => &mut self.yaw,
        };
        output
            .set_duty_cycle_fraction(duty.min(self.levels), self.levels)
            .map_err(|_| OutputError::Io)
    }
}
