//! Pulse converter: mapped angle to pulse width, pulse width to PWM duty.

use crate::config::CENTER_PULSE_US;

/// PWM carrier description used for duty conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTiming {
    /// Carrier period in microseconds.
    pub period_us: u32,
    /// Number of duty levels (`1 << resolution_bits`).
    pub resolution_levels: u32,
}

impl PwmTiming {
    /// 50 Hz carrier (20 ms period), 12-bit duty resolution.
    pub const SERVO_50HZ_12BIT: Self = Self {
        period_us: 20_000,
        resolution_levels: 4096,
    };

    /// Largest duty value the hardware accepts.
    #[inline]
    #[must_use]
    pub const fn max_duty(&self) -> u16 {
        let max = self.resolution_levels.saturating_sub(1);
        if max > u16::MAX as u32 {
            u16::MAX
        } else {
            max as u16
        }
    }
}

/// Arduino-style constrain: below `low` gives `low`, otherwise above `high`
/// gives `high`. Never panics, even when `low > high`.
#[inline]
#[must_use]
pub const fn constrain(value: i32, low: i32, high: i32) -> i32 {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

/// Convert a mapped angle to a pulse width in microseconds.
///
/// `pulse = constrain(round(1500 + mapped * rate), min_pulse, max_pulse)`,
/// rounding half away from zero.
///
/// # Example
///
/// ```
/// use servo_core::pulse::angle_to_pulse;
///
/// assert_eq!(angle_to_pulse(36.0, 5.55, 500, 2500), 1700);
/// assert_eq!(angle_to_pulse(100.0, 5.55, 1000, 2000), 2000);
/// ```
#[inline]
#[must_use]
pub fn angle_to_pulse(mapped: f32, rate: f32, min_pulse: i32, max_pulse: i32) -> i32 {
    // Float-to-int casts saturate and map NaN to 0.
    let pulse = libm::roundf(CENTER_PULSE_US as f32 + mapped * rate) as i32;
    constrain(pulse, min_pulse, max_pulse)
}

/// Convert a pulse width to a hardware duty value.
///
/// `duty = floor(pulse * (levels - 1) / period_us)`, bounded to
/// `[0, levels - 1]` so out-of-range pulses still produce a valid duty.
///
/// # Example
///
/// ```
/// use servo_core::pulse::{pulse_to_duty, PwmTiming};
///
/// assert_eq!(pulse_to_duty(1500, &PwmTiming::SERVO_50HZ_12BIT), 307);
/// ```
#[inline]
#[must_use]
pub fn pulse_to_duty(pulse_us: i32, timing: &PwmTiming) -> u16 {
    if pulse_us <= 0 || timing.period_us == 0 {
        return 0;
    }
    let max_duty = timing.max_duty();
    let duty = pulse_us as u64 * max_duty as u64 / timing.period_us as u64;
    duty.min(max_duty as u64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMING: PwmTiming = PwmTiming::SERVO_50HZ_12BIT;

    #[test]
    fn test_center_angle_is_center_pulse() {
        assert_eq!(angle_to_pulse(0.0, 5.55, 500, 2500), 1500);
    }

    #[test]
    fn test_angle_to_pulse_scaling() {
        // 1500 + 36 * 5.55 = 1699.8 -> 1700
        assert_eq!(angle_to_pulse(36.0, 5.55, 500, 2500), 1700);
        // 1500 - 36 * 5.55 = 1300.2 -> 1300
        assert_eq!(angle_to_pulse(-36.0, 5.55, 500, 2500), 1300);
        assert_eq!(angle_to_pulse(10.0, 2.0, 500, 2500), 1520);
    }

    #[test]
    fn test_angle_to_pulse_clamps() {
        // 1500 + 180 * 5.55 = 2499, still inside the default bounds
        assert_eq!(angle_to_pulse(180.0, 5.55, 500, 2500), 2499);
        assert_eq!(angle_to_pulse(200.0, 5.55, 500, 2500), 2500);
        assert_eq!(angle_to_pulse(-200.0, 5.55, 500, 2500), 500);
        assert_eq!(angle_to_pulse(100.0, 5.55, 1000, 2000), 2000);
        assert_eq!(angle_to_pulse(-100.0, 5.55, 1000, 2000), 1000);
    }

    #[test]
    fn test_angle_to_pulse_negative_rate_inverts() {
        assert_eq!(angle_to_pulse(10.0, -5.0, 500, 2500), 1450);
    }

    #[test]
    fn test_angle_to_pulse_inverted_bounds_does_not_panic() {
        // min > max is not validated: below min gives min, otherwise max.
        assert_eq!(angle_to_pulse(0.0, 5.55, 2000, 1000), 2000);
        assert_eq!(angle_to_pulse(100.0, 5.55, 2000, 1000), 1000);
    }

    #[test]
    fn test_pulse_to_duty() {
        assert_eq!(pulse_to_duty(1500, &TIMING), 307);
        assert_eq!(pulse_to_duty(500, &TIMING), 102);
        assert_eq!(pulse_to_duty(2500, &TIMING), 511);
        assert_eq!(pulse_to_duty(1700, &TIMING), 348);
    }

    #[test]
    fn test_pulse_to_duty_bounds() {
        assert_eq!(pulse_to_duty(0, &TIMING), 0);
        assert_eq!(pulse_to_duty(-500, &TIMING), 0);
        assert_eq!(pulse_to_duty(20_000, &TIMING), 4095);
        assert_eq!(pulse_to_duty(i32::MAX, &TIMING), 4095);
    }

    #[test]
    fn test_constrain() {
        assert_eq!(constrain(5, 0, 10), 5);
        assert_eq!(constrain(-5, 0, 10), 0);
        assert_eq!(constrain(15, 0, 10), 10);
    }
}
