//! Channel model: per-axis calibration and live values.

use servo_proto::ChannelPatch;

use crate::config::{ChannelDefaults, CENTER_PULSE_US, DEFAULT_CONFIG, MAX_MAPPED_ANGLE};

/// Calibration and live state of one servo axis.
///
/// A passive record: the reset state machine and the telemetry path keep the
/// derived fields consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    /// Last received raw angle in degrees.
    pub raw_value: f32,
    /// Degrees subtracted from `raw_value` before mapping.
    pub offset: f32,
    /// `raw_value - offset`, clamped to +/-180 degrees.
    pub mapped_value: f32,
    /// Degrees-to-microseconds sensitivity.
    pub rate: f32,
    /// Current output pulse width in microseconds.
    pub pulse_width: i32,
    /// Lower pulse bound in microseconds.
    pub min_pulse: i32,
    /// Upper pulse bound in microseconds.
    pub max_pulse: i32,
}

impl Channel {
    /// Centered channel with the given calibration.
    #[must_use]
    pub const fn new(defaults: &ChannelDefaults) -> Self {
        Self {
            raw_value: 0.0,
            offset: 0.0,
            mapped_value: 0.0,
            rate: defaults.rate,
            pulse_width: CENTER_PULSE_US,
            min_pulse: defaults.min_pulse,
            max_pulse: defaults.max_pulse,
        }
    }

    /// Apply a partial calibration update. Absent fields are left untouched.
    #[inline]
    pub fn apply_patch(&mut self, patch: &ChannelPatch) {
        if let Some(rate) = patch.rate {
            self.rate = rate;
        }
        if let Some(min_pulse) = patch.min_pulse {
            self.min_pulse = min_pulse;
        }
        if let Some(max_pulse) = patch.max_pulse {
            self.max_pulse = max_pulse;
        }
    }

    /// Recompute `mapped_value` from `raw_value` and `offset`.
    #[inline]
    pub fn remap(&mut self) {
        self.mapped_value = map_angle(self.raw_value, self.offset);
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new(&DEFAULT_CONFIG.channel)
    }
}

/// `clamp(raw - offset, -180, 180)`.
///
/// A NaN difference (e.g. infinite raw and offset) maps to 0 so the result
/// always stays inside the range.
#[inline]
#[must_use]
pub fn map_angle(raw: f32, offset: f32) -> f32 {
    let angle = raw - offset;
    if angle.is_nan() {
        0.0
    } else {
        angle.clamp(-MAX_MAPPED_ANGLE, MAX_MAPPED_ANGLE)
    }
}
