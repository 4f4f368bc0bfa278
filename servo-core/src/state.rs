//! System state: gating flags plus the three channels.

use servo_proto::{Axis, CalibrationFrame, PerAxis, Snapshot};

use crate::channel::Channel;
use crate::config::EngineConfig;

/// Everything the engine remembers between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemState {
    /// Gate for pulse recomputation and hardware writes on telemetry.
    pub control_enabled: bool,
    /// Advisory flag. Stored and reported, never enforced.
    pub operation_locked: bool,
    pub channels: PerAxis<Channel>,
}

impl SystemState {
    #[must_use]
    pub const fn new(config: &EngineConfig) -> Self {
        let channel = Channel::new(&config.channel);
        Self {
            control_enabled: config.control_enabled,
            operation_locked: config.operation_locked,
            channels: PerAxis([channel; 3]),
        }
    }

    #[inline]
    #[must_use]
    pub fn channel(&self, axis: Axis) -> &Channel {
        &self.channels[axis]
    }

    #[inline]
    pub fn channel_mut(&mut self, axis: Axis) -> &mut Channel {
        &mut self.channels[axis]
    }

    /// Current mapped values and pulse widths.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (axis, channel) in self.channels.iter() {
            snapshot.mapped[axis] = channel.mapped_value;
            snapshot.pulse[axis] = channel.pulse_width;
        }
        snapshot
    }

    /// Apply gating flags and per-channel patches.
    ///
    /// Pulse widths are not recomputed here; new calibration takes effect on
    /// the next telemetry frame or reset.
    pub fn apply_calibration(&mut self, frame: &CalibrationFrame) {
        self.control_enabled = frame.control_enabled;
        if let Some(locked) = frame.operation_locked {
            self.operation_locked = locked;
        }
        for (axis, patch) in frame.channels.iter() {
            if let Some(patch) = patch {
                self.channels[axis].apply_patch(patch);
            }
        }
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
