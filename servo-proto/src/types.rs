//! Protocol types: Axis, Attitude, ChannelPatch, frames, Snapshot, Ack.

use core::ops::{Index, IndexMut};

/// One of the three servo axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Pitch,
    Roll,
    Yaw,
}

impl Axis {
    /// All axes in wire order.
    pub const ALL: [Axis; 3] = [Axis::Pitch, Axis::Roll, Axis::Yaw];

    /// Position of this axis in per-axis arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Axis::Pitch => 0,
            Axis::Roll => 1,
            Axis::Yaw => 2,
        }
    }

    /// Key used for this axis in inbound frames.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Pitch => "pitch",
            Axis::Roll => "roll",
            Axis::Yaw => "yaw",
        }
    }
}

/// A value per axis, indexable by [`Axis`].
///
/// # Example
///
/// ```
/// use servo_proto::{Axis, PerAxis};
///
/// let mut pulses = PerAxis::splat(1500);
/// pulses[Axis::Yaw] = 1800;
/// assert_eq!(pulses[Axis::Pitch], 1500);
/// assert_eq!(pulses[Axis::Yaw], 1800);
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PerAxis<T>(pub [T; 3]);

impl<T: Copy> PerAxis<T> {
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self([value; 3])
    }

    #[must_use]
    pub const fn new(pitch: T, roll: T, yaw: T) -> Self {
        Self([pitch, roll, yaw])
    }
}

impl<T> PerAxis<T> {
    /// Iterate `(axis, value)` pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        Axis::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Axis> for PerAxis<T> {
    type Output = T;

    #[inline]
    fn index(&self, axis: Axis) -> &T {
        &self.0[axis.index()]
    }
}

impl<T> IndexMut<Axis> for PerAxis<T> {
    #[inline]
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        &mut self.0[axis.index()]
    }
}

/// Raw orientation angles in degrees, as computed by the remote client.
pub type Attitude = PerAxis<f32>;

/// Partial calibration update for one channel.
///
/// `None` fields leave the channel untouched.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPatch {
    /// Degrees-to-microseconds sensitivity.
    pub rate: Option<f32>,
    /// Lower pulse bound in microseconds.
    pub min_pulse: Option<i32>,
    /// Upper pulse bound in microseconds.
    pub max_pulse: Option<i32>,
}

impl ChannelPatch {
    /// True when the patch carries no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rate.is_none() && self.min_pulse.is_none() && self.max_pulse.is_none()
    }
}

/// Calibration frame: gating flags plus per-channel patches.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationFrame {
    pub control_enabled: bool,
    pub operation_locked: Option<bool>,
    pub channels: PerAxis<Option<ChannelPatch>>,
}

/// Telemetry frame: live angles, optionally overriding the control gate.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryFrame {
    pub attitude: Attitude,
    pub enabled: Option<bool>,
}

/// Bare text commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `reset_servo`: center every servo.
    ResetServo,
    /// `reset_attitude`: make the current orientation the new zero.
    ResetAttitude,
}

impl Command {
    /// Wire text of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Command::ResetServo => "reset_servo",
            Command::ResetAttitude => "reset_attitude",
        }
    }

    /// Acknowledgement sent back to the issuing client.
    #[must_use]
    pub const fn ack(self) -> Ack {
        match self {
            Command::ResetServo => Ack::ServoReset,
            Command::ResetAttitude => Ack::AttitudeReset,
        }
    }
}

/// Reply sent only to the client that issued a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    ServoReset,
    AttitudeReset,
}

impl Ack {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Ack::ServoReset => "Servo reset",
            Ack::AttitudeReset => "Attitude reset",
        }
    }
}

/// Greeting sent to a client when it connects.
pub const GREETING: &str = "Connected to ESP32 WebSocket Server";

/// Classified inbound message.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum ControlMessage {
    Calibration(CalibrationFrame),
    Telemetry(TelemetryFrame),
    Command(Command),
}

/// Outbound broadcast of mapped angles and pulse widths.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Mapped angles in degrees, within ±180.
    pub mapped: PerAxis<f32>,
    /// Pulse widths in microseconds.
    pub pulse: PerAxis<i32>,
}
