//! Output capabilities driven by the engine: PWM duty and snapshot broadcast.

use servo_proto::{Axis, Snapshot};

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Peripheral or transport I/O error.
    Io,
    /// Device not ready (e.g., link not up yet).
    NotReady,
    /// Message dropped (e.g., outbound queue full).
    Dropped,
    /// Peripheral busy.
    Busy,
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "i/o error"),
            Self::NotReady => write!(f, "not ready"),
            Self::Dropped => write!(f, "dropped"),
            Self::Busy => write!(f, "busy"),
        }
    }
}

/// Hardware capability: "set duty `D` for channel `C`".
///
/// `duty` is always within `[0, resolution_levels - 1]` of the engine's
/// [`PwmTiming`](crate::pulse::PwmTiming). Implementations bind axes to
/// physical outputs and rescale the duty to their own counter range.
pub trait DutyOutput {
    /// Set the duty of one channel. Must not block.
    fn set_duty(&mut self, axis: Axis, duty: u16) -> Result<(), OutputError>;
}

/// Transport capability: "publish snapshot to all subscribers".
///
/// Fire-and-forget: a failure for one subscriber must not prevent delivery
/// to the others, and the engine never retries.
pub trait SnapshotSink {
    /// Broadcast a snapshot. Must not block.
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), OutputError>;
}

impl<T: DutyOutput + ?Sized> DutyOutput for &mut T {
    fn set_duty(&mut self, axis: Axis, duty: u16) -> Result<(), OutputError> {
        (**self).set_duty(axis, duty)
    }
}

impl<T: SnapshotSink + ?Sized> SnapshotSink for &mut T {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), OutputError> {
        (**self).publish(snapshot)
    }
}

/// Output that accepts and discards everything.
///
/// Use this where no PWM hardware or no subscriber is attached.
pub struct NullOutput;

impl DutyOutput for NullOutput {
    fn set_duty(&mut self, _axis: Axis, _duty: u16) -> Result<(), OutputError> {
        Ok(())
    }
}

impl SnapshotSink for NullOutput {
    fn publish(&mut self, _snapshot: &Snapshot) -> Result<(), OutputError> {
        Ok(())
    }
}
