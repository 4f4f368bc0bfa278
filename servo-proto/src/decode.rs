//! Control message decoder.
//!
//! Classifies one inbound text frame as exactly one of:
//!
//! - **Command**: the literal text `reset_servo` or `reset_attitude`
//! - **Calibration**: a JSON object with a top-level `controlEnabled` and no
//!   top-level `enabled`
//! - **Telemetry**: a JSON object with numeric top-level `pitch`, `roll`, `yaw`
//!   and an optional `enabled`
//!
//! ```text
//! {"controlEnabled":1,"operationLocked":0,"pitch":{"rate":5.55,"minPulse":500,"maxPulse":2500}}
//! {"pitch":12.5,"roll":-3.0,"yaw":170.2,"enabled":1}
//! reset_attitude
//! ```
//!
//! Classification looks at key presence only. A calibration frame whose
//! fields do not fit the calibration shape (numeric `pitch`, or a float
//! `minPulse`/`maxPulse` such as `1000.0`) is rejected as a whole, including
//! its `controlEnabled`; it is never reinterpreted as telemetry.
//!
//! Anything else is rejected with a [`DecodeError`]; callers drop such frames
//! without replying.

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::types::{
    Attitude, CalibrationFrame, ChannelPatch, Command, ControlMessage, PerAxis, TelemetryFrame,
};

/// Maximum inbound frame length accepted by transports.
pub const MAX_FRAME_LENGTH: usize = 256;

/// Why a frame was not turned into a [`ControlMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame is not valid UTF-8.
    Encoding,
    /// Frame is neither a command nor a parsable object of either shape.
    Syntax,
    /// Frame parsed but matches neither the calibration nor the telemetry pattern.
    Unclassified,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encoding => write!(f, "frame is not utf-8"),
            Self::Syntax => write!(f, "malformed frame"),
            Self::Unclassified => write!(f, "unrecognized frame"),
        }
    }
}

#[derive(Deserialize)]
struct ChannelWire {
    rate: Option<f32>,
    #[serde(rename = "minPulse")]
    min_pulse: Option<i32>,
    #[serde(rename = "maxPulse")]
    max_pulse: Option<i32>,
}

impl From<ChannelWire> for ChannelPatch {
    fn from(wire: ChannelWire) -> Self {
        Self {
            rate: wire.rate,
            min_pulse: wire.min_pulse,
            max_pulse: wire.max_pulse,
        }
    }
}

/// Top-level keys that decide the frame shape. Values are skipped.
#[derive(Deserialize)]
struct FrameKeys {
    #[serde(rename = "controlEnabled")]
    control_enabled: Option<IgnoredAny>,
    enabled: Option<IgnoredAny>,
}

impl FrameKeys {
    fn is_calibration(&self) -> bool {
        self.control_enabled.is_some() && self.enabled.is_none()
    }
}

#[derive(Deserialize)]
struct CalibrationWire {
    #[serde(rename = "controlEnabled")]
    control_enabled: Option<i32>,
    #[serde(rename = "operationLocked")]
    operation_locked: Option<i32>,
    pitch: Option<ChannelWire>,
    roll: Option<ChannelWire>,
    yaw: Option<ChannelWire>,
}

#[derive(Deserialize)]
struct TelemetryWire {
    pitch: f32,
    roll: f32,
    yaw: f32,
    enabled: Option<i32>,
}

/// Parse one inbound frame into a [`ControlMessage`].
///
/// Trailing CR/LF and surrounding spaces are ignored.
///
/// # Example
///
/// ```
/// use servo_proto::{parse_message, Axis, ControlMessage};
///
/// let msg = parse_message(br#"{"pitch":10,"roll":5,"yaw":-3,"enabled":1}"#).unwrap();
/// if let ControlMessage::Telemetry(frame) = msg {
///     assert_eq!(frame.attitude[Axis::Yaw], -3.0);
///     assert_eq!(frame.enabled, Some(true));
/// }
/// ```
pub fn parse_message(frame: &[u8]) -> Result<ControlMessage, DecodeError> {
    let text = core::str::from_utf8(frame).map_err(|_| DecodeError::Encoding)?;
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());

    if let Some(command) = parse_command(text) {
        return Ok(ControlMessage::Command(command));
    }

    if !text.starts_with('{') {
        return Err(DecodeError::Syntax);
    }

    let (keys, _) =
        serde_json_core::from_str::<FrameKeys>(text).map_err(|_| DecodeError::Syntax)?;

    if keys.is_calibration() {
        return serde_json_core::from_str::<CalibrationWire>(text)
            .map(|(wire, _)| ControlMessage::Calibration(wire.into()))
            .map_err(|_| DecodeError::Unclassified);
    }

    serde_json_core::from_str::<TelemetryWire>(text)
        .map(|(wire, _)| ControlMessage::Telemetry(wire.into()))
        .map_err(|_| DecodeError::Unclassified)
}

/// Match a bare command frame.
#[inline]
fn parse_command(text: &str) -> Option<Command> {
    match text {
        "reset_servo" => Some(Command::ResetServo),
        "reset_attitude" => Some(Command::ResetAttitude),
        _ => None,
    }
}

impl From<CalibrationWire> for CalibrationFrame {
    fn from(wire: CalibrationWire) -> Self {
        Self {
            control_enabled: wire.control_enabled.is_some_and(flag),
            operation_locked: wire.operation_locked.map(flag),
            channels: PerAxis::new(
                wire.pitch.map(Into::into),
                wire.roll.map(Into::into),
                wire.yaw.map(Into::into),
            ),
        }
    }
}

impl From<TelemetryWire> for TelemetryFrame {
    fn from(wire: TelemetryWire) -> Self {
        Self {
            attitude: Attitude::new(wire.pitch, wire.roll, wire.yaw),
            enabled: wire.enabled.map(flag),
        }
    }
}

/// 0/1 integer flags: only `1` means set.
#[inline]
fn flag(value: i32) -> bool {
    value == 1
}
