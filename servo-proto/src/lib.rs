//! Control protocol types, decoding, and serialization for the attitude servo engine.
//!
//! This crate provides everything needed to talk to the engine:
//!
//! - **Types**: Core data structures for the protocol
//!   - [`Axis`] / [`PerAxis`] - The three servo axes and per-axis values
//!   - [`CalibrationFrame`], [`TelemetryFrame`], [`Command`] - Inbound messages
//!   - [`Snapshot`] - Outbound broadcast
//!   - [`Ack`] - Reply to the client that issued a command
//!
//! - **Decoding**: Classify and parse inbound frames
//!   - [`parse_message()`] - Parse any inbound frame
//!   - [`ControlMessage`] - Result of decoding
//!
//! - **Serialization**: Write outbound snapshots
//!   - [`Serialize`] trait - Extension trait for serialization
//!
//! # Protocol Format
//!
//! Frames are text. Structured frames are flat JSON objects with at most one
//! level of nesting (per-channel calibration objects).
//!
//! ## Calibration
//!
//! ```text
//! {"controlEnabled":1,"operationLocked":0,"pitch":{"rate":5.55,"minPulse":500,"maxPulse":2500},"roll":{...},"yaw":{...}}
//! ```
//!
//! Every field is optional except `controlEnabled`; absent fields leave the
//! engine state untouched.
//!
//! ## Telemetry
//!
//! ```text
//! {"pitch":12.5,"roll":-3.0,"yaw":90.0,"enabled":1}
//! ```
//!
//! ## Commands
//!
//! ```text
//! reset_servo
//! reset_attitude
//! ```
//!
//! ## Snapshot (outbound)
//!
//! ```text
//! {"pitch_mapped":12.5,"roll_mapped":-3.0,"yaw_mapped":90.0,"pitch_pulse":1569,"roll_pulse":1483,"yaw_pulse":2000}
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//! - **`heapless`**: Enable `serialize_to_vec()`
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod decode;
pub mod format;
pub mod serialize;
pub mod types;

// Re-export types at crate root for convenience
pub use decode::{parse_message, DecodeError, MAX_FRAME_LENGTH};
pub use serialize::{Serialize, SerializeError, MAX_SNAPSHOT_SIZE};
pub use types::{
    Ack, Attitude, Axis, CalibrationFrame, ChannelPatch, Command, ControlMessage, PerAxis,
    Snapshot, TelemetryFrame, GREETING,
};
