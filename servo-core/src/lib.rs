//! Platform-agnostic attitude-to-servo pulse engine.
//!
//! This crate maps three orientation angles (pitch, roll, yaw) received from a
//! remote client onto three servo pulse widths, and keeps per-channel
//! calibration between frames. It is `no_std` and allocation-free, so the same
//! code runs in firmware and in host tests.
//!
//! # Architecture
//!
//! ```text
//! frame bytes ──► parse_message() ──► ServoEngine ──► DutyOutput (PWM)
//!                                         │
//!                                         └─────────► SnapshotSink (broadcast)
//! ```
//!
//! - [`ServoEngine`] owns the [`SystemState`] and applies calibration frames,
//!   telemetry frames, and reset commands.
//! - [`DutyOutput`] and [`SnapshotSink`] are the hardware and transport
//!   capabilities supplied by the platform.
//! - [`pulse`] holds the pure angle/pulse/duty arithmetic.
//!
//! # Example
//!
//! ```
//! use servo_core::{Ack, NullOutput, ServoEngine, DEFAULT_CONFIG};
//!
//! let mut engine = ServoEngine::new(DEFAULT_CONFIG, NullOutput, NullOutput);
//! engine.handle_message(br#"{"pitch":36,"roll":0,"yaw":0}"#, 0);
//! assert_eq!(engine.snapshot().pulse.0, [1700, 1500, 1500]);
//!
//! assert_eq!(engine.handle_message(b"reset_servo", 0), Some(Ack::ServoReset));
//! assert_eq!(engine.snapshot().pulse.0, [1500, 1500, 1500]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through `defmt` and derive `defmt::Format`
//! - **`log`**: Log through the `log` facade
//! - **`heapless`**: Enable heapless Vec serialization in `servo-proto`

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod channel;
pub mod config;
pub mod engine;
pub mod output;
pub mod pulse;
mod reset;
pub mod state;
pub mod throttle;

pub use channel::{map_angle, Channel};
pub use config::{EngineConfig, DEFAULT_CONFIG};
pub use engine::ServoEngine;
pub use output::{DutyOutput, NullOutput, OutputError, SnapshotSink};
pub use pulse::{angle_to_pulse, pulse_to_duty, PwmTiming};
pub use state::SystemState;
pub use throttle::LogThrottle;

// Re-export the protocol crate for convenience
pub use servo_proto;
pub use servo_proto::{Ack, Attitude, Axis, Command, ControlMessage, Snapshot};
