//! Attitude-to-servo pulse engine for RP2040.
//!
//! This crate provides the embedded side of the engine: it reads control
//! frames from a wireless bridge over UART, drives three hobby servos with
//! PWM, and sends snapshots and acknowledgements back over the same link.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives newline-terminated frames over UART (115200 baud, 8N1)
//! 2. Applies them to the [`ServoEngine`](servo_core::ServoEngine)
//! 3. Drives the servos at 50 Hz and queues snapshots for the bridge
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Frames to the bridge |
//! | UART1 RX | 9    | Frames from the bridge |
//! | Pitch    | 12   | PWM slice 6 A |
//! | Roll     | 13   | PWM slice 6 B |
//! | Yaw      | 14   | PWM slice 7 A |
//! | LED      | 25   | On-board LED (link error indicator) |
//!
//! # Architecture
//!
//! Two Embassy tasks:
//!
//! - **Engine Task**: reads frames, runs the engine, writes PWM duty
//! - **Writer Task**: drains the outbound queue onto the UART
//!
//! The tasks share a bounded [`Channel`](embassy_sync::channel::Channel).
//! The engine never waits on it: a full queue drops the newest snapshot.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

pub use servo_core::{
    Ack, Axis, DutyOutput, EngineConfig, OutputError, ServoEngine, Snapshot, SnapshotSink,
    DEFAULT_CONFIG,
};

pub mod outbound;
pub mod pwm_output;
pub mod uart_link;

pub use outbound::{Outbound, OutboundChannel, QueueSink, MAX_OUTBOUND_LEN, OUTBOUND_QUEUE_DEPTH};
pub use pwm_output::{servo_pwm_config, PwmServoOutput};
pub use uart_link::{FrameReader, FrameWriter, LinkError};

/// UART baud rate of the bridge link.
pub const UART_BAUD_RATE: u32 = 115_200;
