//! Engine configuration.
//!
//! Configuration is fixed at compile time. Customize it by creating your own
//! const, starting from [`DEFAULT_CONFIG`].

use crate::pulse::PwmTiming;

/// Center pulse width in microseconds.
pub const CENTER_PULSE_US: i32 = 1500;

/// Default degrees-to-microseconds sensitivity.
pub const DEFAULT_RATE: f32 = 5.55;

/// Default lower pulse bound in microseconds.
pub const DEFAULT_MIN_PULSE_US: i32 = 500;

/// Default upper pulse bound in microseconds.
pub const DEFAULT_MAX_PULSE_US: i32 = 2500;

/// Mapped angles are clamped to +/- this many degrees.
pub const MAX_MAPPED_ANGLE: f32 = 180.0;

/// Calibration applied to every channel at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelDefaults {
    pub rate: f32,
    pub min_pulse: i32,
    pub max_pulse: i32,
}

/// Startup configuration of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// PWM carrier used to turn pulse widths into duty values.
    pub timing: PwmTiming,
    /// Minimum spacing of telemetry diagnostics.
    pub log_interval_ms: u64,
    /// Initial calibration of every channel.
    pub channel: ChannelDefaults,
    /// Initial value of the control gate.
    pub control_enabled: bool,
    /// Initial value of the advisory lock flag.
    pub operation_locked: bool,
}

/// Default configuration: 50 Hz, 12-bit PWM, 1 s diagnostics, control enabled
/// and operation locked.
pub const DEFAULT_CONFIG: EngineConfig = EngineConfig {
    timing: PwmTiming::SERVO_50HZ_12BIT,
    log_interval_ms: 1000,
    channel: ChannelDefaults {
        rate: DEFAULT_RATE,
        min_pulse: DEFAULT_MIN_PULSE_US,
        max_pulse: DEFAULT_MAX_PULSE_US,
    },
    control_enabled: true,
    operation_locked: true,
};

impl Default for EngineConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}
