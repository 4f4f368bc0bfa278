//! ServoEngine: applies control messages to the system state and drives outputs.

use servo_proto::{parse_message, Ack, Attitude, Axis, ControlMessage, Snapshot, TelemetryFrame};

use crate::config::EngineConfig;
use crate::output::{DutyOutput, SnapshotSink};
use crate::pulse::{angle_to_pulse, pulse_to_duty};
use crate::state::SystemState;
use crate::throttle::LogThrottle;

/// The mapping engine.
///
/// Owns the [`SystemState`] and two output capabilities: `D` writes PWM duty
/// for each axis, `S` broadcasts snapshots to every subscriber. All
/// operations are synchronous and run to completion; the caller serializes
/// frames.
///
/// # Error Handling
///
/// Malformed frames are dropped without touching the state. Output failures
/// are logged and ignored: an update is never aborted half-way, and nothing
/// is retried.
pub struct ServoEngine<D, S> {
    pub(crate) state: SystemState,
    pub(crate) config: EngineConfig,
    pub(crate) duty: D,
    pub(crate) sink: S,
    throttle: LogThrottle,
}

impl<D: DutyOutput, S: SnapshotSink> ServoEngine<D, S> {
    /// Create an engine with the given configuration.
    ///
    /// Hardware is not touched until the first telemetry frame or reset. Call
    /// [`servo_reset`](Self::servo_reset) at startup to center the servos.
    pub fn new(config: EngineConfig, duty: D, sink: S) -> Self {
        Self {
            state: SystemState::new(&config),
            throttle: LogThrottle::new(config.log_interval_ms),
            config,
            duty,
            sink,
        }
    }

    /// Decode one inbound frame and apply it.
    ///
    /// Returns the acknowledgement owed to the sender, if any. Frames that do
    /// not decode are ignored.
    pub fn handle_message(&mut self, frame: &[u8], now_ms: u64) -> Option<Ack> {
        match parse_message(frame) {
            Ok(message) => self.apply(message, now_ms),
            Err(e) => {
                trace!("ignoring frame: {}", e);
                None
            }
        }
    }

    /// Apply an already classified message.
    pub fn apply(&mut self, message: ControlMessage, now_ms: u64) -> Option<Ack> {
        match message {
            ControlMessage::Calibration(frame) => {
                self.state.apply_calibration(&frame);
                debug!(
                    "calibration: control_enabled={} operation_locked={}",
                    self.state.control_enabled,
                    self.state.operation_locked
                );
                None
            }
            ControlMessage::Telemetry(frame) => {
                self.apply_telemetry(&frame, now_ms);
                None
            }
            ControlMessage::Command(command) => {
                self.run_command(command);
                Some(command.ack())
            }
        }
    }

    fn apply_telemetry(&mut self, frame: &TelemetryFrame, now_ms: u64) {
        if let Some(enabled) = frame.enabled {
            self.state.control_enabled = enabled;
        }
        self.update_gyro_data(frame.attitude, now_ms);
    }

    /// Telemetry update path.
    ///
    /// Stores the raw angles and remaps every channel. Pulse widths and
    /// hardware follow only while control is enabled. A snapshot is
    /// broadcast either way.
    pub fn update_gyro_data(&mut self, attitude: Attitude, now_ms: u64) {
        for (axis, raw) in attitude.iter() {
            let channel = &mut self.state.channels[axis];
            channel.raw_value = *raw;
            channel.remap();
        }

        if self.state.control_enabled {
            self.recompute_pulses();
            self.drive_outputs();
        }

        self.broadcast();

        if self.throttle.ready(now_ms) {
            let pitch = self.state.channel(Axis::Pitch);
            let roll = self.state.channel(Axis::Roll);
            let yaw = self.state.channel(Axis::Yaw);
            info!(
                "pitch {} -> {}us, roll {} -> {}us, yaw {} -> {}us",
                pitch.mapped_value,
                pitch.pulse_width,
                roll.mapped_value,
                roll.pulse_width,
                yaw.mapped_value,
                yaw.pulse_width
            );
        }
    }

    /// Current system state.
    pub fn state(&self) -> &SystemState {
        &self.state
    }

    /// Current mapped values and pulse widths.
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a reference to the duty output.
    pub fn duty_output(&self) -> &D {
        &self.duty
    }

    /// Get a mutable reference to the duty output.
    pub fn duty_output_mut(&mut self) -> &mut D {
        &mut self.duty
    }

    /// Get a reference to the snapshot sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the snapshot sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Decompose the engine into its output components.
    pub fn into_parts(self) -> (D, S) {
        (self.duty, self.sink)
    }

    pub(crate) fn recompute_pulses(&mut self) {
        for channel in self.state.channels.0.iter_mut() {
            channel.pulse_width = angle_to_pulse(
                channel.mapped_value,
                channel.rate,
                channel.min_pulse,
                channel.max_pulse,
            );
        }
    }

    /// Write the current pulse width of every channel to the hardware.
    pub(crate) fn drive_outputs(&mut self) {
        for axis in Axis::ALL {
            let duty = pulse_to_duty(self.state.channels[axis].pulse_width, &self.config.timing);
            if let Err(e) = self.duty.set_duty(axis, duty) {
                warn!("set_duty failed on {}: {}", axis.name(), e);
            }
        }
    }

    pub(crate) fn broadcast(&mut self) {
        let snapshot = self.state.snapshot();
        if let Err(e) = self.sink.publish(&snapshot) {
            warn!("snapshot broadcast failed: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::output::OutputError;
    use std::sync::{Arc, Mutex};
    use std::vec::Vec;

    /// Records every duty write.
    #[derive(Clone, Default)]
    pub(crate) struct MockDuty {
        pub(crate) writes: Arc<Mutex<Vec<(Axis, u16)>>>,
        pub(crate) fail: bool,
    }

    impl DutyOutput for MockDuty {
        fn set_duty(&mut self, axis: Axis, duty: u16) -> Result<(), OutputError> {
            self.writes.lock().unwrap().push((axis, duty));
            if self.fail {
                Err(OutputError::Busy)
            } else {
                Ok(())
            }
        }
    }

    /// Records every published snapshot.
    #[derive(Clone, Default)]
    pub(crate) struct MockSink {
        pub(crate) published: Arc<Mutex<Vec<Snapshot>>>,
        pub(crate) fail: bool,
    }

    impl SnapshotSink for MockSink {
        fn publish(&mut self, snapshot: &Snapshot) -> Result<(), OutputError> {
            self.published.lock().unwrap().push(*snapshot);
            if self.fail {
                Err(OutputError::Dropped)
            } else {
                Ok(())
            }
        }
    }

    pub(crate) fn engine() -> (ServoEngine<MockDuty, MockSink>, MockDuty, MockSink) {
        let duty = MockDuty::default();
        let sink = MockSink::default();
        let engine = ServoEngine::new(DEFAULT_CONFIG, duty.clone(), sink.clone());
        (engine, duty, sink)
    }

    #[test]
    fn test_new_engine_is_centered_and_silent() {
        let (engine, duty, sink) = engine();
        assert_eq!(engine.snapshot().pulse.0, [1500, 1500, 1500]);
        assert!(duty.writes.lock().unwrap().is_empty());
        assert!(sink.published.lock().unwrap().is_empty());
    }

    #[test]
    fn test_telemetry_maps_to_pulse() {
        let (mut engine, duty, sink) = engine();
        let ack = engine.handle_message(br#"{"pitch":36,"roll":0,"yaw":-36}"#, 0);
        assert_eq!(ack, None);

        let state = engine.state();
        assert_eq!(state.channel(Axis::Pitch).pulse_width, 1700);
        assert_eq!(state.channel(Axis::Roll).pulse_width, 1500);
        assert_eq!(state.channel(Axis::Yaw).pulse_width, 1300);

        let writes = duty.writes.lock().unwrap();
        assert_eq!(
            *writes,
            [(Axis::Pitch, 348u16), (Axis::Roll, 307), (Axis::Yaw, 266)]
        );

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].mapped.0, [36.0, 0.0, -36.0]);
        assert_eq!(published[0].pulse.0, [1700, 1500, 1300]);
    }

    #[test]
    fn test_telemetry_respects_calibrated_bounds() {
        let (mut engine, _, _) = engine();
        engine.handle_message(
            br#"{"controlEnabled":1,"pitch":{"minPulse":1000,"maxPulse":2000}}"#,
            0,
        );
        engine.handle_message(br#"{"pitch":100,"roll":0,"yaw":0}"#, 0);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 2000);

        engine.handle_message(br#"{"pitch":-100,"roll":0,"yaw":0}"#, 0);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1000);
    }

    #[test]
    fn test_pulse_stays_within_bounds() {
        let (mut engine, _, _) = engine();
        engine.handle_message(
            br#"{"controlEnabled":1,"roll":{"rate":50.0,"minPulse":900,"maxPulse":2100}}"#,
            0,
        );
        for raw in [-1000.0, -180.0, -12.3, 0.0, 7.7, 179.9, 400.0] {
            engine.update_gyro_data(Attitude::splat(raw), 0);
            for (_, channel) in engine.state().channels.iter() {
                assert!(channel.min_pulse <= channel.pulse_width);
                assert!(channel.pulse_width <= channel.max_pulse);
                assert!((-180.0..=180.0).contains(&channel.mapped_value));
            }
        }
    }

    #[test]
    fn test_control_disabled_freezes_pulses() {
        let (mut engine, duty, sink) = engine();
        engine.handle_message(br#"{"pitch":36,"roll":0,"yaw":0}"#, 0);
        duty.writes.lock().unwrap().clear();

        engine.handle_message(br#"{"controlEnabled":0}"#, 10);
        assert!(!engine.state().control_enabled);

        engine.handle_message(br#"{"pitch":-50,"roll":20,"yaw":90}"#, 20);
        let state = engine.state();
        assert_eq!(state.channel(Axis::Pitch).raw_value, -50.0);
        assert_eq!(state.channel(Axis::Pitch).mapped_value, -50.0);
        assert_eq!(state.channel(Axis::Yaw).mapped_value, 90.0);
        assert_eq!(state.channel(Axis::Pitch).pulse_width, 1700);
        assert_eq!(state.channel(Axis::Yaw).pulse_width, 1500);
        assert!(duty.writes.lock().unwrap().is_empty());

        // Snapshot still goes out, with fresh angles and frozen pulses
        let published = sink.published.lock().unwrap();
        let last = published.last().unwrap();
        assert_eq!(last.mapped.0, [-50.0, 20.0, 90.0]);
        assert_eq!(last.pulse.0, [1700, 1500, 1500]);
    }

    #[test]
    fn test_telemetry_enabled_flag_overrides_gate() {
        let (mut engine, duty, _) = engine();
        engine.handle_message(br#"{"controlEnabled":0}"#, 0);

        engine.handle_message(br#"{"pitch":36,"roll":0,"yaw":0,"enabled":1}"#, 0);
        assert!(engine.state().control_enabled);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1700);
        assert_eq!(duty.writes.lock().unwrap().len(), 3);

        engine.handle_message(br#"{"pitch":0,"roll":0,"yaw":0,"enabled":0}"#, 0);
        assert!(!engine.state().control_enabled);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1700);
    }

    #[test]
    fn test_calibration_does_not_broadcast() {
        let (mut engine, duty, sink) = engine();
        let ack = engine.handle_message(
            br#"{"controlEnabled":1,"operationLocked":0,"pitch":{"rate":2.0}}"#,
            0,
        );
        assert_eq!(ack, None);
        assert!(!engine.state().operation_locked);
        assert_eq!(engine.state().channel(Axis::Pitch).rate, 2.0);
        assert!(duty.writes.lock().unwrap().is_empty());
        assert!(sink.published.lock().unwrap().is_empty());
    }

    #[test]
    fn test_calibration_flags_only_keeps_channels() {
        let (mut engine, _, _) = engine();
        engine.handle_message(br#"{"controlEnabled":0,"operationLocked":0}"#, 0);
        let before = engine.state().channels;

        engine.handle_message(br#"{"controlEnabled":1,"operationLocked":1}"#, 0);
        assert!(engine.state().control_enabled);
        assert!(engine.state().operation_locked);
        assert_eq!(engine.state().channels, before);
    }

    #[test]
    fn test_control_enabled_frame_with_angles_moves_nothing() {
        let (mut engine, duty, sink) = engine();
        let before = *engine.state();

        let ack = engine.handle_message(br#"{"controlEnabled":0,"pitch":36,"roll":0,"yaw":0}"#, 0);
        assert_eq!(ack, None);
        assert_eq!(*engine.state(), before);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1500);
        assert!(duty.writes.lock().unwrap().is_empty());
        assert!(sink.published.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unrecognized_frame_changes_nothing() {
        let (mut engine, duty, sink) = engine();
        engine.handle_message(br#"{"pitch":10,"roll":5,"yaw":-3}"#, 0);
        let before = *engine.state();
        duty.writes.lock().unwrap().clear();
        sink.published.lock().unwrap().clear();

        let frames: [&[u8]; 5] = [
            br#"{"foo":1}"#,
            b"",
            b"reset",
            b"{\"pitch\":",
            &[0xff, 0xfe],
        ];
        for frame in frames {
            assert_eq!(engine.handle_message(frame, 0), None);
        }

        assert_eq!(*engine.state(), before);
        assert!(duty.writes.lock().unwrap().is_empty());
        assert!(sink.published.lock().unwrap().is_empty());
    }

    #[test]
    fn test_output_failures_do_not_abort_update() {
        let duty = MockDuty {
            fail: true,
            ..MockDuty::default()
        };
        let sink = MockSink {
            fail: true,
            ..MockSink::default()
        };
        let mut engine = ServoEngine::new(DEFAULT_CONFIG, duty.clone(), sink.clone());

        engine.update_gyro_data(Attitude::new(36.0, 0.0, 0.0), 0);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1700);
        // Every axis was attempted despite the first failure
        assert_eq!(duty.writes.lock().unwrap().len(), 3);
        assert_eq!(sink.published.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_log_throttle_does_not_affect_outputs() {
        let (mut engine, duty, sink) = engine();
        for now_ms in [0, 1, 2, 3, 4] {
            engine.update_gyro_data(Attitude::new(now_ms as f32, 0.0, 0.0), now_ms);
        }
        assert_eq!(duty.writes.lock().unwrap().len(), 15);
        assert_eq!(sink.published.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_into_parts() {
        let (engine, _, _) = engine();
        let (duty, sink) = engine.into_parts();
        assert!(duty.writes.lock().unwrap().is_empty());
        assert!(sink.published.lock().unwrap().is_empty());
    }
}
