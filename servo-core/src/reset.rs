//! Reset state machine: servo reset and attitude reset.

use servo_proto::Command;

use crate::channel::map_angle;
use crate::config::CENTER_PULSE_US;
use crate::engine::ServoEngine;
use crate::output::{DutyOutput, SnapshotSink};

impl<D: DutyOutput, S: SnapshotSink> ServoEngine<D, S> {
    pub(crate) fn run_command(&mut self, command: Command) {
        info!("command: {}", command.as_str());
        match command {
            Command::ResetServo => self.servo_reset(),
            Command::ResetAttitude => self.attitude_reset(),
        }
    }

    /// Center every servo.
    ///
    /// Bypasses the control gate. Offsets and mapped values are kept.
    /// Idempotent.
    pub fn servo_reset(&mut self) {
        for channel in self.state.channels.0.iter_mut() {
            channel.pulse_width = CENTER_PULSE_US;
        }
        self.drive_outputs();
        self.broadcast();
    }

    /// Make the current orientation the new zero.
    ///
    /// Every offset takes the last raw value, so every mapped value becomes 0.
    /// Pulses and hardware follow only while control is enabled.
    pub fn attitude_reset(&mut self) {
        for channel in self.state.channels.0.iter_mut() {
            channel.offset = channel.raw_value;
            channel.mapped_value = map_angle(channel.raw_value, channel.offset);
        }
        if self.state.control_enabled {
            self.recompute_pulses();
            self.drive_outputs();
        }
        self.broadcast();
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::tests::engine;
    use servo_proto::{Ack, Attitude, Axis};

    #[test]
    fn test_servo_reset_centers_everything() {
        let (mut engine, duty, sink) = engine();
        engine.update_gyro_data(Attitude::new(36.0, -20.0, 90.0), 0);
        duty.writes.lock().unwrap().clear();

        let ack = engine.handle_message(b"reset_servo", 0);
        assert_eq!(ack, Some(Ack::ServoReset));

        assert_eq!(engine.snapshot().pulse.0, [1500, 1500, 1500]);
        // Mapped values survive a servo reset
        assert_eq!(engine.snapshot().mapped.0, [36.0, -20.0, 90.0]);
        assert_eq!(
            *duty.writes.lock().unwrap(),
            [(Axis::Pitch, 307u16), (Axis::Roll, 307), (Axis::Yaw, 307)]
        );
        assert_eq!(sink.published.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_startup_reset_centers_fresh_engine() {
        let (mut engine, duty, sink) = engine();
        engine.servo_reset();

        assert_eq!(
            *duty.writes.lock().unwrap(),
            [(Axis::Pitch, 307u16), (Axis::Roll, 307), (Axis::Yaw, 307)]
        );
        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].pulse.0, [1500, 1500, 1500]);
        assert_eq!(published[0].mapped.0, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_servo_reset_is_idempotent() {
        let (mut engine, _, _) = engine();
        engine.update_gyro_data(Attitude::new(10.0, 20.0, 30.0), 0);
        engine.servo_reset();
        let once = *engine.state();
        engine.servo_reset();
        assert_eq!(*engine.state(), once);
    }

    #[test]
    fn test_servo_reset_bypasses_control_gate() {
        let (mut engine, duty, _) = engine();
        engine.update_gyro_data(Attitude::new(36.0, 0.0, 0.0), 0);
        engine.handle_message(br#"{"controlEnabled":0}"#, 0);
        duty.writes.lock().unwrap().clear();

        engine.servo_reset();
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1500);
        assert_eq!(duty.writes.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_attitude_reset_zeroes_mapped() {
        let (mut engine, _, sink) = engine();
        engine.update_gyro_data(Attitude::new(36.0, -20.0, 250.0), 0);

        let ack = engine.handle_message(b"reset_attitude\r\n", 0);
        assert_eq!(ack, Some(Ack::AttitudeReset));

        for (_, channel) in engine.state().channels.iter() {
            assert_eq!(channel.mapped_value, 0.0);
            assert_eq!(channel.offset, channel.raw_value);
            assert_eq!(channel.pulse_width, 1500);
        }
        assert_eq!(engine.state().channel(Axis::Yaw).offset, 250.0);

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1].mapped.0, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_attitude_reset_then_telemetry_is_relative() {
        let (mut engine, _, _) = engine();
        engine.update_gyro_data(Attitude::new(10.0, 0.0, 0.0), 0);
        engine.attitude_reset();
        engine.update_gyro_data(Attitude::new(46.0, 0.0, 0.0), 0);
        assert_eq!(engine.state().channel(Axis::Pitch).mapped_value, 36.0);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1700);
    }

    #[test]
    fn test_attitude_reset_with_control_disabled_keeps_pulses() {
        let (mut engine, duty, sink) = engine();
        engine.update_gyro_data(Attitude::new(36.0, 0.0, 0.0), 0);
        engine.handle_message(br#"{"controlEnabled":0}"#, 0);
        duty.writes.lock().unwrap().clear();
        sink.published.lock().unwrap().clear();

        engine.attitude_reset();
        assert_eq!(engine.state().channel(Axis::Pitch).mapped_value, 0.0);
        assert_eq!(engine.state().channel(Axis::Pitch).pulse_width, 1700);
        assert!(duty.writes.lock().unwrap().is_empty());
        // Broadcast happens regardless of the gate
        assert_eq!(sink.published.lock().unwrap().len(), 1);
    }
}
