//! # Drive Controller Module
//!
//! Maps joystick input to the two DC wheel motors of the differential-drive
//! chassis.
//!
//! ## Mixing
//!
//! Joystick 1 X sets the common wheel speed and the direction, joystick 2 Y
//! biases one wheel against the other to turn:
//!
//! | Joystick 2 Y | Left wheel | Right wheel |
//! |--------------|------------|-------------|
//! | below center | speed - turn | speed + turn |
//! | above center | speed + turn | speed - turn |
//! | center | speed | speed |
//!
//! Both offsets are divided by [`DRIVE_SPEED_DIVISOR`] first, so offsets of
//! less than 5 from neutral fall in the deadzone. With both sticks in the
//! deadzone the wheels brake.
//!
//! Direction is [`Direction::Forward`] when joystick 1 X is at or below
//! neutral and [`Direction::Backward`] above it.
//!
//! ## Clamping
//!
//! The mixed left duty is only floored at `pwm_min` and the right duty is only
//! capped at `pwm_max`. The asymmetry is kept as-is in [`compute_drive`];
//! [`DriveController`] saturates both duties to the full range before they
//! reach the timer.
//!
//! ## Usage
//!
//! ```
//! use carbot::control::drive::{compute_drive, Direction, DriveLimits};
//! use carbot::control::frame::ControlFrame;
//!
//! let frame = ControlFrame::new([12, 512, 512, 412])?;
//! let command = compute_drive(&frame, &DriveLimits::default());
//!
//! assert_eq!(command.direction, Direction::Forward);
//! assert_eq!(command.left_pwm, 80);
//! assert_eq!(command.right_pwm, 100);
//! # Ok::<(), carbot::error::CarbotError>(())
//! ```

use std::cmp::Ordering;

use tracing::{debug, info};

use super::frame::{axes, ControlFrame};
use crate::actuator::{to_compare, ActuationSink, DirectionPin, PinLevel, PwmChannel};
use crate::error::Result;

/// Lowest wheel duty (motor stopped).
pub const PWM_MIN: i32 = 0;
/// Highest wheel duty (timer period).
pub const PWM_MAX: i32 = 100;
/// Divisor from joystick offset to wheel duty.
pub const DRIVE_SPEED_DIVISOR: i32 = 5;

/// Wheel rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Brake,
}

impl Direction {
    /// H-bridge input levels for this direction.
    ///
    /// Left wheel uses IN1/IN2, right wheel uses IN3/IN4.
    ///
    /// # Examples
    ///
    /// ```
    /// use carbot::actuator::PinLevel;
    /// use carbot::control::drive::Direction;
    ///
    /// let levels = Direction::Brake.pin_levels();
    /// assert!(levels.iter().all(|&(_, level)| level == PinLevel::High));
    /// ```
    #[must_use]
    pub fn pin_levels(self) -> [(DirectionPin, PinLevel); 4] {
        use PinLevel::{High, Low};

        let (in1, in2) = match self {
            Direction::Forward => (High, Low),
            Direction::Backward => (Low, High),
            Direction::Brake => (High, High),
        };

        [
            (DirectionPin::LeftIn1, in1),
            (DirectionPin::LeftIn2, in2),
            (DirectionPin::RightIn3, in1),
            (DirectionPin::RightIn4, in2),
        ]
    }
}

/// Direction plus per-wheel duty for one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommand {
    pub direction: Direction,
    pub left_pwm: i32,
    pub right_pwm: i32,
}

/// Wheel duty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveLimits {
    pub pwm_min: i32,
    pub pwm_max: i32,
}

impl Default for DriveLimits {
    fn default() -> Self {
        Self {
            pwm_min: PWM_MIN,
            pwm_max: PWM_MAX,
        }
    }
}

impl DriveLimits {
    /// Creates limits from a duty range.
    #[must_use]
    pub fn new(pwm_min: i32, pwm_max: i32) -> Self {
        Self { pwm_min, pwm_max }
    }

    /// Saturates a duty into `pwm_min..=pwm_max`.
    #[inline]
    #[must_use]
    pub fn saturate(&self, duty: i32) -> i32 {
        duty.clamp(self.pwm_min, self.pwm_max)
    }
}

/// Computes the wheel command for one frame.
///
/// Pure and stateless; see the module docs for the mixing table.
#[must_use]
pub fn compute_drive(frame: &ControlFrame, limits: &DriveLimits) -> WheelCommand {
    let speed = frame.offset(axes::JOYSTICK1_X) / DRIVE_SPEED_DIVISOR;
    let turn = frame.offset(axes::JOYSTICK2_Y) / DRIVE_SPEED_DIVISOR;

    if speed == 0 && turn == 0 {
        return WheelCommand {
            direction: Direction::Brake,
            left_pwm: limits.pwm_min,
            right_pwm: limits.pwm_min,
        };
    }

    let direction = if speed <= 0 {
        Direction::Forward
    } else {
        Direction::Backward
    };

    let mut left_pwm = speed.abs();
    let mut right_pwm = speed.abs();

    match turn.cmp(&0) {
        // Turning left
        Ordering::Less => {
            right_pwm += turn.abs();
            left_pwm -= turn.abs();
        }
        // Turning right
        Ordering::Greater => {
            left_pwm += turn.abs();
            right_pwm -= turn.abs();
        }
        Ordering::Equal => {}
    }

    WheelCommand {
        direction,
        left_pwm: left_pwm.max(limits.pwm_min),
        right_pwm: right_pwm.min(limits.pwm_max),
    }
}

/// Drives the wheel motors through an [`ActuationSink`].
///
/// Stateless: every call recomputes the command from the frame alone.
#[derive(Debug, Clone, Default)]
pub struct DriveController {
    limits: DriveLimits,
}

impl DriveController {
    #[must_use]
    pub fn new(limits: DriveLimits) -> Self {
        Self { limits }
    }

    /// Starts both wheel channels at minimum duty.
    pub fn init<S: ActuationSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        for channel in PwmChannel::WHEELS {
            sink.start_pwm(channel)?;
        }
        self.write_duty(sink, self.limits.pwm_min, self.limits.pwm_min)?;
        info!("Drive controller initialized");
        Ok(())
    }

    /// Writes minimum duty and stops both wheel channels.
    pub fn terminate<S: ActuationSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        self.write_duty(sink, self.limits.pwm_min, self.limits.pwm_min)?;
        for channel in PwmChannel::WHEELS {
            sink.stop_pwm(channel)?;
        }
        info!("Drive controller terminated");
        Ok(())
    }

    /// Computes and applies the wheel command for one frame.
    ///
    /// Direction pins are written before the duties.
    ///
    /// # Returns
    ///
    /// The command as computed by [`compute_drive`], before saturation.
    pub fn apply<S: ActuationSink + ?Sized>(
        &self,
        frame: &ControlFrame,
        sink: &mut S,
    ) -> Result<WheelCommand> {
        let command = compute_drive(frame, &self.limits);

        for (pin, level) in command.direction.pin_levels() {
            sink.set_digital_pin(pin, level)?;
        }
        self.write_duty(sink, command.left_pwm, command.right_pwm)?;

        debug!(
            "Drive {:?}: left={} right={}",
            command.direction, command.left_pwm, command.right_pwm
        );
        Ok(command)
    }

    fn write_duty<S: ActuationSink + ?Sized>(&self, sink: &mut S, left: i32, right: i32) -> Result<()> {
        sink.set_pwm(PwmChannel::LeftWheel, to_compare(self.limits.saturate(left)))?;
        sink.set_pwm(PwmChannel::RightWheel, to_compare(self.limits.saturate(right)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::sink_trait::mocks::{RecordingSink, SinkCall};
    use crate::actuator::sink_trait::MockActuationSink;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn frame(values: [i32; 4]) -> ControlFrame {
        ControlFrame::new(values).unwrap()
    }

    fn drive(values: [i32; 4]) -> WheelCommand {
        compute_drive(&frame(values), &DriveLimits::default())
    }

    // ==================== compute_drive Tests ====================

    #[test]
    fn test_idle_brakes() {
        let command = drive([512, 512, 512, 512]);
        assert_eq!(command.direction, Direction::Brake);
        assert_eq!(command.left_pwm, PWM_MIN);
        assert_eq!(command.right_pwm, PWM_MIN);
    }

    #[test]
    fn test_deadzone_brakes() {
        // Offsets of magnitude < 5 truncate to zero
        let command = drive([516, 0, 1023, 508]);
        assert_eq!(command.direction, Direction::Brake);
        assert_eq!(command.left_pwm, PWM_MIN);
        assert_eq!(command.right_pwm, PWM_MIN);
    }

    #[test]
    fn test_ignores_unused_axes() {
        assert_eq!(drive([512, 0, 1023, 512]), drive([512, 512, 512, 512]));
    }

    #[test]
    fn test_stick_up_is_backward() {
        let command = drive([1012, 512, 512, 512]);
        assert_eq!(command.direction, Direction::Backward);
        assert_eq!(command.left_pwm, 100);
        assert_eq!(command.right_pwm, 100);
    }

    #[test]
    fn test_stick_down_is_forward() {
        let command = drive([12, 512, 512, 512]);
        assert_eq!(command.direction, Direction::Forward);
        assert_eq!(command.left_pwm, 100);
        assert_eq!(command.right_pwm, 100);
    }

    #[test]
    fn test_left_turn_biases_right_wheel() {
        let command = drive([12, 512, 512, 412]);
        assert_eq!(command.direction, Direction::Forward);
        assert_eq!(command.left_pwm, 80);
        // 120 capped at PWM_MAX
        assert_eq!(command.right_pwm, PWM_MAX);
    }

    #[test]
    fn test_right_turn_biases_left_wheel() {
        let command = drive([262, 512, 512, 612]);
        // speed = -50, turn = 20
        assert_eq!(command.direction, Direction::Forward);
        assert_eq!(command.left_pwm, 70);
        assert_eq!(command.right_pwm, 30);
    }

    #[test]
    fn test_turn_in_place_is_forward() {
        // Zero speed counts as forward once the turn stick leaves the deadzone
        let command = drive([512, 512, 512, 412]);
        assert_eq!(command.direction, Direction::Forward);
        assert_eq!(command.left_pwm, PWM_MIN);
        assert_eq!(command.right_pwm, 20);
    }

    #[test]
    fn test_left_is_not_capped() {
        // speed = 100, turn = 100: left exceeds PWM_MAX, right drops to 0
        let command = drive([1012, 512, 512, 1012]);
        assert_eq!(command.direction, Direction::Backward);
        assert_eq!(command.left_pwm, 200);
        assert_eq!(command.right_pwm, 0);
    }

    #[test]
    fn test_right_is_not_floored() {
        // speed = 0, turn = 102: right goes negative
        let command = drive([512, 512, 512, 1023]);
        assert_eq!(command.left_pwm, 102);
        assert_eq!(command.right_pwm, -102);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // -9 / 5 = -1, 9 / 5 = 1
        assert_eq!(drive([503, 512, 512, 512]).left_pwm, 1);
        assert_eq!(drive([503, 512, 512, 512]).direction, Direction::Forward);
        assert_eq!(drive([521, 512, 512, 512]).left_pwm, 1);
        assert_eq!(drive([521, 512, 512, 512]).direction, Direction::Backward);
    }

    #[test]
    fn test_bounds_hold_for_all_inputs() {
        let limits = DriveLimits::default();
        for x in (0..=1023).step_by(3) {
            for y in (0..=1023).step_by(3) {
                let command = compute_drive(&frame([x, 512, 512, y]), &limits);
                assert!(command.left_pwm >= PWM_MIN, "left below min for x={} y={}", x, y);
                assert!(command.right_pwm <= PWM_MAX, "right above max for x={} y={}", x, y);
            }
        }
    }

    #[test]
    fn test_custom_limits() {
        let limits = DriveLimits::new(10, 50);
        let command = compute_drive(&frame([12, 512, 512, 412]), &limits);
        assert_eq!(command.left_pwm, 80);
        assert_eq!(command.right_pwm, 50);

        let idle = compute_drive(&ControlFrame::centered(), &limits);
        assert_eq!(idle.left_pwm, 10);
        assert_eq!(idle.right_pwm, 10);
    }

    // ==================== Pin Table Tests ====================

    #[test]
    fn test_forward_pin_levels() {
        assert_eq!(
            Direction::Forward.pin_levels(),
            [
                (DirectionPin::LeftIn1, PinLevel::High),
                (DirectionPin::LeftIn2, PinLevel::Low),
                (DirectionPin::RightIn3, PinLevel::High),
                (DirectionPin::RightIn4, PinLevel::Low),
            ]
        );
    }

    #[test]
    fn test_backward_pin_levels() {
        assert_eq!(
            Direction::Backward.pin_levels(),
            [
                (DirectionPin::LeftIn1, PinLevel::Low),
                (DirectionPin::LeftIn2, PinLevel::High),
                (DirectionPin::RightIn3, PinLevel::Low),
                (DirectionPin::RightIn4, PinLevel::High),
            ]
        );
    }

    #[test]
    fn test_brake_pin_levels() {
        for (_, level) in Direction::Brake.pin_levels() {
            assert_eq!(level, PinLevel::High);
        }
    }

    // ==================== DriveController Tests ====================

    #[test]
    fn test_init_starts_channels_at_min() {
        let mut sink = MockActuationSink::new();
        let mut seq = Sequence::new();

        for channel in PwmChannel::WHEELS {
            sink.expect_start_pwm()
                .with(eq(channel))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }
        for channel in PwmChannel::WHEELS {
            sink.expect_set_pwm()
                .with(eq(channel), eq(0u16))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }

        DriveController::default().init(&mut sink).unwrap();
    }

    #[test]
    fn test_terminate_zeroes_then_stops() {
        let mut sink = RecordingSink::new();
        DriveController::default().terminate(&mut sink).unwrap();

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::SetPwm(PwmChannel::LeftWheel, 0),
                SinkCall::SetPwm(PwmChannel::RightWheel, 0),
                SinkCall::Stop(PwmChannel::LeftWheel),
                SinkCall::Stop(PwmChannel::RightWheel),
            ]
        );
    }

    #[test]
    fn test_apply_writes_pins_then_duty() {
        let mut sink = RecordingSink::new();
        let controller = DriveController::default();

        let command = controller.apply(&frame([1012, 512, 512, 512]), &mut sink).unwrap();
        assert_eq!(command.direction, Direction::Backward);

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::SetPin(DirectionPin::LeftIn1, PinLevel::Low),
                SinkCall::SetPin(DirectionPin::LeftIn2, PinLevel::High),
                SinkCall::SetPin(DirectionPin::RightIn3, PinLevel::Low),
                SinkCall::SetPin(DirectionPin::RightIn4, PinLevel::High),
                SinkCall::SetPwm(PwmChannel::LeftWheel, 100),
                SinkCall::SetPwm(PwmChannel::RightWheel, 100),
            ]
        );
    }

    #[test]
    fn test_apply_saturates_register_writes() {
        let mut sink = RecordingSink::new();
        let controller = DriveController::default();

        let command = controller.apply(&frame([1012, 512, 512, 1012]), &mut sink).unwrap();
        assert_eq!(command.left_pwm, 200);

        assert_eq!(sink.last_duty(PwmChannel::LeftWheel), Some(100));
        assert_eq!(sink.last_duty(PwmChannel::RightWheel), Some(0));
    }

    #[test]
    fn test_apply_negative_right_writes_min() {
        let mut sink = RecordingSink::new();
        DriveController::default()
            .apply(&frame([512, 512, 512, 1023]), &mut sink)
            .unwrap();
        assert_eq!(sink.last_duty(PwmChannel::RightWheel), Some(0));
        assert_eq!(sink.last_duty(PwmChannel::LeftWheel), Some(100));
    }

    #[test]
    fn test_apply_brake_sets_all_pins_high() {
        let mut sink = RecordingSink::new();
        DriveController::default()
            .apply(&ControlFrame::centered(), &mut sink)
            .unwrap();

        for pin in [
            DirectionPin::LeftIn1,
            DirectionPin::LeftIn2,
            DirectionPin::RightIn3,
            DirectionPin::RightIn4,
        ] {
            assert_eq!(sink.last_level(pin), Some(PinLevel::High));
        }
    }

    #[test]
    fn test_apply_propagates_sink_error() {
        let mut sink = RecordingSink::failing();
        let result = DriveController::default().apply(&ControlFrame::centered(), &mut sink);
        assert!(result.is_err());
    }
}
