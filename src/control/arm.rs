//! # Arm Controller Module
//!
//! Incremental positioning of the four arm servos.
//!
//! ## Joint Assignments
//!
//! | Joint | Input | Stick below center | Channel |
//! |-------|-------|--------------------|---------|
//! | Joint 1 | Joystick 1 X | step down | TIM3 CH1 |
//! | Plate | Joystick 1 Y | step up | TIM3 CH2 |
//! | Joint 2 | Joystick 2 X | step down | TIM3 CH3 |
//! | Grip | Joystick 2 Y | step down | TIM3 CH4 |
//!
//! Every call moves every joint by exactly one step. There is no deadzone: a
//! stick at exactly 512 counts as "not below center" and steps the joint the
//! other way.
//!
//! ## Value Ranges
//!
//! MG90S servos on a 50 kHz timer tick (20 us):
//!
//! - `50` (1.0 ms pulse): -90°
//! - `75` (1.5 ms pulse): 0°
//! - `100` (2.0 ms pulse): +90°
//!
//! ## Rate
//!
//! The mapping itself never sleeps. Callers must leave at least
//! [`ARM_UPDATE_INTERVAL`] between updates, otherwise the servos sweep faster
//! than they can follow.
//!
//! ## Usage
//!
//! ```
//! use carbot::control::arm::{compute_arm, ArmState, ServoLimits};
//! use carbot::control::frame::ControlFrame;
//!
//! let mut state = ArmState::default();
//! let frame = ControlFrame::new([0, 512, 512, 512])?;
//! compute_arm(&frame, &mut state, &ServoLimits::default());
//!
//! assert_eq!(state.joint1_pwm, 73);
//! # Ok::<(), carbot::error::CarbotError>(())
//! ```

use std::time::Duration;

use tracing::{debug, info};

use super::frame::{axes, ControlFrame};
use crate::actuator::{to_compare, ActuationSink, PwmChannel};
use crate::error::Result;

/// Servo duty at -90°.
pub const PWM_SERVO_MIN: i32 = 50;
/// Servo duty at 0°.
pub const PWM_SERVO_MEDIAN: i32 = 75;
/// Servo duty at +90°.
pub const PWM_SERVO_MAX: i32 = 100;
/// Duty change per update.
pub const SERVO_STEP: i32 = 2;
/// Minimum spacing between arm updates.
pub const ARM_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

/// Servo joints of the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    Joint1,
    Plate,
    Joint2,
    Grip,
}

impl Joint {
    /// All joints in channel order.
    pub const ALL: [Joint; 4] = [Joint::Joint1, Joint::Plate, Joint::Joint2, Joint::Grip];

    /// PWM channel driving this joint.
    #[must_use]
    pub fn channel(self) -> PwmChannel {
        match self {
            Joint::Joint1 => PwmChannel::Joint1,
            Joint::Plate => PwmChannel::Plate,
            Joint::Joint2 => PwmChannel::Joint2,
            Joint::Grip => PwmChannel::Grip,
        }
    }

    /// Frame axis steering this joint.
    #[must_use]
    pub fn axis(self) -> usize {
        match self {
            Joint::Joint1 => axes::JOYSTICK1_X,
            Joint::Plate => axes::JOYSTICK1_Y,
            Joint::Joint2 => axes::JOYSTICK2_X,
            Joint::Grip => axes::JOYSTICK2_Y,
        }
    }

    /// Whether stick deflection moves this joint opposite to the others.
    #[must_use]
    pub fn inverted(self) -> bool {
        matches!(self, Joint::Plate)
    }
}

/// Servo duty range and step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoLimits {
    pub min: i32,
    pub median: i32,
    pub max: i32,
    pub step: i32,
}

impl Default for ServoLimits {
    fn default() -> Self {
        Self {
            min: PWM_SERVO_MIN,
            median: PWM_SERVO_MEDIAN,
            max: PWM_SERVO_MAX,
            step: SERVO_STEP,
        }
    }
}

/// Current duty of every arm servo.
///
/// Models physical servo position, so it lives across frames and has exactly
/// one writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmState {
    pub joint1_pwm: i32,
    pub plate_pwm: i32,
    pub joint2_pwm: i32,
    pub grip_pwm: i32,
}

impl Default for ArmState {
    fn default() -> Self {
        Self::centered(&ServoLimits::default())
    }
}

impl ArmState {
    /// Every joint at the servo median.
    #[must_use]
    pub fn centered(limits: &ServoLimits) -> Self {
        Self {
            joint1_pwm: limits.median,
            plate_pwm: limits.median,
            joint2_pwm: limits.median,
            grip_pwm: limits.median,
        }
    }

    #[must_use]
    pub fn get(&self, joint: Joint) -> i32 {
        match joint {
            Joint::Joint1 => self.joint1_pwm,
            Joint::Plate => self.plate_pwm,
            Joint::Joint2 => self.joint2_pwm,
            Joint::Grip => self.grip_pwm,
        }
    }

    fn get_mut(&mut self, joint: Joint) -> &mut i32 {
        match joint {
            Joint::Joint1 => &mut self.joint1_pwm,
            Joint::Plate => &mut self.plate_pwm,
            Joint::Joint2 => &mut self.joint2_pwm,
            Joint::Grip => &mut self.grip_pwm,
        }
    }
}

/// Steps every joint one increment toward its stick and clamps to the servo
/// range.
pub fn compute_arm(frame: &ControlFrame, state: &mut ArmState, limits: &ServoLimits) {
    for joint in Joint::ALL {
        let below_center = frame.offset(joint.axis()) < 0;
        let delta = if below_center != joint.inverted() {
            -limits.step
        } else {
            limits.step
        };

        let duty = state.get_mut(joint);
        *duty = (*duty + delta).clamp(limits.min, limits.max);
    }
}

/// Owns the arm state and drives the servos through an [`ActuationSink`].
#[derive(Debug, Clone, Default)]
pub struct ArmController {
    limits: ServoLimits,
    state: ArmState,
}

impl ArmController {
    #[must_use]
    pub fn new(limits: ServoLimits) -> Self {
        Self {
            limits,
            state: ArmState::centered(&limits),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ArmState {
        &self.state
    }

    /// Starts the four servo channels and centers the arm.
    pub fn init<S: ActuationSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        for channel in PwmChannel::SERVOS {
            sink.start_pwm(channel)?;
        }
        self.init_position(sink)?;
        info!("Arm controller initialized");
        Ok(())
    }

    /// Centers the arm and stops the four servo channels.
    pub fn terminate<S: ActuationSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.init_position(sink)?;
        for channel in PwmChannel::SERVOS {
            sink.stop_pwm(channel)?;
        }
        info!("Arm controller terminated");
        Ok(())
    }

    /// Resets every joint to the servo median and writes it out.
    pub fn init_position<S: ActuationSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.state = ArmState::centered(&self.limits);
        self.write_state(sink)
    }

    /// Steps the arm for one frame and writes the new duties.
    ///
    /// Does not wait; see [`ARM_UPDATE_INTERVAL`].
    pub fn apply<S: ActuationSink + ?Sized>(
        &mut self,
        frame: &ControlFrame,
        sink: &mut S,
    ) -> Result<ArmState> {
        compute_arm(frame, &mut self.state, &self.limits);
        self.write_state(sink)?;

        debug!(
            "Arm: joint1={} plate={} joint2={} grip={}",
            self.state.joint1_pwm, self.state.plate_pwm, self.state.joint2_pwm, self.state.grip_pwm
        );
        Ok(self.state)
    }

    fn write_state<S: ActuationSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        for joint in Joint::ALL {
            sink.set_pwm(joint.channel(), to_compare(self.state.get(joint)))?;
        }
        Ok(())
    }
}
