//! Trait abstraction for PWM/GPIO actuation to enable testing

use crate::error::Result;

/// Timer channels driving the motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PwmChannel {
    /// Left wheel enable (TIM4 CH1)
    LeftWheel,
    /// Right wheel enable (TIM4 CH2)
    RightWheel,
    /// Arm base joint servo (TIM3 CH1)
    Joint1,
    /// Rotating plate servo (TIM3 CH2)
    Plate,
    /// Arm elbow joint servo (TIM3 CH3)
    Joint2,
    /// Gripper servo (TIM3 CH4)
    Grip,
}

impl PwmChannel {
    /// Both wheel channels in left/right order.
    pub const WHEELS: [PwmChannel; 2] = [PwmChannel::LeftWheel, PwmChannel::RightWheel];

    /// All servo channels in joint order.
    pub const SERVOS: [PwmChannel; 4] = [
        PwmChannel::Joint1,
        PwmChannel::Plate,
        PwmChannel::Joint2,
        PwmChannel::Grip,
    ];

    /// Hardware timer and channel number this output is wired to.
    #[must_use]
    pub fn timer_channel(self) -> (u8, u8) {
        match self {
            PwmChannel::LeftWheel => (4, 1),
            PwmChannel::RightWheel => (4, 2),
            PwmChannel::Joint1 => (3, 1),
            PwmChannel::Plate => (3, 2),
            PwmChannel::Joint2 => (3, 3),
            PwmChannel::Grip => (3, 4),
        }
    }
}

/// H-bridge input pins selecting wheel rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionPin {
    LeftIn1,
    LeftIn2,
    RightIn3,
    RightIn4,
}

/// Digital output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinLevel {
    High,
    Low,
}

/// Write-only capabilities the controllers need from the hardware layer.
#[cfg_attr(test, mockall::automock)]
pub trait ActuationSink {
    /// Write a compare-register value for a PWM channel
    fn set_pwm(&mut self, channel: PwmChannel, duty: u16) -> Result<()>;

    /// Drive a direction pin high or low
    fn set_digital_pin(&mut self, pin: DirectionPin, level: PinLevel) -> Result<()>;

    /// Start PWM generation on a channel
    fn start_pwm(&mut self, channel: PwmChannel) -> Result<()>;

    /// Stop PWM generation on a channel
    fn stop_pwm(&mut self, channel: PwmChannel) -> Result<()>;
}
