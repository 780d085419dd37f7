//! # Actuator Module
//!
//! Boundary between the control logic and the motor hardware.
//!
//! This module handles:
//! - The write-only PWM/GPIO capability set the controllers drive
//! - Timer and channel assignment for wheels and servos
//! - A tracing-backed sink for running the control loop without hardware

pub mod sink_trait;
pub mod tracing_sink;

pub use sink_trait::{ActuationSink, DirectionPin, PinLevel, PwmChannel};
pub use tracing_sink::TracingSink;

/// Converts a signed duty into a compare-register value.
///
/// Negative values become 0 and values beyond 16 bits saturate.
#[inline]
#[must_use]
pub fn to_compare(duty: i32) -> u16 {
    duty.clamp(0, i32::from(u16::MAX)) as u16
}
