//! # Carbot Library
//!
//! Joystick control for a differential-drive RC car carrying a 4-DOF robot arm.
//!
//! This library provides the control mapping that turns two-stick joystick
//! samples into wheel direction/duty commands and rate-limited servo positions,
//! plus the actuation boundary those commands are written to.

pub mod actuator;
pub mod config;
pub mod control;
pub mod error;
pub mod input;
