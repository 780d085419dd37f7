//! # Control Module
//!
//! Joystick-to-motor control mapping.
//!
//! This module handles:
//! - Validating joystick control frames
//! - Differential-drive mixing for the wheel motors
//! - Incremental positioning of the arm servos
//! - The control loop that feeds frames to both controllers

pub mod arm;
pub mod drive;
pub mod frame;
pub mod runner;
