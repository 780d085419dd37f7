//! # Error Types
//!
//! Custom error types for Carbot using `thiserror`.

use thiserror::Error;

/// Main error type for Carbot
#[derive(Debug, Error)]
pub enum CarbotError {
    /// Joystick axis outside the 10-bit ADC range
    #[error("Invalid control frame: axis {axis} value {value} is outside 0-1023")]
    InvalidFrame { axis: usize, value: i32 },

    /// Control frame text could not be parsed
    #[error("Control frame parse error: {0}")]
    FrameParse(String),

    /// Actuation sink (PWM/GPIO driver) failures
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Carbot
pub type Result<T> = std::result::Result<T, CarbotError>;
