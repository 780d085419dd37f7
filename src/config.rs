//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::control::arm::{
    ServoLimits, ARM_UPDATE_INTERVAL, PWM_SERVO_MAX, PWM_SERVO_MEDIAN, PWM_SERVO_MIN, SERVO_STEP,
};
use crate::control::drive::{DriveLimits, PWM_MAX, PWM_MIN};
use crate::control::runner::ControlMode;
use crate::error::{CarbotError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub arm: ArmConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Wheel motor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default = "default_pwm_min")]
    pub pwm_min: i32,

    #[serde(default = "default_pwm_max")]
    pub pwm_max: i32,
}

/// Arm servo configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ArmConfig {
    #[serde(default = "default_servo_min")]
    pub servo_min: i32,

    #[serde(default = "default_servo_median")]
    pub servo_median: i32,

    #[serde(default = "default_servo_max")]
    pub servo_max: i32,

    #[serde(default = "default_servo_step")]
    pub step: i32,

    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
}

/// Control loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    #[serde(default)]
    pub mode: ControlMode,

    #[serde(default = "default_frame_queue")]
    pub frame_queue: usize,

    #[serde(default = "default_log_interval_frames")]
    pub log_interval_frames: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_pwm_min() -> i32 { PWM_MIN }
fn default_pwm_max() -> i32 { PWM_MAX }

fn default_servo_min() -> i32 { PWM_SERVO_MIN }
fn default_servo_median() -> i32 { PWM_SERVO_MEDIAN }
fn default_servo_max() -> i32 { PWM_SERVO_MAX }
fn default_servo_step() -> i32 { SERVO_STEP }
fn default_update_interval_ms() -> u64 { ARM_UPDATE_INTERVAL.as_millis() as u64 }

fn default_frame_queue() -> usize { 16 }
fn default_log_interval_frames() -> u64 { 100 }

fn default_log_level() -> String { "info".to_string() }

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            pwm_min: default_pwm_min(),
            pwm_max: default_pwm_max(),
        }
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            servo_min: default_servo_min(),
            servo_median: default_servo_median(),
            servo_max: default_servo_max(),
            step: default_servo_step(),
            update_interval_ms: default_update_interval_ms(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            mode: ControlMode::default(),
            frame_queue: default_frame_queue(),
            log_interval_frames: default_log_interval_frames(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl DriveConfig {
    /// Wheel duty range for the drive controller.
    #[must_use]
    pub fn limits(&self) -> DriveLimits {
        DriveLimits::new(self.pwm_min, self.pwm_max)
    }
}

impl ArmConfig {
    /// Servo range and step for the arm controller.
    #[must_use]
    pub fn limits(&self) -> ServoLimits {
        ServoLimits {
            min: self.servo_min,
            median: self.servo_median,
            max: self.servo_max,
            step: self.step,
        }
    }

    /// Minimum spacing between arm updates.
    #[must_use]
    pub fn update_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.update_interval_ms)
    }
}

fn invalid(msg: impl std::fmt::Display) -> CarbotError {
    CarbotError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use carbot::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let register_max = i32::from(u16::MAX);

        // Wheel duty range
        if self.drive.pwm_min < 0 {
            return Err(invalid("pwm_min must not be negative"));
        }

        if self.drive.pwm_min >= self.drive.pwm_max {
            return Err(invalid("pwm_min must be less than pwm_max"));
        }

        if self.drive.pwm_max > register_max {
            return Err(invalid(format!("pwm_max must not exceed {}", register_max)));
        }

        // Servo duty range
        if self.arm.servo_min < 0 {
            return Err(invalid("servo_min must not be negative"));
        }

        if self.arm.servo_min >= self.arm.servo_median || self.arm.servo_median >= self.arm.servo_max {
            return Err(invalid("servo values must satisfy servo_min < servo_median < servo_max"));
        }

        if self.arm.servo_max > register_max {
            return Err(invalid(format!("servo_max must not exceed {}", register_max)));
        }

        if self.arm.step < 1 || self.arm.step > SERVO_STEP {
            return Err(invalid(format!("step must be between 1 and {}", SERVO_STEP)));
        }

        if self.arm.update_interval_ms == 0 || self.arm.update_interval_ms > 1000 {
            return Err(invalid("update_interval_ms must be between 1 and 1000"));
        }

        // Control loop
        if self.control.frame_queue == 0 || self.control.frame_queue > 1024 {
            return Err(invalid("frame_queue must be between 1 and 1024"));
        }

        if self.control.log_interval_frames == 0 {
            return Err(invalid("log_interval_frames must be greater than 0"));
        }

        // Logging
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid("level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.directory, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging directory cannot be empty when set"));
        }

        Ok(())
    }
}
