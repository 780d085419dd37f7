//! # Control Frame Module
//!
//! A control frame is one sample of both joysticks, delivered once per
//! control tick by whatever receives commands for the robot.
//!
//! ## Axis Layout
//!
//! | Index | Input | Drive use | Arm use |
//! |-------|-------|-----------|---------|
//! | 0 | Joystick 1 X | Forward/back | Joint 1 |
//! | 1 | Joystick 1 Y | - | Plate |
//! | 2 | Joystick 2 X | - | Joint 2 |
//! | 3 | Joystick 2 Y | Left/right | Grip |
//!
//! ## Value Ranges
//!
//! - Raw joystick input: 0-1023 (10-bit ADC)
//! - Neutral: 512
//!
//! ## Usage
//!
//! ```
//! use carbot::control::frame::ControlFrame;
//!
//! let frame: ControlFrame = "1012 512 512 412".parse()?;
//! assert_eq!(frame.offset(0), 500);
//! # Ok::<(), carbot::error::CarbotError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{CarbotError, Result};

/// Lowest raw joystick value.
pub const JOYSTICK_MIN: i32 = 0;
/// Highest raw joystick value.
pub const JOYSTICK_MAX: i32 = 1023;
/// Raw joystick value at the neutral position.
pub const JOYSTICK_MEDIAN_VALUE: i32 = 512;

/// Number of axes carried by a frame.
pub const FRAME_AXES: usize = 4;

/// Axis indices for semantic access.
pub mod axes {
    /// Joystick 1 X
    pub const JOYSTICK1_X: usize = 0;
    /// Joystick 1 Y
    pub const JOYSTICK1_Y: usize = 1;
    /// Joystick 2 X
    pub const JOYSTICK2_X: usize = 2;
    /// Joystick 2 Y
    pub const JOYSTICK2_Y: usize = 3;
}

/// One validated sample of both joysticks.
///
/// Every axis is guaranteed to lie in `JOYSTICK_MIN..=JOYSTICK_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFrame {
    values: [i32; FRAME_AXES],
}

impl Default for ControlFrame {
    fn default() -> Self {
        Self::centered()
    }
}

impl ControlFrame {
    /// Creates a frame, rejecting any axis outside 0-1023.
    ///
    /// # Errors
    ///
    /// Returns [`CarbotError::InvalidFrame`] naming the first bad axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use carbot::control::frame::ControlFrame;
    ///
    /// assert!(ControlFrame::new([0, 512, 1023, 100]).is_ok());
    /// assert!(ControlFrame::new([0, 512, 1024, 100]).is_err());
    /// ```
    pub fn new(values: [i32; FRAME_AXES]) -> Result<Self> {
        for (axis, &value) in values.iter().enumerate() {
            if !(JOYSTICK_MIN..=JOYSTICK_MAX).contains(&value) {
                return Err(CarbotError::InvalidFrame { axis, value });
            }
        }
        Ok(Self { values })
    }

    /// Frame with both sticks at rest.
    #[must_use]
    pub const fn centered() -> Self {
        Self {
            values: [JOYSTICK_MEDIAN_VALUE; FRAME_AXES],
        }
    }

    /// Raw axis values in index order.
    #[must_use]
    pub fn values(&self) -> [i32; FRAME_AXES] {
        self.values
    }

    /// Signed distance of an axis from neutral.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= 4`.
    #[must_use]
    pub fn offset(&self, axis: usize) -> i32 {
        self.values[axis] - JOYSTICK_MEDIAN_VALUE
    }

    #[must_use]
    pub fn joystick1_x(&self) -> i32 {
        self.values[axes::JOYSTICK1_X]
    }

    #[must_use]
    pub fn joystick1_y(&self) -> i32 {
        self.values[axes::JOYSTICK1_Y]
    }

    #[must_use]
    pub fn joystick2_x(&self) -> i32 {
        self.values[axes::JOYSTICK2_X]
    }

    #[must_use]
    pub fn joystick2_y(&self) -> i32 {
        self.values[axes::JOYSTICK2_Y]
    }
}

impl TryFrom<[i32; FRAME_AXES]> for ControlFrame {
    type Error = CarbotError;

    fn try_from(values: [i32; FRAME_AXES]) -> Result<Self> {
        Self::new(values)
    }
}

impl FromStr for ControlFrame {
    type Err = CarbotError;

    /// Parses four integers separated by whitespace and/or commas.
    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.len() != FRAME_AXES {
            return Err(CarbotError::FrameParse(format!(
                "expected {} values, found {}",
                FRAME_AXES,
                tokens.len()
            )));
        }

        let mut values = [0i32; FRAME_AXES];
        for (slot, token) in values.iter_mut().zip(&tokens) {
            *slot = token
                .parse()
                .map_err(|e| CarbotError::FrameParse(format!("'{}': {}", token, e)))?;
        }

        Self::new(values)
    }
}

impl fmt::Display for ControlFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.values;
        write!(f, "[{}, {}, {}, {}]", a, b, c, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_frame() {
        let frame = ControlFrame::centered();
        assert_eq!(frame.values(), [512; 4]);
        assert_eq!(frame, ControlFrame::default());
        for axis in 0..FRAME_AXES {
            assert_eq!(frame.offset(axis), 0);
        }
    }

    #[test]
    fn test_new_accepts_bounds() {
        let frame = ControlFrame::new([JOYSTICK_MIN, JOYSTICK_MAX, 0, 1023]).unwrap();
        assert_eq!(frame.joystick1_x(), 0);
        assert_eq!(frame.joystick1_y(), 1023);
        assert_eq!(frame.offset(axes::JOYSTICK1_X), -512);
        assert_eq!(frame.offset(axes::JOYSTICK1_Y), 511);
    }

    #[test]
    fn test_new_rejects_above_range() {
        match ControlFrame::new([512, 512, 1024, 512]) {
            Err(CarbotError::InvalidFrame { axis, value }) => {
                assert_eq!(axis, 2);
                assert_eq!(value, 1024);
            }
            other => panic!("Expected InvalidFrame, got: {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_negative() {
        match ControlFrame::new([-1, 512, 512, 512]) {
            Err(CarbotError::InvalidFrame { axis, value }) => {
                assert_eq!(axis, 0);
                assert_eq!(value, -1);
            }
            other => panic!("Expected InvalidFrame, got: {:?}", other),
        }
    }

    #[test]
    fn test_accessors_follow_axis_layout() {
        let frame = ControlFrame::new([10, 20, 30, 40]).unwrap();
        assert_eq!(frame.joystick1_x(), 10);
        assert_eq!(frame.joystick1_y(), 20);
        assert_eq!(frame.joystick2_x(), 30);
        assert_eq!(frame.joystick2_y(), 40);
    }

    #[test]
    fn test_try_from_array() {
        let frame = ControlFrame::try_from([1, 2, 3, 4]).unwrap();
        assert_eq!(frame.values(), [1, 2, 3, 4]);
        assert!(ControlFrame::try_from([1, 2, 3, 5000]).is_err());
    }

    #[test]
    fn test_parse_whitespace() {
        let frame: ControlFrame = "12 512  512\t412".parse().unwrap();
        assert_eq!(frame.values(), [12, 512, 512, 412]);
    }

    #[test]
    fn test_parse_commas() {
        let frame: ControlFrame = "1012,512, 512 ,512".parse().unwrap();
        assert_eq!(frame.values(), [1012, 512, 512, 512]);
    }

    #[test]
    fn test_parse_wrong_count() {
        let result = "512 512 512".parse::<ControlFrame>();
        assert!(matches!(result, Err(CarbotError::FrameParse(_))));

        let result = "512 512 512 512 512".parse::<ControlFrame>();
        assert!(matches!(result, Err(CarbotError::FrameParse(_))));
    }

    #[test]
    fn test_parse_non_integer() {
        let result = "512 abc 512 512".parse::<ControlFrame>();
        match result {
            Err(CarbotError::FrameParse(msg)) => assert!(msg.contains("abc")),
            other => panic!("Expected FrameParse, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_out_of_range() {
        let result = "512 512 512 2000".parse::<ControlFrame>();
        assert!(matches!(
            result,
            Err(CarbotError::InvalidFrame { axis: 3, value: 2000 })
        ));
    }

    #[test]
    fn test_display() {
        let frame = ControlFrame::new([1, 2, 3, 4]).unwrap();
        assert_eq!(frame.to_string(), "[1, 2, 3, 4]");
    }

    #[test]
    fn test_axis_indices() {
        assert_eq!(axes::JOYSTICK1_X, 0);
        assert_eq!(axes::JOYSTICK1_Y, 1);
        assert_eq!(axes::JOYSTICK2_X, 2);
        assert_eq!(axes::JOYSTICK2_Y, 3);
    }
}
