//! Host-side actuation sink that reports every write through `tracing`.
//!
//! Used when no motor driver is attached: the control loop runs unchanged and
//! the resulting register writes show up in the log.

use std::collections::HashMap;

use tracing::{debug, info};

use super::sink_trait::{ActuationSink, DirectionPin, PinLevel, PwmChannel};
use crate::error::Result;

/// Actuation sink that logs writes and shadows the last written values
#[derive(Debug, Default)]
pub struct TracingSink {
    compare: HashMap<PwmChannel, u16>,
    pins: HashMap<DirectionPin, PinLevel>,
    running: HashMap<PwmChannel, bool>,
}

impl TracingSink {
    /// Creates a sink with every channel stopped and nothing written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last compare value written to `channel`.
    #[must_use]
    pub fn compare(&self, channel: PwmChannel) -> Option<u16> {
        self.compare.get(&channel).copied()
    }

    /// Last level written to `pin`.
    #[must_use]
    pub fn pin(&self, pin: DirectionPin) -> Option<PinLevel> {
        self.pins.get(&pin).copied()
    }

    /// Whether PWM generation is currently started on `channel`.
    #[must_use]
    pub fn is_running(&self, channel: PwmChannel) -> bool {
        self.running.get(&channel).copied().unwrap_or(false)
    }
}

impl ActuationSink for TracingSink {
    fn set_pwm(&mut self, channel: PwmChannel, duty: u16) -> Result<()> {
        let (timer, ch) = channel.timer_channel();
        debug!("TIM{} CH{} ({:?}) compare = {}", timer, ch, channel, duty);
        self.compare.insert(channel, duty);
        Ok(())
    }

    fn set_digital_pin(&mut self, pin: DirectionPin, level: PinLevel) -> Result<()> {
        debug!("{:?} -> {:?}", pin, level);
        self.pins.insert(pin, level);
        Ok(())
    }

    fn start_pwm(&mut self, channel: PwmChannel) -> Result<()> {
        let (timer, ch) = channel.timer_channel();
        info!("Starting PWM on TIM{} CH{} ({:?})", timer, ch, channel);
        self.running.insert(channel, true);
        Ok(())
    }

    fn stop_pwm(&mut self, channel: PwmChannel) -> Result<()> {
        let (timer, ch) = channel.timer_channel();
        info!("Stopping PWM on TIM{} CH{} ({:?})", timer, ch, channel);
        self.running.insert(channel, false);
        Ok(())
    }
}
