//! Defines the Laser-Gate configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// All laser-gate parameters.
///
/// Every value has a default matching the reference wiring (ESP32 class board, 12-bit ADC on pin 34,
/// touch pad on pin 14, passive buzzer on pin 26). Durations are expressed in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    // pins
    pub light_pin: u8,
    pub touch_pin: u8,
    pub buzzer_pin: u8,

    // light sensor
    /// The ADC full-scale value.
    pub light_max: u16,

    // buzzer
    pub buzzer_frequency: u32,
    /// Duty cycle while sounding, in permille (500 = 50%).
    pub buzzer_duty: u16,
    pub short_beep: u64,
    pub long_beep: u64,
    pub beep_gap: u64,

    // calibration
    pub calibration_samples: usize,
    pub calibration_interval: u64,
    /// Percentage of the clear-beam mean below which a sample is dark.
    pub threshold_percent: u8,
    pub calibrate_on_start: bool,

    // poll loop
    pub sample_interval: u64,
    pub idle_delay: u64,
    pub touch_debounce: u64,
    pub fault_pause: u64,

    // control transport
    pub bind_address: String,
    /// Address reported in status, if different from the listener one (NAT, port forwarding...).
    pub advertised_address: Option<String>,
    pub request_timeout: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            light_pin: 34,
            touch_pin: 14,
            buzzer_pin: 26,
            light_max: 4095,
            buzzer_frequency: 2000,
            buzzer_duty: 500,
            short_beep: 100,
            long_beep: 200,
            beep_gap: 100,
            calibration_samples: 10,
            calibration_interval: 100,
            threshold_percent: 80,
            calibrate_on_start: true,
            sample_interval: 100,
            idle_delay: 10,
            touch_debounce: 500,
            fault_pause: 1000,
            bind_address: String::from("0.0.0.0:80"),
            advertised_address: None,
            request_timeout: 2000,
        }
    }
}

impl GateConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their default value.
    ///
    /// # Errors
    /// * `IoException`: the file could not be read.
    /// * `Unknown`: the file content is not a valid configuration.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a configuration from a JSON string. Missing keys keep their default value.
    pub fn from_json(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }

    /// Sets the pins used by the light sensor, the touch pad and the buzzer.
    pub fn with_pins(mut self, light: u8, touch: u8, buzzer: u8) -> Self {
        self.light_pin = light;
        self.touch_pin = touch;
        self.buzzer_pin = buzzer;
        self
    }

    /// Sets the address the control transport listens on.
    pub fn with_bind_address<S: Into<String>>(mut self, address: S) -> Self {
        self.bind_address = address.into();
        self
    }

    /// Sets the address reported in status snapshots.
    pub fn with_advertised_address<S: Into<String>>(mut self, address: S) -> Self {
        self.advertised_address = Some(address.into());
        self
    }

    /// Enables or disables the calibration run once before the loop starts.
    pub fn with_calibrate_on_start(mut self, enabled: bool) -> Self {
        self.calibrate_on_start = enabled;
        self
    }

    /// Sets the calibration sampling: `samples` reads spaced by `interval` ms.
    /// NOTE: at least one sample is always taken.
    pub fn with_calibration(mut self, samples: usize, interval: u64) -> Self {
        self.calibration_samples = samples.max(1);
        self.calibration_interval = interval;
        self
    }

    /// Sets the threshold ratio. NOTE: everything above 100 is considered 100%.
    pub fn with_threshold_percent(mut self, percent: u8) -> Self {
        self.threshold_percent = percent.min(100);
        self
    }
}
