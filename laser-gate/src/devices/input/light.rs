use std::fmt::{Display, Formatter};

use crate::devices::Device;
use crate::errors::Error;
use crate::hardware::{Board, Hardware};

/// Represents the photoresistor (LDR) facing the laser: an analog input where a high value means a
/// bright (clear) beam and a low value a dark (blocked) beam.
#[derive(Clone, Debug)]
pub struct LightSensor {
    /// The pin (id) of the [`Board`] used to read the light level.
    pin: u8,
    /// The ADC full-scale value: readings are clamped to it.
    max: u16,
    /// The last value read.
    state: u16,

    hardware: Box<dyn Hardware>,
}

impl LightSensor {
    /// Creates an instance of a [`LightSensor`] attached to a given board.
    ///
    /// # Parameters
    /// * `board`: the [`Board`] which the sensor is attached to
    /// * `pin`: the analog pin used to read the light level
    /// * `max`: the ADC full-scale value (4095 for a 12-bit ADC)
    pub fn new(board: &Board, pin: u8, max: u16) -> Self {
        Self {
            pin,
            max,
            state: 0,
            hardware: board.get_hardware(),
        }
    }

    /// Reads a fresh light sample, in `0..=max`.
    ///
    /// # Errors
    /// * `UnknownPin`: the pin does not exist for this board.
    /// * `ReadFailure`: the conversion failed.
    pub fn read(&mut self) -> Result<u16, Error> {
        let value = self.hardware.analog_read(self.pin)?.min(self.max);
        self.state = value;
        Ok(value)
    }

    /// Returns the last value read (0 before any read).
    pub fn get_state(&self) -> u16 {
        self.state
    }

    /// Returns the ADC full-scale value.
    pub fn get_max(&self) -> u16 {
        self.max
    }
}

impl Display for LightSensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LightSensor (pin={}) [state={}, max={}]",
            self.pin, self.state, self.max
        )
    }
}

impl Device for LightSensor {
    fn get_pin(&self) -> u8 {
        self.pin
    }
}
