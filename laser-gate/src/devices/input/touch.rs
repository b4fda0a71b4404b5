use std::fmt::{Display, Formatter};

use crate::devices::Device;
use crate::errors::Error;
use crate::hardware::{Board, Hardware};

/// Represents the capacitive touch pad (TTP223 like module) used by the operator to arm/disarm the
/// gate: a digital input reading HIGH while touched.
#[derive(Clone, Debug)]
pub struct TouchSensor {
    /// The pin (id) of the [`Board`] used to read the touch pad.
    pin: u8,
    hardware: Box<dyn Hardware>,
}

impl TouchSensor {
    /// Creates an instance of a [`TouchSensor`] attached to a given board.
    pub fn new(board: &Board, pin: u8) -> Self {
        Self {
            pin,
            hardware: board.get_hardware(),
        }
    }

    /// Reads the raw touch level: true while the pad is touched.
    pub fn is_touched(&mut self) -> Result<bool, Error> {
        self.hardware.digital_read(self.pin)
    }
}

impl Display for TouchSensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TouchSensor (pin={})", self.pin)
    }
}

impl Device for TouchSensor {
    fn get_pin(&self) -> u8 {
        self.pin
    }
}
