//! Defines the devices wired to the board: the light sensor and the touch pad (inputs), the buzzer (output).

use std::fmt::{Debug, Display};

pub use crate::devices::input::light::LightSensor;
pub use crate::devices::input::touch::TouchSensor;
pub use crate::devices::output::buzzer::Buzzer;

pub mod input;
pub mod output;

/// A device attached to one pin of a [`Board`](crate::hardware::Board).
pub trait Device: Debug + Display {
    /// Returns the pin (id) used by the device.
    fn get_pin(&self) -> u8;
}
