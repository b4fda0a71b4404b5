//! Defines the pin-level boundary between the controller and a physical board.

use std::any::type_name;
use std::fmt::{Debug, Display};

use dyn_clone::DynClone;

pub use crate::hardware::board::Board;
use crate::errors::Error;

mod board;

// Makes a Box<dyn Hardware> clone (used for Board and devices cloning).
dyn_clone::clone_trait_object!(Hardware);

/// Defines the trait all hardware backends must implement.
///
/// The controller only ever needs three primitives: an ADC read (the light sensor), a digital
/// read (the touch pad) and a PWM write (the buzzer). Implementations are cloned into every device
/// attached to a [`Board`]: clones are expected to share the same underlying connection.
pub trait Hardware: DynClone + Send + Sync + Debug + Display {
    /// Returns the hardware name (used for Display only)
    fn get_name(&self) -> &'static str {
        type_name::<Self>().split("::").last().unwrap_or("Hardware")
    }

    // ########################################
    // Functions specifically bound to the connection.

    /// Opens the communication with the hardware.
    fn open(&mut self) -> Result<(), Error>;
    /// Gracefully shuts down the communication.
    fn close(&mut self) -> Result<(), Error>;
    /// Checks if the communication is opened.
    fn is_connected(&self) -> bool;

    // ########################################
    // Read/Write on pins

    /// Reads the raw value of the analog `pin` (ADC conversion).
    fn analog_read(&mut self, pin: u8) -> Result<u16, Error>;

    /// Reads the level of the digital `pin`.
    fn digital_read(&mut self, pin: u8) -> Result<bool, Error>;

    /// Drives the PWM `pin` at `frequency` (Hz) with the given `duty` cycle (in permille).
    /// A zero duty silences the pin.
    fn pwm_write(&mut self, pin: u8, frequency: u32, duty: u16) -> Result<(), Error>;
}
