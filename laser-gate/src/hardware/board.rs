use std::fmt::Display;
use std::ops::{Deref, DerefMut};

use log::trace;

use crate::errors::Error;
use crate::hardware::Hardware;

/// Represents the physical board the light sensor, the touch pad and the buzzer are wired to.
/// The board gives access to the pins through its [`Hardware`] backend.
#[derive(Debug, Clone)]
pub struct Board {
    /// The inner hardware used by this Board.
    hardware: Box<dyn Hardware>,
}

impl Board {
    /// Creates a board using a given hardware backend.
    ///
    /// **_/!\ The board will NOT be connected until the [`Board::open`] method is called._**
    ///
    /// # Example
    /// ```ignore
    /// use laser_gate::hardware::Board;
    /// use laser_gate::mocks::hardware::MockHardware;
    ///
    /// let board = Board::new(MockHardware::default()).open().unwrap();
    /// assert!(board.is_connected());
    /// ```
    pub fn new<H: Hardware + 'static>(hardware: H) -> Self {
        Self {
            hardware: Box::new(hardware),
        }
    }

    /// Returns the hardware used.
    ///
    /// NOTE: this is private to the crate since board already gives access to hardware methods via Deref.
    /// This method is only used internally in all devices `new()` methods to clone the hardware into the
    /// device.
    pub(crate) fn get_hardware(&self) -> Box<dyn Hardware> {
        self.hardware.clone()
    }

    /// Opens the board connexion (in a blocking way).
    pub fn open(mut self) -> Result<Self, Error> {
        self.hardware.open()?;
        trace!("Board is ready: {}", self.hardware);
        Ok(self)
    }

    /// Closes the board connexion (in a blocking way).
    pub fn close(mut self) -> Result<Self, Error> {
        self.hardware.close()?;
        trace!("Board is closed");
        Ok(self)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Board ({})", self.hardware)
    }
}

impl Deref for Board {
    type Target = Box<dyn Hardware>;

    fn deref(&self) -> &Self::Target {
        &self.hardware
    }
}

impl DerefMut for Board {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.hardware
    }
}
