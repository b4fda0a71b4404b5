use std::fmt::{Display, Formatter};

use log::trace;

use crate::devices::Device;
use crate::errors::Error;
use crate::hardware::{Board, Hardware};
use crate::pause;

/// Represents the (passive) buzzer used as alarm: a PWM output sounding at a fixed frequency.
///
/// The buzzer only knows if it sounds or not. Writing to the hardware only happens when that state
/// changes, except for [`Buzzer::force_off()`] which always writes.
#[derive(Clone, Debug)]
pub struct Buzzer {
    // ########################################
    // # Basics
    /// The pin (id) of the [`Board`] used to drive the buzzer.
    pin: u8,
    /// The tone frequency (in Hz).
    frequency: u32,
    /// The duty cycle used while sounding (in permille).
    duty: u16,
    /// The current buzzer state.
    state: bool,

    // ########################################
    // # Volatile utility data.
    hardware: Box<dyn Hardware>,
}

impl Buzzer {
    /// Creates an instance of a [`Buzzer`] attached to a given board. The buzzer starts silenced.
    ///
    /// # Errors
    /// * `UnknownPin`: this function will bail an error if the pin does not exist for this board.
    pub fn new(board: &Board, pin: u8, frequency: u32, duty: u16) -> Result<Self, Error> {
        let mut buzzer = Self {
            pin,
            frequency,
            duty: duty.min(1000),
            state: false,
            hardware: board.get_hardware(),
        };
        buzzer.force_off()?;
        Ok(buzzer)
    }

    /// Starts sounding.
    pub fn on(&mut self) -> Result<&Self, Error> {
        self.set_state(true)?;
        Ok(self)
    }

    /// Stops sounding.
    pub fn off(&mut self) -> Result<&Self, Error> {
        self.set_state(false)?;
        Ok(self)
    }

    /// Silences the buzzer whatever its believed state is.
    pub fn force_off(&mut self) -> Result<&Self, Error> {
        self.write(false)?;
        Ok(self)
    }

    /// Sounds for `duration` ms, then stops.
    /// This waits for the whole duration: nothing else runs in the meantime.
    pub async fn beep(&mut self, duration: u64) -> Result<(), Error> {
        self.write(true)?;
        pause!(duration);
        self.write(false)?;
        Ok(())
    }

    /// Sets the buzzer state: only writes to the hardware when the state changes.
    pub fn set_state(&mut self, state: bool) -> Result<bool, Error> {
        if state != self.state {
            self.write(state)?;
        }
        Ok(state)
    }

    fn write(&mut self, state: bool) -> Result<(), Error> {
        let duty = match state {
            true => self.duty,
            false => 0,
        };
        trace!("Buzzer (pin={}) duty={}", self.pin, duty);
        self.hardware.pwm_write(self.pin, self.frequency, duty)?;
        self.state = state;
        Ok(())
    }

    // ########################################
    // Setters and Getters.

    /// Indicates if the buzzer currently sounds.
    pub fn is_on(&self) -> bool {
        self.state
    }

    /// Returns the tone frequency (Hz).
    pub fn get_frequency(&self) -> u32 {
        self.frequency
    }

    /// Returns the sounding duty cycle (permille).
    pub fn get_duty(&self) -> u16 {
        self.duty
    }
}

impl Display for Buzzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Buzzer (pin={}) [state={}, frequency={}Hz, duty={}‰]",
            self.pin, self.state, self.frequency, self.duty,
        )
    }
}

impl Device for Buzzer {
    fn get_pin(&self) -> u8 {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::hardware::{MockHardware, PwmWrite};

    fn create_buzzer() -> (MockHardware, Buzzer) {
        let hardware = MockHardware::default();
        let buzzer = Buzzer::new(&Board::new(hardware.clone()), 26, 2000, 500).unwrap();
        (hardware, buzzer)
    }

    #[test]
    fn test_creation() {
        let (hardware, buzzer) = create_buzzer();
        assert_eq!(buzzer.get_pin(), 26);
        assert_eq!(buzzer.get_frequency(), 2000);
        assert_eq!(buzzer.get_duty(), 500);
        assert!(!buzzer.is_on());
        // Silenced on creation.
        assert_eq!(
            hardware.get_writes(),
            vec![PwmWrite {
                pin: 26,
                frequency: 2000,
                duty: 0
            }]
        );

        let unknown = Buzzer::new(&Board::new(hardware), 3, 2000, 500);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_duty_is_bounded() {
        let buzzer = Buzzer::new(&Board::new(MockHardware::default()), 26, 2000, 1500).unwrap();
        assert_eq!(buzzer.get_duty(), 1000);
    }

    #[test]
    fn test_on_off() {
        let (hardware, mut buzzer) = create_buzzer();
        hardware.clear_writes();

        buzzer.on().unwrap();
        assert!(buzzer.is_on());
        assert!(hardware.is_sounding(26));
        assert_eq!(hardware.get_pwm(26).unwrap().duty, 500);

        // Same state: no hardware write.
        buzzer.on().unwrap();
        assert_eq!(hardware.get_writes().len(), 1);

        buzzer.off().unwrap();
        assert!(!buzzer.is_on());
        assert!(!hardware.is_sounding(26));
        assert_eq!(hardware.get_writes().len(), 2);
    }

    #[test]
    fn test_force_off_always_writes() {
        let (hardware, mut buzzer) = create_buzzer();
        hardware.clear_writes();
        buzzer.force_off().unwrap();
        buzzer.force_off().unwrap();
        assert_eq!(hardware.get_writes().len(), 2);
        assert!(!hardware.is_sounding(26));
    }

    #[laser_gate_macros::test(paused)]
    async fn test_beep() {
        let (hardware, mut buzzer) = create_buzzer();
        hardware.clear_writes();

        let start = tokio::time::Instant::now();
        buzzer.beep(200).await.unwrap();
        assert!(start.elapsed().as_millis() >= 200);

        let duties: Vec<u16> = hardware.get_writes().iter().map(|w| w.duty).collect();
        assert_eq!(duties, vec![500, 0]);
        assert!(!buzzer.is_on());
    }

    #[test]
    fn test_display() {
        let (_, mut buzzer) = create_buzzer();
        buzzer.on().unwrap();
        assert_eq!(
            format!("{}", buzzer),
            "Buzzer (pin=26) [state=true, frequency=2000Hz, duty=500‰]"
        );
    }
}
