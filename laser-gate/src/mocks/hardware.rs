use std::collections::{HashMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::Error;
use crate::errors::HardwareError::{ReadFailure, UnknownPin, WriteFailure};
use crate::hardware::Hardware;

/// A single PWM write received by the [`MockHardware`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PwmWrite {
    pub pin: u8,
    pub frequency: u32,
    pub duty: u16,
}

/// A mocked pin: the current value is returned once the scripted values are exhausted.
#[derive(Clone, Debug, Default)]
struct MockPin<T> {
    value: T,
    script: VecDeque<T>,
    failures: usize,
}

impl<T: Copy> MockPin<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            script: VecDeque::new(),
            failures: 0,
        }
    }

    fn read(&mut self) -> Option<T> {
        if self.failures > 0 {
            self.failures -= 1;
            return None;
        }
        if let Some(next) = self.script.pop_front() {
            self.value = next;
        }
        Some(self.value)
    }
}

/// Inner data of the [`MockHardware`], shared by all its clones.
#[derive(Clone, Debug, Default)]
pub struct MockData {
    analog: HashMap<u8, MockPin<u16>>,
    digital: HashMap<u8, MockPin<bool>>,
    pwm: HashMap<u8, Option<PwmWrite>>,
    /// Per PWM pin: writes still allowed, then writes to fail.
    pwm_failures: HashMap<u8, (usize, usize)>,
    writes: Vec<PwmWrite>,
}

/// Mock implementation of [`Hardware`].
///
/// Comes with the reference wiring pre-declared:
/// - pin 34: analog (light sensor), value 3000
/// - pin 14: digital (touch pad), value false
/// - pin 26: PWM (buzzer), silent
///
/// Clones share the same pins, hence a test can keep a handle on the mock while devices own theirs.
#[derive(Clone, Debug)]
pub struct MockHardware {
    pub connected: bool,
    pub data: Arc<RwLock<MockData>>,
}

impl Default for MockHardware {
    fn default() -> Self {
        let mut data = MockData::default();
        data.analog.insert(34, MockPin::new(3000));
        data.digital.insert(14, MockPin::new(false));
        data.pwm.insert(26, None);
        Self {
            connected: false,
            data: Arc::new(RwLock::new(data)),
        }
    }
}

impl MockHardware {
    /// Sets (or declares) an analog pin constant value and drops any scripted value.
    pub fn set_analog(&self, pin: u8, value: u16) {
        self.data.write().analog.insert(pin, MockPin::new(value));
    }

    /// Queues values to be returned by the subsequent reads of an analog pin (one per read).
    /// The last value remains once the queue is exhausted.
    pub fn push_analog<I: IntoIterator<Item = u16>>(&self, pin: u8, values: I) {
        let mut lock = self.data.write();
        let mock = lock.analog.entry(pin).or_insert_with(|| MockPin::new(0));
        mock.script.extend(values);
    }

    /// Makes the next `count` reads of an analog pin fail.
    pub fn fail_analog(&self, pin: u8, count: usize) {
        let mut lock = self.data.write();
        let mock = lock.analog.entry(pin).or_insert_with(|| MockPin::new(0));
        mock.failures = count;
    }

    /// Makes the next `count` writes to a PWM pin fail (`usize::MAX` for all of them).
    pub fn fail_pwm(&self, pin: u8, count: usize) {
        self.fail_pwm_after(pin, 0, count);
    }

    /// Lets `ok` writes to a PWM pin through, then makes the following `count` ones fail.
    pub fn fail_pwm_after(&self, pin: u8, ok: usize, count: usize) {
        self.data.write().pwm_failures.insert(pin, (ok, count));
    }

    /// Sets (or declares) a digital pin constant value and drops any scripted value.
    pub fn set_digital(&self, pin: u8, value: bool) {
        self.data.write().digital.insert(pin, MockPin::new(value));
    }

    /// Queues values to be returned by the subsequent reads of a digital pin (one per read).
    pub fn push_digital<I: IntoIterator<Item = bool>>(&self, pin: u8, values: I) {
        let mut lock = self.data.write();
        let mock = lock.digital.entry(pin).or_insert_with(|| MockPin::new(false));
        mock.script.extend(values);
    }

    /// Returns the number of reads still scripted for an analog pin.
    pub fn pending_analog(&self, pin: u8) -> usize {
        self.data
            .read()
            .analog
            .get(&pin)
            .map_or(0, |mock| mock.script.len())
    }

    /// Returns the last PWM write received by a pin, if any.
    pub fn get_pwm(&self, pin: u8) -> Option<PwmWrite> {
        self.data.read().pwm.get(&pin).copied().flatten()
    }

    /// Indicates if a PWM pin currently sounds (non-zero duty).
    pub fn is_sounding(&self, pin: u8) -> bool {
        self.get_pwm(pin).is_some_and(|write| write.duty > 0)
    }

    /// Returns all PWM writes received so far, in order.
    pub fn get_writes(&self) -> Vec<PwmWrite> {
        self.data.read().writes.clone()
    }

    /// Forgets all PWM writes received so far.
    pub fn clear_writes(&self) {
        self.data.write().writes.clear();
    }
}

impl Display for MockHardware {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        write!(
            f,
            "{} [connected={}, pins={}]",
            self.get_name(),
            self.connected,
            data.analog.len() + data.digital.len() + data.pwm.len(),
        )
    }
}

impl Hardware for MockHardware {
    fn open(&mut self) -> Result<(), Error> {
        self.connected = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn analog_read(&mut self, pin: u8) -> Result<u16, Error> {
        let mut lock = self.data.write();
        let mock = lock.analog.get_mut(&pin).ok_or(UnknownPin { pin })?;
        let value = mock.read().ok_or(ReadFailure {
            pin,
            context: "simulated ADC fault",
        })?;
        Ok(value)
    }

    fn digital_read(&mut self, pin: u8) -> Result<bool, Error> {
        let mut lock = self.data.write();
        let mock = lock.digital.get_mut(&pin).ok_or(UnknownPin { pin })?;
        let value = mock.read().ok_or(ReadFailure {
            pin,
            context: "simulated digital fault",
        })?;
        Ok(value)
    }

    fn pwm_write(&mut self, pin: u8, frequency: u32, duty: u16) -> Result<(), Error> {
        let mut lock = self.data.write();
        let write = PwmWrite {
            pin,
            frequency,
            duty,
        };
        if !lock.pwm.contains_key(&pin) {
            return Err(UnknownPin { pin }.into());
        }
        if let Some((ok, failures)) = lock.pwm_failures.get_mut(&pin) {
            if *ok > 0 {
                *ok -= 1;
            } else if *failures > 0 {
                *failures -= 1;
                return Err(WriteFailure {
                    pin,
                    context: "simulated PWM fault",
                }
                .into());
            }
        }
        let slot = lock.pwm.get_mut(&pin).ok_or(UnknownPin { pin })?;
        *slot = Some(write);
        lock.writes.push(write);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_analog() {
        let mut hardware = MockHardware::default();
        hardware.push_analog(34, [10, 20]);
        assert_eq!(hardware.pending_analog(34), 2);
        assert_eq!(hardware.analog_read(34).unwrap(), 10);
        assert_eq!(hardware.analog_read(34).unwrap(), 20);
        // Last value stays.
        assert_eq!(hardware.analog_read(34).unwrap(), 20);
        assert_eq!(hardware.pending_analog(34), 0);
    }

    #[test]
    fn test_failing_analog() {
        let mut hardware = MockHardware::default();
        hardware.fail_analog(34, 1);
        assert!(hardware.analog_read(34).is_err());
        assert_eq!(hardware.analog_read(34).unwrap(), 3000);
    }

    #[test]
    fn test_unknown_pins() {
        let mut hardware = MockHardware::default();
        assert!(hardware.analog_read(1).is_err());
        assert!(hardware.digital_read(1).is_err());
        assert!(hardware.pwm_write(1, 2000, 500).is_err());
        assert!(hardware.get_writes().is_empty());
    }

    #[test]
    fn test_pwm_writes() {
        let mut hardware = MockHardware::default();
        let clone = hardware.clone();
        hardware.pwm_write(26, 2000, 500).unwrap();
        assert!(clone.is_sounding(26));
        hardware.pwm_write(26, 2000, 0).unwrap();
        assert!(!clone.is_sounding(26));
        assert_eq!(clone.get_writes().len(), 2);
        clone.clear_writes();
        assert!(hardware.get_writes().is_empty());
    }

    #[test]
    fn test_failing_pwm() {
        let mut hardware = MockHardware::default();
        hardware.fail_pwm(26, 1);
        assert!(hardware.pwm_write(26, 2000, 500).is_err());
        assert!(!hardware.is_sounding(26));
        assert!(hardware.get_writes().is_empty());
        hardware.pwm_write(26, 2000, 500).unwrap();
        assert!(hardware.is_sounding(26));

        hardware.fail_pwm_after(26, 1, 1);
        hardware.pwm_write(26, 2000, 0).unwrap();
        assert!(hardware.pwm_write(26, 2000, 500).is_err());
        hardware.pwm_write(26, 2000, 500).unwrap();
        assert_eq!(hardware.get_writes().len(), 3);
    }
}
