use std::fmt::{Display, Formatter};

use log::{debug, info, warn};

use crate::config::GateConfig;
use crate::detection::{AlarmCommand, Calibrator, DetectorState};
use crate::devices::{Buzzer, LightSensor};
use crate::errors::Error;
use crate::hardware::Board;

/// The intrusion detector: binds the [`DetectorState`] to the light sensor and the alarm buzzer.
#[derive(Clone, Debug)]
pub struct IntrusionDetector {
    state: DetectorState,
    sensor: LightSensor,
    buzzer: Buzzer,
    /// Arm acknowledgment beep (in ms).
    short_beep: u64,
    /// Disarm acknowledgment beep (in ms).
    long_beep: u64,
}

impl IntrusionDetector {
    /// Creates a disarmed detector (threshold 0, alarm silenced) from the board and its wiring.
    ///
    /// # Errors
    /// * `UnknownPin`: the buzzer pin does not exist for this board.
    pub fn new(board: &Board, config: &GateConfig) -> Result<Self, Error> {
        Ok(Self {
            state: DetectorState::new(0),
            sensor: LightSensor::new(board, config.light_pin, config.light_max),
            buzzer: Buzzer::new(
                board,
                config.buzzer_pin,
                config.buzzer_frequency,
                config.buzzer_duty,
            )?,
            short_beep: config.short_beep,
            long_beep: config.long_beep,
        })
    }

    /// Reads a fresh light sample without feeding it to the state machine.
    pub fn read_light(&mut self) -> Result<u16, Error> {
        self.sensor.read()
    }

    /// The sampling step: reads the light sensor, classifies the sample and drives the alarm.
    pub fn check(&mut self) -> Result<AlarmCommand, Error> {
        let light = self.sensor.read()?;
        let before = self.state.get_intrusion_count();
        let command = self.state.on_sample(light);

        if self.state.get_intrusion_count() != before {
            warn!(
                "Intrusion detected (light={}, threshold={}): {} so far",
                light,
                self.state.get_threshold(),
                self.state.get_intrusion_count()
            );
        }

        match command {
            AlarmCommand::AlarmOn => self.buzzer.on()?,
            AlarmCommand::AlarmOff => self.buzzer.off()?,
        };
        Ok(command)
    }

    /// Arms or disarms the gate and returns the new armed value.
    ///
    /// Disarming silences the alarm first: if that fails the gate stays armed. The acknowledgment
    /// beep (short when armed, long when disarmed) is played once the new state is committed, and
    /// a failing beep is only logged.
    pub async fn toggle_armed(&mut self) -> Result<bool, Error> {
        let armed = !self.state.is_armed();
        if !armed {
            self.buzzer.force_off()?;
        }
        self.state.toggle();

        let beep = match armed {
            true => {
                info!("System armed");
                self.short_beep
            }
            false => {
                info!("System disarmed");
                self.long_beep
            }
        };
        if let Err(error) = self.buzzer.beep(beep).await {
            warn!("Acknowledgment beep failed: {}", error);
        }
        Ok(armed)
    }

    /// Sets the intrusion counter back to zero.
    pub fn reset_count(&mut self) {
        debug!(
            "Intrusion counter reset (was {})",
            self.state.get_intrusion_count()
        );
        self.state.reset_count();
    }

    /// Runs a calibration and stores the resulting threshold.
    /// On failure the previous threshold is kept.
    pub async fn calibrate(&mut self, calibrator: &Calibrator) -> Result<u16, Error> {
        let threshold = calibrator
            .calibrate(&mut self.sensor, &mut self.buzzer)
            .await?;
        self.state.set_threshold(threshold);
        Ok(threshold)
    }

    /// Silences the alarm, whatever its believed state is.
    pub fn force_alarm_off(&mut self) -> Result<(), Error> {
        self.buzzer.force_off()?;
        Ok(())
    }

    // ########################################
    // Setters and Getters.

    pub fn get_state(&self) -> &DetectorState {
        &self.state
    }

    pub fn get_buzzer(&self) -> &Buzzer {
        &self.buzzer
    }
}

impl Display for IntrusionDetector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IntrusionDetector [armed={}, threshold={}, intrusions={}, alarm={}]",
            self.state.is_armed(),
            self.state.get_threshold(),
            self.state.get_intrusion_count(),
            self.buzzer.is_on()
        )
    }
}
