use log::{info, warn};

use crate::config::GateConfig;
use crate::devices::{Buzzer, LightSensor};
use crate::errors::{DetectionError, Error};
use crate::pause;

/// Derives the detection threshold from a burst of samples taken while the beam is clear.
///
/// The threshold is a percentage (80% by default) of the mean clear-beam reading: any reading below
/// it is considered a blocked beam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calibrator {
    /// Number of samples to take (at least 1).
    samples: usize,
    /// Pause between two samples (in ms).
    interval: u64,
    /// Threshold ratio (in percent of the mean).
    percent: u8,
    /// The ADC full-scale value.
    max: u16,
    /// Acknowledgment beeps duration and gap (in ms).
    beep: u64,
    gap: u64,
}

impl Calibrator {
    /// Creates a calibrator with the configured sampling, ratio and acknowledgment beeps.
    pub fn new(config: &GateConfig) -> Self {
        Self {
            samples: config.calibration_samples.max(1),
            interval: config.calibration_interval,
            percent: config.threshold_percent.min(100),
            max: config.light_max,
            beep: config.short_beep,
            gap: config.beep_gap,
        }
    }

    /// Computes the threshold matching a set of clear-beam samples: `floor(mean * percent / 100)`,
    /// with an integer mean. Returns `None` for an empty set.
    pub fn threshold_from(&self, samples: &[u16]) -> Option<u16> {
        if samples.is_empty() {
            return None;
        }
        let sum: u64 = samples.iter().map(|&sample| sample as u64).sum();
        let mean = sum / samples.len() as u64;
        let threshold = mean * self.percent as u64 / 100;
        Some(threshold.min(self.max as u64) as u16)
    }

    /// Samples the light sensor and returns the new threshold, then beeps twice.
    ///
    /// This blocks for `samples * interval` ms plus the beeps (about 1.3s by default).
    /// Failing reads are skipped: the threshold is computed from whatever was gathered.
    ///
    /// # Errors
    /// * `NoSamples`: not a single sample could be read.
    /// * `HardwareError`: the acknowledgment beeps could not be played.
    pub async fn calibrate(
        &self,
        sensor: &mut LightSensor,
        buzzer: &mut Buzzer,
    ) -> Result<u16, Error> {
        info!("Calibrating light sensor ({} samples)", self.samples);

        let mut samples = Vec::with_capacity(self.samples);
        for _ in 0..self.samples {
            match sensor.read() {
                Ok(sample) => samples.push(sample),
                Err(err) => warn!("Calibration sample skipped: {}", err),
            }
            pause!(self.interval);
        }

        let threshold = self
            .threshold_from(&samples)
            .ok_or(DetectionError::NoSamples {
                expected: self.samples,
            })?;
        info!(
            "Calibration done: threshold={} ({}/{} samples)",
            threshold,
            samples.len(),
            self.samples
        );

        buzzer.beep(self.beep).await?;
        pause!(self.gap);
        buzzer.beep(self.beep).await?;

        Ok(threshold)
    }

    /// Returns the number of samples taken by a calibration.
    pub fn get_samples(&self) -> usize {
        self.samples
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}
