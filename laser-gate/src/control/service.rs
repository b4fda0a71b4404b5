use log::{debug, info, warn};

use crate::config::GateConfig;
use crate::control::{ApiRequest, ApiResponse, StatusSnapshot};
use crate::detection::{Calibrator, IntrusionDetector};
use crate::errors::Error;

/// Executes the remote operations against the detector owned by the poll loop.
///
/// The service holds no detector state itself: every operation borrows the detector for its own
/// duration only.
#[derive(Clone, Debug, Default)]
pub struct ControlService {
    calibrator: Calibrator,
}

impl ControlService {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            calibrator: Calibrator::new(config),
        }
    }

    /// Takes a fresh light sample and reports the detector state. Nothing is mutated.
    pub fn get_status(
        &self,
        detector: &mut IntrusionDetector,
        network_address: &str,
    ) -> Result<StatusSnapshot, Error> {
        let current_light = detector.read_light()?;
        let state = detector.get_state();
        Ok(StatusSnapshot {
            armed: state.is_armed(),
            intrusion_count: state.get_intrusion_count(),
            current_light,
            threshold: state.get_threshold(),
            is_dark: state.is_dark(current_light),
            network_address: network_address.to_string(),
        })
    }

    /// Arms or disarms the gate: returns the new armed value.
    ///
    /// Once disarmed, the alarm is silenced once more: that last write is only logged on failure,
    /// the gate is disarmed already.
    pub async fn toggle(&self, detector: &mut IntrusionDetector) -> Result<bool, Error> {
        let armed = detector.toggle_armed().await?;
        if !armed {
            if let Err(error) = detector.force_alarm_off() {
                warn!("Alarm could not be silenced: {}", error);
            }
        }
        Ok(armed)
    }

    /// Sets the intrusion counter back to zero: returns the new count (always 0).
    pub fn reset(&self, detector: &mut IntrusionDetector) -> u32 {
        detector.reset_count();
        detector.get_state().get_intrusion_count()
    }

    /// Recalibrates the detector: returns the new threshold.
    /// This blocks the caller for the whole calibration.
    pub async fn calibrate(&self, detector: &mut IntrusionDetector) -> Result<u16, Error> {
        detector.calibrate(&self.calibrator).await
    }

    /// Executes a request and wraps its outcome into a response.
    /// A failing operation yields [`ApiResponse::Error`].
    pub async fn handle(
        &self,
        detector: &mut IntrusionDetector,
        request: &ApiRequest,
        network_address: &str,
    ) -> ApiResponse {
        let response = match request {
            ApiRequest::GetStatus => self
                .get_status(detector, network_address)
                .map(ApiResponse::Status),
            ApiRequest::Toggle => self
                .toggle(detector)
                .await
                .map(|system_active| ApiResponse::Armed { system_active }),
            ApiRequest::Reset => Ok(ApiResponse::Count {
                intrusion_count: self.reset(detector),
            }),
            ApiRequest::Calibrate => self
                .calibrate(detector)
                .await
                .map(|threshold| ApiResponse::Threshold { threshold }),
            ApiRequest::Unknown(route) => {
                debug!("Unknown route: {}", route);
                Ok(ApiResponse::NotFound)
            }
        };

        match response {
            Ok(response) => response,
            Err(error) => {
                info!("Request {} failed: {}", request, error);
                ApiResponse::from(error)
            }
        }
    }
}
