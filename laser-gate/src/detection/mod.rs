//! Defines the intrusion detection logic: the beam state machine, its calibration and the touch toggle.

pub use crate::detection::calibrator::Calibrator;
pub use crate::detection::detector::IntrusionDetector;
pub use crate::detection::state::{AlarmCommand, DetectorState};
pub use crate::detection::toggle::{ToggleEvent, TouchToggle};

mod calibrator;
mod detector;
mod state;
mod toggle;
