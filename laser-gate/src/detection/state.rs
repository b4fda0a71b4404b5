use std::fmt::{Display, Formatter};

/// What the alarm actuator should do after a sample has been classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmCommand {
    AlarmOn,
    AlarmOff,
}

impl AlarmCommand {
    pub fn is_on(&self) -> bool {
        matches!(self, AlarmCommand::AlarmOn)
    }
}

impl From<bool> for AlarmCommand {
    fn from(value: bool) -> Self {
        match value {
            true => AlarmCommand::AlarmOn,
            false => AlarmCommand::AlarmOff,
        }
    }
}

/// The intrusion detection state machine.
///
/// - `intrusion_count` only grows (by one per light→dark edge while armed) until explicitly reset.
/// - `last_dark` is the classification of the last sample seen while armed: it is frozen while
///   disarmed, so that re-arming never counts a stale dark beam.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectorState {
    armed: bool,
    threshold: u16,
    last_dark: bool,
    intrusion_count: u32,
}

impl DetectorState {
    /// Creates a disarmed state with the given threshold.
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Classifies a light sample with the current threshold.
    pub fn is_dark(&self, light: u16) -> bool {
        light < self.threshold
    }

    /// Feeds a new light sample and returns the alarm command to apply.
    pub fn on_sample(&mut self, light: u16) -> AlarmCommand {
        if !self.armed {
            return AlarmCommand::AlarmOff;
        }

        let is_dark = self.is_dark(light);
        match (is_dark, self.last_dark) {
            // light -> dark: the beam has just been crossed.
            (true, false) => {
                self.intrusion_count = self.intrusion_count.saturating_add(1);
                self.last_dark = true;
                AlarmCommand::AlarmOn
            }
            // dark -> light
            (false, true) => {
                self.last_dark = false;
                AlarmCommand::AlarmOff
            }
            // No edge: hold.
            (is_dark, _) => AlarmCommand::from(is_dark),
        }
    }

    /// Flips the armed flag and returns its new value.
    pub fn toggle(&mut self) -> bool {
        self.armed = !self.armed;
        self.armed
    }

    /// Sets the intrusion counter back to zero.
    pub fn reset_count(&mut self) {
        self.intrusion_count = 0;
    }

    // ########################################
    // Setters and Getters.

    pub fn set_threshold(&mut self, threshold: u16) {
        self.threshold = threshold;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn get_threshold(&self) -> u16 {
        self.threshold
    }

    pub fn is_last_dark(&self) -> bool {
        self.last_dark
    }

    pub fn get_intrusion_count(&self) -> u32 {
        self.intrusion_count
    }
}

impl Display for DetectorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DetectorState [armed={}, threshold={}, dark={}, intrusions={}]",
            self.armed, self.threshold, self.last_dark, self.intrusion_count
        )
    }
}
