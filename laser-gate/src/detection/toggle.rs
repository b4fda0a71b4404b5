use std::fmt::{Display, Formatter};

/// Emitted when the operator touches the pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleEvent;

/// Turns the raw touch level into arm/disarm requests.
///
/// The toggle is level triggered: every poll reading a touched pad fires. The caller is expected to
/// hold off polling for a debounce window after each fire, otherwise a single press toggles many times.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchToggle {
    last_touch_raw: bool,
}

impl TouchToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the raw touch level and fires if the pad is touched.
    pub fn poll(&mut self, raw_touch: bool) -> Option<ToggleEvent> {
        self.last_touch_raw = raw_touch;
        raw_touch.then_some(ToggleEvent)
    }

    /// Returns the last raw level seen.
    pub fn get_last_touch(&self) -> bool {
        self.last_touch_raw
    }
}

impl Display for TouchToggle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TouchToggle [touched={}]", self.last_touch_raw)
    }
}
