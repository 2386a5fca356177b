//! Momentary and latching push-buttons.

use serde::{Deserialize, Serialize};

use crate::bus::SBus;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PressButtonState {
    pub state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToggleButtonState {
    pub state: bool,
}

impl ToggleButtonState {
    /// Flip on press; called by the collaborator that drives user input
    /// (out of scope here — the core only models the resulting state).
    pub fn press(&mut self) {
        self.state = !self.state;
    }
}

pub fn tick_press_button(state: &PressButtonState, sbuses: &mut [SBus]) {
    let value = if state.state { 255 } else { 0 };
    for bus in sbuses {
        bus.write(value);
    }
}

pub fn tick_toggle_button(state: &ToggleButtonState, sbuses: &mut [SBus]) {
    let value = if state.state { 255 } else { 0 };
    for bus in sbuses {
        bus.write(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SBus;
    use crate::grid::{Direction, Position};

    #[test]
    fn press_button_drives_255_when_pressed() {
        let state = PressButtonState { state: true };
        let mut sbuses = vec![SBus::new("s0", Position::new(0, 0), Direction::Right)];
        tick_press_button(&state, &mut sbuses);
        assert_eq!(sbuses[0].value, 255);
    }

    #[test]
    fn press_button_drives_zero_when_released() {
        let state = PressButtonState { state: false };
        let mut sbuses = vec![SBus::new("s0", Position::new(0, 0), Direction::Right)];
        tick_press_button(&state, &mut sbuses);
        assert_eq!(sbuses[0].value, 0);
    }

    #[test]
    fn toggle_flips_on_press() {
        let mut state = ToggleButtonState::default();
        state.press();
        assert!(state.state);
        state.press();
        assert!(!state.state);
    }
}
