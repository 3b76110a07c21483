//! Actor Input
//!
//! Button state as the host reports it each input frame.

use serde::{Serialize, Deserialize};

/// Host input buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Button {
    /// Primary fire.
    FirePrimary = 0,
    /// Secondary fire / aim.
    FireSecondary = 1,
    /// Use / interact.
    Use = 2,
    /// Reload.
    Reload = 3,
    /// Jump.
    Jump = 4,
    /// Crouch / duck.
    Duck = 5,
}

impl Button {
    /// Bit for this button in a packed button mask.
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Button state for one input frame.
///
/// Holds both the current and previous frame's masks so edge detection
/// ("just pressed") needs no extra state on our side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// Buttons held this frame (packed bits, see [`Button::bit`])
    pub current: u32,
    /// Buttons held last frame
    pub previous: u32,
}

impl InputState {
    /// Create an empty input state.
    pub const fn new() -> Self {
        Self { current: 0, previous: 0 }
    }

    /// Frame where `button` went down this frame.
    pub const fn pressed(button: Button) -> Self {
        Self { current: button.bit(), previous: 0 }
    }

    /// Frame where `button` was already down last frame.
    pub const fn held(button: Button) -> Self {
        Self { current: button.bit(), previous: button.bit() }
    }

    /// Check if `button` is down this frame.
    #[inline]
    pub fn is_down(&self, button: Button) -> bool {
        self.current & button.bit() != 0
    }

    /// Check if `button` went down this frame.
    #[inline]
    pub fn was_just_pressed(&self, button: Button) -> bool {
        self.current & button.bit() != 0 && self.previous & button.bit() == 0
    }

    /// Advance to the next frame with `buttons` held.
    pub fn advance(&mut self, buttons: u32) {
        self.previous = self.current;
        self.current = buttons;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_edge() {
        let input = InputState::pressed(Button::FirePrimary);
        assert!(input.was_just_pressed(Button::FirePrimary));
        assert!(!input.was_just_pressed(Button::Jump));
    }

    #[test]
    fn test_held_is_not_just_pressed() {
        let input = InputState::held(Button::FirePrimary);
        assert!(input.is_down(Button::FirePrimary));
        assert!(!input.was_just_pressed(Button::FirePrimary));
    }

    #[test]
    fn test_advance() {
        let mut input = InputState::new();
        input.advance(Button::FirePrimary.bit());
        assert!(input.was_just_pressed(Button::FirePrimary));
        input.advance(Button::FirePrimary.bit());
        assert!(!input.was_just_pressed(Button::FirePrimary));
        input.advance(0);
        input.advance(Button::FirePrimary.bit() | Button::Duck.bit());
        assert!(input.was_just_pressed(Button::FirePrimary));
        assert!(input.was_just_pressed(Button::Duck));
    }
}
