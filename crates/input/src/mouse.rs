use orbitlab_scene::CameraDelta;
use tracing::{debug, warn};

/// Wheel units reported for one notch of a line-based scroll wheel.
pub const WHEEL_UNITS_PER_LINE: f32 = 120.0;

/// Raw pointer units per radian / world unit.
const SCALE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}

/// Accumulates pointer motion between polls.
///
/// While unacquired (window unfocused) incoming motion is dropped. Acquisition
/// is retried by each poll and succeeds once focus is back; the poll that
/// re-acquires still reports no movement.
#[derive(Debug, Clone)]
pub struct MouseInput {
    acquired: bool,
    focused: bool,
    buttons: u8,
    dx: f64,
    dy: f64,
    wheel: f32,
}

impl Default for MouseInput {
    fn default() -> Self {
        Self {
            acquired: true,
            focused: true,
            buttons: 0,
            dx: 0.0,
            dy: 0.0,
            wheel: 0.0,
        }
    }
}

impl MouseInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative pointer motion in device units.
    pub fn on_motion(&mut self, dx: f64, dy: f64) {
        if self.acquired {
            self.dx += dx;
            self.dy += dy;
        }
    }

    /// Wheel motion in wheel units, positive away from the user.
    pub fn on_wheel(&mut self, units: f32) {
        if self.acquired {
            self.wheel += units;
        }
    }

    pub fn on_wheel_lines(&mut self, lines: f32) {
        self.on_wheel(lines * WHEEL_UNITS_PER_LINE);
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons |= button.bit();
        } else {
            self.buttons &= !button.bit();
        }
    }

    pub fn on_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused && self.acquired {
            warn!("mouse input lost, will re-acquire on focus");
            self.acquired = false;
            // Releases are not delivered while unfocused.
            self.buttons = 0;
            self.clear();
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired
    }

    pub fn any_button_held(&self) -> bool {
        self.buttons != 0
    }

    /// Drain the motion gathered since the last poll as a camera delta:
    /// `(dx / 100, dy / 100, -wheel / 100)` when a button is held, zero otherwise.
    pub fn poll(&mut self) -> CameraDelta {
        if !self.acquired {
            if self.focused {
                debug!("mouse input re-acquired");
                self.acquired = true;
            }
            self.clear();
            return CameraDelta::default();
        }

        let delta = if self.any_button_held() {
            CameraDelta::new(
                self.dx as f32 / SCALE,
                self.dy as f32 / SCALE,
                -self.wheel / SCALE,
            )
        } else {
            CameraDelta::default()
        };
        self.clear();
        delta
    }

    fn clear(&mut self) {
        self.dx = 0.0;
        self.dy = 0.0;
        self.wheel = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_button_no_delta() {
        let mut input = MouseInput::new();
        input.on_motion(50.0, 20.0);
        input.on_wheel(120.0);
        assert!(input.poll().is_zero());
    }

    #[test]
    fn held_button_scales_motion() {
        let mut input = MouseInput::new();
        input.on_button(MouseButton::Left, true);
        input.on_motion(30.0, -10.0);
        input.on_motion(20.0, 0.0);
        input.on_wheel_lines(1.0);
        let d = input.poll();
        assert_eq!(d, CameraDelta::new(0.5, -0.1, -1.2));
    }

    #[test]
    fn poll_drains_accumulators() {
        let mut input = MouseInput::new();
        input.on_button(MouseButton::Right, true);
        input.on_motion(100.0, 0.0);
        assert!(!input.poll().is_zero());
        assert!(input.poll().is_zero());
    }

    #[test]
    fn any_of_three_buttons_enables_motion() {
        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            let mut input = MouseInput::new();
            input.on_button(button, true);
            input.on_motion(10.0, 0.0);
            assert_eq!(input.poll().d_phi, 0.1);
            input.on_button(button, false);
            input.on_motion(10.0, 0.0);
            assert!(input.poll().is_zero());
        }
    }

    #[test]
    fn focus_loss_is_soft() {
        let mut input = MouseInput::new();
        input.on_button(MouseButton::Left, true);
        input.on_motion(10.0, 10.0);
        input.on_focus(false);
        assert!(!input.is_acquired());
        assert!(!input.any_button_held());

        // Still unfocused: stays unacquired, motion dropped.
        input.on_motion(10.0, 10.0);
        assert!(input.poll().is_zero());
        assert!(!input.is_acquired());

        input.on_focus(true);
        assert!(input.poll().is_zero());
        assert!(input.is_acquired());

        input.on_button(MouseButton::Left, true);
        input.on_motion(200.0, 0.0);
        assert_eq!(input.poll().d_phi, 2.0);
    }
}
