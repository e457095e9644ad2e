// Raw gamepad snapshots reported by the host

/// State of one raw gamepad button
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawButton {
    pub pressed: bool,
    /// Analog pressure in `0.0..=1.0`
    pub value: f32,
}

impl RawButton {
    pub fn pressed() -> Self {
        Self {
            pressed: true,
            value: 1.0,
        }
    }

    pub fn released() -> Self {
        Self::default()
    }
}

/// Snapshot of one physical gamepad
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGamepad {
    /// Host-provided device identifier
    pub id: String,
    /// Stable host index of the device
    pub index: usize,
    pub buttons: Vec<RawButton>,
    pub axes: Vec<f32>,
}

impl RawGamepad {
    /// Gamepad with every button released and every axis centered
    pub fn new(id: impl Into<String>, index: usize, buttons: usize, axes: usize) -> Self {
        Self {
            id: id.into(),
            index,
            buttons: vec![RawButton::released(); buttons],
            axes: vec![0.0; axes],
        }
    }

    /// Total number of buttons and axes
    pub fn input_count(&self) -> usize {
        self.buttons.len() + self.axes.len()
    }

    pub fn set_button(&mut self, index: usize, pressed: bool) {
        if let Some(button) = self.buttons.get_mut(index) {
            *button = if pressed {
                RawButton::pressed()
            } else {
                RawButton::released()
            };
        }
    }

    pub fn set_axis(&mut self, index: usize, value: f32) {
        if let Some(axis) = self.axes.get_mut(index) {
            *axis = value;
        }
    }
}

/// Host primitive that reports the current state of every attached gamepad
pub trait GamepadSource {
    fn gamepads(&mut self) -> Vec<RawGamepad>;
}

impl GamepadSource for Vec<RawGamepad> {
    fn gamepads(&mut self) -> Vec<RawGamepad> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_gamepad_is_neutral() {
        let pad = RawGamepad::new("pad", 0, 16, 4);
        assert_eq!(pad.input_count(), 20);
        assert!(pad.buttons.iter().all(|b| !b.pressed));
        assert!(pad.axes.iter().all(|a| *a == 0.0));
    }

    #[test]
    fn test_setters_ignore_out_of_range() {
        let mut pad = RawGamepad::new("pad", 0, 2, 1);
        pad.set_button(1, true);
        pad.set_button(5, true);
        pad.set_axis(0, -0.5);
        pad.set_axis(3, 1.0);
        assert_eq!(pad.buttons[1], RawButton::pressed());
        assert_eq!(pad.axes, vec![-0.5]);
    }

    #[test]
    fn test_vec_source_reports_snapshot() {
        let mut source = vec![RawGamepad::new("a", 0, 4, 0), RawGamepad::new("b", 1, 4, 2)];
        let pads = source.gamepads();
        assert_eq!(pads.len(), 2);
        assert_eq!(pads[1].id, "b");
    }
}
