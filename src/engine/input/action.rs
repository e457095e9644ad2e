// Logical actions, edge events and key codes

use std::fmt;
use winit::keyboard::KeyCode;

/// Action names used by the factory configurations
pub mod names {
    pub const LEFT: &str = "LEFT";
    pub const RIGHT: &str = "RIGHT";
    pub const UP: &str = "UP";
    pub const DOWN: &str = "DOWN";
    pub const A: &str = "A";
    pub const B: &str = "B";
    pub const PAUSE: &str = "PAUSE";
    pub const ACCEPT: &str = "ACCEPT";

    /// Actions that keep repeating while held in text-input mode
    pub const DIRECTIONS: [&str; 4] = [UP, DOWN, LEFT, RIGHT];

    pub fn is_direction(name: &str) -> bool {
        DIRECTIONS.contains(&name)
    }
}

/// Keyboard key codes, using DOM `keyCode` numbering
pub mod keys {
    pub const BACKSPACE: u32 = 8;
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 13;
    pub const SHIFT: u32 = 16;
    pub const CTRL: u32 = 17;
    pub const ALT: u32 = 18;
    pub const ESCAPE: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const LEFT_ARROW: u32 = 37;
    pub const UP_ARROW: u32 = 38;
    pub const RIGHT_ARROW: u32 = 39;
    pub const DOWN_ARROW: u32 = 40;
    pub const DIGIT_0: u32 = 48;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const F: u32 = 70;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
    pub const F1: u32 = 112;
}

/// Edge of a source transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// The source became active
    Down,
    /// The source became inactive
    Up,
}

impl Edge {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Edge::Down
        } else {
            Edge::Up
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Edge::Down => "down",
            Edge::Up => "up",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event handed to listeners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionEvent<'a> {
    pub edge: Edge,
    /// Logical action name
    pub action: &'a str,
    /// Signed intensity; always 0 for `Edge::Up`
    pub value: f32,
    /// Slot of the emitting device
    pub slot: usize,
    /// Name of the emitting device ("P1", "P2", ...)
    pub device: &'a str,
}

/// Translate a winit physical key into its DOM key code
pub fn dom_key_code(code: KeyCode) -> Option<u32> {
    use keys::*;

    let letter = |offset: u32| Some(A + offset);
    let digit = |offset: u32| Some(DIGIT_0 + offset);
    let function = |offset: u32| Some(F1 + offset);

    match code {
        KeyCode::Backspace => Some(BACKSPACE),
        KeyCode::Tab => Some(TAB),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(ENTER),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(SHIFT),
        KeyCode::ControlLeft | KeyCode::ControlRight => Some(CTRL),
        KeyCode::AltLeft | KeyCode::AltRight => Some(ALT),
        KeyCode::Escape => Some(ESCAPE),
        KeyCode::Space => Some(SPACE),
        KeyCode::ArrowLeft => Some(LEFT_ARROW),
        KeyCode::ArrowUp => Some(UP_ARROW),
        KeyCode::ArrowRight => Some(RIGHT_ARROW),
        KeyCode::ArrowDown => Some(DOWN_ARROW),
        KeyCode::Digit0 => digit(0),
        KeyCode::Digit1 => digit(1),
        KeyCode::Digit2 => digit(2),
        KeyCode::Digit3 => digit(3),
        KeyCode::Digit4 => digit(4),
        KeyCode::Digit5 => digit(5),
        KeyCode::Digit6 => digit(6),
        KeyCode::Digit7 => digit(7),
        KeyCode::Digit8 => digit(8),
        KeyCode::Digit9 => digit(9),
        KeyCode::KeyA => letter(0),
        KeyCode::KeyB => letter(1),
        KeyCode::KeyC => letter(2),
        KeyCode::KeyD => letter(3),
        KeyCode::KeyE => letter(4),
        KeyCode::KeyF => letter(5),
        KeyCode::KeyG => letter(6),
        KeyCode::KeyH => letter(7),
        KeyCode::KeyI => letter(8),
        KeyCode::KeyJ => letter(9),
        KeyCode::KeyK => letter(10),
        KeyCode::KeyL => letter(11),
        KeyCode::KeyM => letter(12),
        KeyCode::KeyN => letter(13),
        KeyCode::KeyO => letter(14),
        KeyCode::KeyP => letter(15),
        KeyCode::KeyQ => letter(16),
        KeyCode::KeyR => letter(17),
        KeyCode::KeyS => letter(18),
        KeyCode::KeyT => letter(19),
        KeyCode::KeyU => letter(20),
        KeyCode::KeyV => letter(21),
        KeyCode::KeyW => letter(22),
        KeyCode::KeyX => letter(23),
        KeyCode::KeyY => letter(24),
        KeyCode::KeyZ => letter(25),
        KeyCode::F1 => function(0),
        KeyCode::F2 => function(1),
        KeyCode::F3 => function(2),
        KeyCode::F4 => function(3),
        KeyCode::F5 => function(4),
        KeyCode::F6 => function(5),
        KeyCode::F7 => function(6),
        KeyCode::F8 => function(7),
        KeyCode::F9 => function(8),
        KeyCode::F10 => function(9),
        KeyCode::F11 => function(10),
        KeyCode::F12 => function(11),
        _ => None,
    }
}
