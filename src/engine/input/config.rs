// Device configurations and the process-wide default table

use super::action::{keys, names};
use super::binding::{ButtonBinding, PhysicalInput, SourceRef, StoredBinding};
use super::InputError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Physical layout a configuration targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Archetype {
    Keyboard,
    Joystick,
    Dpad,
}

impl Archetype {
    /// Derive the archetype of a physical gamepad from its axis count
    pub fn from_axis_count(axes: usize) -> Self {
        if axes == 0 {
            Archetype::Dpad
        } else {
            Archetype::Joystick
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Keyboard => "KEYBOARD",
            Archetype::Joystick => "JOYSTICK",
            Archetype::Dpad => "DPAD",
        }
    }

    pub fn all() -> [Archetype; 3] {
        [Archetype::Keyboard, Archetype::Joystick, Archetype::Dpad]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered bindings for one device archetype
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceConfig {
    bindings: Vec<ButtonBinding>,
}

impl DeviceConfig {
    pub fn new(bindings: Vec<ButtonBinding>) -> Self {
        Self { bindings }
    }

    /// Structural copy of another configuration. Every copied binding is
    /// unselected, so the copy never shares capture state with its origin.
    pub fn copy_from(other: &DeviceConfig) -> Self {
        Self {
            bindings: other.bindings.iter().map(ButtonBinding::clone).collect(),
        }
    }

    pub fn bindings(&self) -> &[ButtonBinding] {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut [ButtonBinding] {
        &mut self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Append a binding
    pub fn push(&mut self, binding: ButtonBinding) {
        self.bindings.push(binding);
    }

    /// First binding with the given action name
    pub fn find(&self, name: &str) -> Option<&ButtonBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Position of the first directly-sourced binding for an action
    pub fn direct_position(&self, name: &str) -> Option<usize> {
        self.bindings
            .iter()
            .position(|b| b.name == name && b.source.is_direct())
    }

    /// Bindings that can be remapped (no alias or button-set sources)
    pub fn configurable(&self) -> impl Iterator<Item = &ButtonBinding> {
        self.bindings.iter().filter(|b| b.source.is_direct())
    }

    /// Position of the binding currently marked as capture target
    pub fn selected_position(&self) -> Option<usize> {
        self.bindings.iter().position(|b| b.selected)
    }

    pub fn clear_selection(&mut self) {
        for binding in &mut self.bindings {
            binding.selected = false;
        }
    }

    /// Whether `binding` reacts to `input`, resolving aliases through the
    /// bindings of this configuration by name
    pub fn resolves(&self, binding: &ButtonBinding, input: PhysicalInput) -> bool {
        match &binding.source {
            SourceRef::Alias(targets) => self.bindings.iter().any(|sibling| {
                !matches!(sibling.source, SourceRef::Alias(_))
                    && targets.iter().any(|t| *t == sibling.name)
                    && sibling.source.matches(input)
            }),
            source => source.matches(input),
        }
    }

    /// Positions of every binding fired by `input`
    pub fn matching(&self, input: PhysicalInput) -> Vec<usize> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| self.resolves(b, input))
            .map(|(i, _)| i)
            .collect()
    }

    /// Positions of the axis bindings on `axis`
    pub fn matching_axis(&self, axis: usize) -> Vec<usize> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b.source.axis(), Some((index, _)) if index == axis))
            .map(|(i, _)| i)
            .collect()
    }

    /// Stored form of every binding
    pub fn to_stored(&self) -> Vec<StoredBinding> {
        self.bindings.iter().map(StoredBinding::from).collect()
    }

    /// Rebuild a configuration from its stored form
    pub fn from_stored(stored: Vec<StoredBinding>) -> Result<Self, InputError> {
        let bindings = stored
            .into_iter()
            .map(ButtonBinding::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(bindings))
    }
}

/// Factory keyboard bindings
pub fn default_keyboard_bindings() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding::key(names::LEFT, keys::LEFT_ARROW, -1.0),
        ButtonBinding::key(names::RIGHT, keys::RIGHT_ARROW, 1.0),
        ButtonBinding::key(names::UP, keys::UP_ARROW, 1.0),
        ButtonBinding::key(names::DOWN, keys::DOWN_ARROW, -1.0),
        ButtonBinding::key(names::A, keys::F, 1.0),
        ButtonBinding::key(names::B, keys::D, 1.0),
        ButtonBinding::key(names::PAUSE, keys::ENTER, 1.0),
        // Alias - pressing A or B also fires ACCEPT
        ButtonBinding::alias(names::ACCEPT, [names::A, names::B], 1.0),
    ]
}

/// Factory bindings for gamepads with analog sticks
pub fn default_joystick_bindings() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding::axis_negative(names::LEFT, 0, -1.0),
        ButtonBinding::axis_positive(names::RIGHT, 0, 1.0),
        ButtonBinding::axis_negative(names::UP, 1, 1.0),
        ButtonBinding::axis_positive(names::DOWN, 1, -1.0),
        ButtonBinding::button(names::A, 0, -1.0),
        ButtonBinding::button(names::B, 1, 1.0),
        ButtonBinding::button(names::PAUSE, 9, 1.0),
        ButtonBinding::buttons(names::ACCEPT, (0..8).collect(), 1.0),
    ]
}

/// Factory bindings for gamepads without axes
pub fn default_dpad_bindings() -> Vec<ButtonBinding> {
    vec![
        ButtonBinding::button(names::LEFT, 14, -1.0),
        ButtonBinding::button(names::RIGHT, 15, 1.0),
        ButtonBinding::button(names::UP, 12, 1.0),
        ButtonBinding::button(names::DOWN, 13, -1.0),
        ButtonBinding::button(names::A, 0, -1.0),
        ButtonBinding::button(names::B, 1, 1.0),
        ButtonBinding::button(names::PAUSE, 9, 1.0),
        ButtonBinding::buttons(names::ACCEPT, (0..8).collect(), 1.0),
    ]
}

/// Process-wide default configuration per archetype
#[derive(Debug, Clone)]
pub struct DefaultConfigs {
    configs: HashMap<Archetype, DeviceConfig>,
}

impl DefaultConfigs {
    /// Default table with no configurations at all
    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Default table filled with the factory bindings
    pub fn factory() -> Self {
        let mut defaults = Self::empty();
        defaults.set(Archetype::Keyboard, default_keyboard_bindings());
        defaults.set(Archetype::Joystick, default_joystick_bindings());
        defaults.set(Archetype::Dpad, default_dpad_bindings());
        defaults
    }

    /// Replace the default bindings for an archetype
    pub fn set(&mut self, archetype: Archetype, bindings: Vec<ButtonBinding>) {
        self.configs.insert(archetype, DeviceConfig::new(bindings));
    }

    pub fn get(&self, archetype: Archetype) -> Option<&DeviceConfig> {
        self.configs.get(&archetype)
    }

    /// Independent copy of the default for an archetype
    pub fn instantiate(&self, archetype: Archetype) -> Option<DeviceConfig> {
        self.get(archetype).map(DeviceConfig::copy_from)
    }
}

impl Default for DefaultConfigs {
    fn default() -> Self {
        Self::factory()
    }
}
