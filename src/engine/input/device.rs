// Per-device input state, edge detection and dispatch

use super::action::{names, ActionEvent, Edge};
use super::axis::{AxisMode, AxisNormalizer, DEFAULT_AXIS_THRESHOLD};
use super::binding::{ButtonBinding, PhysicalInput, SourceRef};
use super::capture::{CaptureState, RemapCapture, DEFAULT_SUPPRESS_DURATION};
use super::config::{Archetype, DefaultConfigs, DeviceConfig};
use super::handlers::HandlerTable;
use super::source::RawGamepad;
use super::store::{load_device_config, save_device_config, ConfigStore};
use super::InputError;
use log::{debug, info};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Only axes below this index may be captured while remapping
pub const MAX_CAPTURE_AXES: usize = 3;

/// Tunables applied to every device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceOptions {
    pub axis_threshold: f32,
    pub axis_mode: AxisMode,
    /// Keep firing `down` for held direction actions on every poll
    pub text_input: bool,
    /// Quiet period around remap capture
    pub suppress_for: Duration,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            axis_threshold: DEFAULT_AXIS_THRESHOLD,
            axis_mode: AxisMode::Threshold,
            text_input: false,
            suppress_for: DEFAULT_SUPPRESS_DURATION,
        }
    }
}

/// Which kinds of input count as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityFilter {
    pub include_axes: bool,
    pub include_buttons: bool,
    pub include_keys: bool,
}

impl ActivityFilter {
    pub fn all() -> Self {
        Self {
            include_axes: true,
            include_buttons: true,
            include_keys: true,
        }
    }

    pub fn buttons_only() -> Self {
        Self {
            include_axes: false,
            include_buttons: true,
            include_keys: true,
        }
    }
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// One logical controller: a physical gamepad or a keyboard acting as one
#[derive(Debug)]
pub struct InputDevice {
    name: String,
    slot: usize,
    keyboard: bool,
    replace_keyboard: bool,
    archetype: Option<Archetype>,
    connected: bool,
    id: Option<String>,
    index: Option<usize>,
    /// Host index of the most recently attached gamepad, kept across
    /// disconnects
    last_index: Option<usize>,

    /// Last recorded pressed state per raw button
    buttons: Vec<bool>,
    /// Last recorded normalized value per raw axis
    axes: Vec<f32>,
    /// Currently held key codes
    keys: HashSet<u32>,

    config: Option<DeviceConfig>,
    handlers: HandlerTable,
    normalizer: AxisNormalizer,
    text_input: bool,
    capture: RemapCapture,
}

impl InputDevice {
    /// Create an unbound gamepad device; archetype and config are derived on
    /// connect
    pub fn gamepad(name: impl Into<String>, slot: usize, options: DeviceOptions) -> Self {
        Self::with_kind(name.into(), slot, false, false, options)
    }

    /// Create a keyboard-backed device and load its keyboard config
    pub fn keyboard(
        name: impl Into<String>,
        slot: usize,
        replace_keyboard: bool,
        options: DeviceOptions,
        store: &dyn ConfigStore,
        defaults: &DefaultConfigs,
    ) -> Self {
        let mut device = Self::with_kind(name.into(), slot, true, replace_keyboard, options);
        device.load_config(store, defaults);
        device
    }

    fn with_kind(
        name: String,
        slot: usize,
        keyboard: bool,
        replace_keyboard: bool,
        options: DeviceOptions,
    ) -> Self {
        Self {
            name,
            slot,
            keyboard,
            replace_keyboard,
            archetype: keyboard.then_some(Archetype::Keyboard),
            connected: false,
            id: None,
            index: None,
            last_index: None,
            buttons: Vec::new(),
            axes: Vec::new(),
            keys: HashSet::new(),
            config: None,
            handlers: HandlerTable::new(),
            normalizer: AxisNormalizer::new(options.axis_threshold, options.axis_mode),
            text_input: options.text_input,
            capture: RemapCapture::new(options.suppress_for),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_keyboard(&self) -> bool {
        self.keyboard
    }

    /// Whether a connecting gamepad may take over this keyboard's slot
    pub fn replaces_keyboard(&self) -> bool {
        self.keyboard && self.replace_keyboard
    }

    pub fn archetype(&self) -> Option<Archetype> {
        self.archetype
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Host id of the attached gamepad
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Host index of the attached gamepad
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Host index of the last gamepad attached to this device
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    pub fn is_key_pressed(&self, code: u32) -> bool {
        self.keys.contains(&code)
    }

    pub fn normalizer(&self) -> &AxisNormalizer {
        &self.normalizer
    }

    pub fn set_text_input(&mut self, enabled: bool) {
        self.text_input = enabled;
    }

    pub fn config(&self) -> Option<&DeviceConfig> {
        self.config.as_ref()
    }

    pub fn config_mut(&mut self) -> Option<&mut DeviceConfig> {
        self.config.as_mut()
    }

    /// Replace the active bindings
    pub fn set_config(&mut self, config: DeviceConfig) {
        self.capture.cancel();
        self.config = Some(config);
    }

    /// Bindings that can be remapped
    pub fn configurable_bindings(&self) -> Vec<&ButtonBinding> {
        self.config
            .as_ref()
            .map(|config| config.configurable().collect())
            .unwrap_or_default()
    }

    /// Install a device-level listener, overriding the shared one for `edge`
    pub fn on<F>(&mut self, edge: Edge, handler: F)
    where
        F: FnMut(&ActionEvent<'_>) + 'static,
    {
        self.handlers.on(edge, handler);
    }

    /// Remove the device-level listener for `edge`
    pub fn ignore(&mut self, edge: Edge) -> bool {
        self.handlers.remove(edge)
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Move the handler table out, leaving this device with none
    pub fn take_handlers(&mut self) -> HandlerTable {
        std::mem::take(&mut self.handlers)
    }

    pub fn set_handlers(&mut self, handlers: HandlerTable) {
        self.handlers = handlers;
    }

    /// Reload the bindings for the current archetype: stored override first,
    /// then a copy of the default table
    pub fn load_config(&mut self, store: &dyn ConfigStore, defaults: &DefaultConfigs) {
        self.capture.cancel();
        self.config = self.archetype.and_then(|archetype| {
            load_device_config(store, &self.name, archetype)
                .or_else(|| defaults.instantiate(archetype))
        });
        if self.config.is_none() {
            debug!("{} has no bindings for {:?}", self.name, self.archetype);
        }
    }

    /// Persist the active bindings under this device's name
    pub fn save_config(&mut self, store: &mut dyn ConfigStore) -> anyhow::Result<()> {
        let (Some(archetype), Some(config)) = (self.archetype, self.config.as_mut()) else {
            return Ok(());
        };
        config.clear_selection();
        self.capture.cancel();
        save_device_config(store, &self.name, archetype, config)
    }

    /// Attach a physical gamepad and record its current state as baseline
    pub fn connect(&mut self, raw: &RawGamepad, store: &dyn ConfigStore, defaults: &DefaultConfigs) {
        self.keyboard = false;
        self.connected = true;
        self.id = Some(raw.id.clone());
        self.index = Some(raw.index);
        self.last_index = Some(raw.index);
        self.buttons = vec![false; raw.buttons.len()];
        self.axes = vec![0.0; raw.axes.len()];
        self.keys.clear();

        let archetype = Archetype::from_axis_count(raw.axes.len());
        if self.archetype != Some(archetype) || self.config.is_none() {
            self.archetype = Some(archetype);
            self.load_config(store, defaults);
        }

        for (recorded, button) in self.buttons.iter_mut().zip(&raw.buttons) {
            *recorded = button.pressed;
        }
        for (recorded, axis) in self.axes.iter_mut().zip(&raw.axes) {
            *recorded = self.normalizer.normalize(*axis);
        }

        info!(
            "{} connected to {} (index {}, {} buttons, {} axes, {})",
            self.name,
            raw.id,
            raw.index,
            raw.buttons.len(),
            raw.axes.len(),
            archetype
        );
    }

    /// Take over the physical identity of another device
    pub fn connect_from(
        &mut self,
        other: &InputDevice,
        store: &dyn ConfigStore,
        defaults: &DefaultConfigs,
    ) {
        self.keyboard = false;
        self.connected = true;
        self.id = other.id.clone();
        self.index = other.index;
        self.last_index = other.last_index;
        self.buttons = other.buttons.clone();
        self.axes = other.axes.clone();
        self.archetype = other.archetype;
        self.load_config(store, defaults);
        debug!("{} took over {:?} from {}", self.name, self.id, other.name);
    }

    /// Detach the physical gamepad; bindings and handlers stay
    pub fn disconnect(&mut self) {
        if let Some(id) = self.id.take() {
            info!("{} disconnected from {}", self.name, id);
        }
        self.connected = false;
        self.index = None;
        self.buttons.clear();
        self.axes.clear();
        self.cancel_capture();
    }

    /// Wait for the next input and bind it to the named action
    pub fn start_capture(&mut self, action: &str, now: Instant) -> Result<(), InputError> {
        let config = self
            .config
            .as_mut()
            .ok_or_else(|| InputError::NoConfig(self.name.clone()))?;
        let position = config
            .direct_position(action)
            .ok_or_else(|| InputError::UnknownAction(action.to_string()))?;

        config.clear_selection();
        config.bindings_mut()[position].selected = true;
        self.capture.begin(position, now);
        info!("{} waiting for input to bind {}", self.name, action);
        Ok(())
    }

    pub fn cancel_capture(&mut self) {
        if self.capture.cancel().is_some() {
            if let Some(config) = self.config.as_mut() {
                config.clear_selection();
            }
        }
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    /// Whether input arriving at `now` is ignored
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.capture.is_suppressed(now)
    }

    fn bind_captured(&mut self, source: SourceRef, now: Instant) {
        let Some(position) = self.capture.complete(now) else {
            return;
        };
        let name = &self.name;
        if let Some(binding) = self
            .config
            .as_mut()
            .and_then(|config| config.bindings_mut().get_mut(position))
        {
            info!("{} bound {} to {:?}", name, binding.name, source);
            binding.source = source;
            binding.selected = false;
        }
    }

    /// Process a keyboard notification
    pub fn handle_key(&mut self, edge: Edge, code: u32, fallback: &mut HandlerTable, now: Instant) {
        if self.capture.is_suppressed(now) {
            return;
        }

        if self.capture.is_awaiting() && edge == Edge::Down {
            self.bind_captured(SourceRef::Key(code), now);
            return;
        }

        match edge {
            Edge::Down => self.keys.insert(code),
            Edge::Up => self.keys.remove(&code),
        };

        let Some(config) = self.config.as_ref() else {
            return;
        };
        let events: Vec<(String, f32)> = config
            .matching(PhysicalInput::Key(code))
            .into_iter()
            .map(|i| {
                let binding = &config.bindings()[i];
                let value = match edge {
                    Edge::Down => binding.multiplier,
                    Edge::Up => 0.0,
                };
                (binding.name.clone(), value)
            })
            .collect();

        for (action, value) in events {
            self.emit(fallback, edge, &action, value);
        }
    }

    /// Process one polled snapshot of the attached gamepad
    pub fn handle_input(&mut self, raw: &RawGamepad, fallback: &mut HandlerTable, now: Instant) {
        if self.capture.is_suppressed(now) {
            return;
        }

        if self.capture.is_awaiting() {
            self.capture_from_frame(raw, now);
            return;
        }

        if self.buttons.len() < raw.buttons.len() {
            self.buttons.resize(raw.buttons.len(), false);
        }
        if self.axes.len() < raw.axes.len() {
            self.axes.resize(raw.axes.len(), 0.0);
        }

        let Some(config) = self.config.as_ref() else {
            return;
        };
        let mut events: Vec<(Edge, String, f32)> = Vec::new();

        for (index, button) in raw.buttons.iter().enumerate() {
            let previous = std::mem::replace(&mut self.buttons[index], button.pressed);
            let matches = config.matching(PhysicalInput::Button(index));
            if matches.is_empty() {
                continue;
            }

            let repeat = self.text_input
                && button.pressed
                && matches
                    .iter()
                    .any(|&i| names::is_direction(&config.bindings()[i].name));
            if previous == button.pressed && !repeat {
                continue;
            }

            let edge = Edge::from_pressed(button.pressed);
            for &i in &matches {
                let binding = &config.bindings()[i];
                let value = match edge {
                    Edge::Down => button.value.abs() * binding.multiplier,
                    Edge::Up => 0.0,
                };
                events.push((edge, binding.name.clone(), value));
            }
        }

        for (index, &raw_value) in raw.axes.iter().enumerate() {
            let value = self.normalizer.normalize(raw_value);
            let previous = std::mem::replace(&mut self.axes[index], value);
            let repeat = self.text_input && value != 0.0;
            if previous == value && !repeat {
                continue;
            }

            for i in config.matching_axis(index) {
                let binding = &config.bindings()[i];
                let Some((_, polarity)) = binding.source.axis() else {
                    continue;
                };
                let active = value != 0.0 && value.signum() == polarity;
                let was_active = previous != 0.0 && previous.signum() == polarity;
                if active {
                    events.push((Edge::Down, binding.name.clone(), value.abs() * binding.multiplier));
                } else if was_active {
                    events.push((Edge::Up, binding.name.clone(), 0.0));
                }
            }
        }

        for (edge, action, value) in events {
            self.emit(fallback, edge, &action, value);
        }
    }

    /// First pressed button wins, then the first deflected axis
    fn capture_from_frame(&mut self, raw: &RawGamepad, now: Instant) {
        let normalizer = self.normalizer;
        let source = raw
            .buttons
            .iter()
            .position(|b| b.pressed)
            .map(SourceRef::Button)
            .or_else(|| {
                raw.axes
                    .iter()
                    .take(MAX_CAPTURE_AXES)
                    .enumerate()
                    .find_map(|(index, &axis)| {
                        let value = normalizer.normalize(axis);
                        if value > 0.0 {
                            Some(SourceRef::AxisPositive(index))
                        } else if value < 0.0 {
                            Some(SourceRef::AxisNegative(index))
                        } else {
                            None
                        }
                    })
            });

        if let Some(source) = source {
            self.bind_captured(source, now);
        }
    }

    fn emit(&mut self, fallback: &mut HandlerTable, edge: Edge, action: &str, value: f32) {
        let event = ActionEvent {
            edge,
            action,
            value,
            slot: self.slot,
            device: &self.name,
        };
        self.handlers.dispatch(fallback, &event);
    }

    /// Level state per action: the multiplier while its source is held, else 0
    pub fn state(&self, actions: &[&str]) -> Vec<f32> {
        actions
            .iter()
            .map(|action| {
                self.config
                    .as_ref()
                    .and_then(|config| config.find(action).map(|b| (config, b)))
                    .filter(|(config, binding)| self.is_held(config, binding))
                    .map_or(0.0, |(_, binding)| binding.multiplier)
            })
            .collect()
    }

    fn is_held(&self, config: &DeviceConfig, binding: &ButtonBinding) -> bool {
        let button = |i: &usize| self.buttons.get(*i).copied().unwrap_or(false);
        let axis = |i: &usize| self.axes.get(*i).copied().unwrap_or(0.0);
        match &binding.source {
            SourceRef::Key(code) => self.keys.contains(code),
            SourceRef::Button(index) => button(index),
            SourceRef::Buttons(indices) => indices.iter().any(button),
            SourceRef::AxisPositive(index) => axis(index) > 0.0,
            SourceRef::AxisNegative(index) => axis(index) < 0.0,
            SourceRef::Alias(targets) => config.bindings().iter().any(|sibling| {
                !matches!(sibling.source, SourceRef::Alias(_))
                    && targets.contains(&sibling.name)
                    && self.is_held(config, sibling)
            }),
        }
    }

    /// Whether any recorded input is currently active
    pub fn has_activity(&self, filter: ActivityFilter) -> bool {
        (filter.include_axes && self.axes.iter().any(|a| *a != 0.0))
            || (filter.include_buttons && self.buttons.iter().any(|b| *b))
            || (filter.include_keys && self.keyboard && !self.keys.is_empty())
    }
}
