// Device registry - Slot assignment and event fan-out for every controller

use super::action::{dom_key_code, ActionEvent, Edge};
use super::binding::ButtonBinding;
use super::config::{Archetype, DefaultConfigs, DeviceConfig};
use super::device::{ActivityFilter, DeviceOptions, InputDevice};
use super::handlers::HandlerTable;
use super::source::{GamepadSource, RawGamepad};
use super::store::ConfigStore;
use super::InputError;
use log::{debug, info, warn};
use std::time::Instant;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Devices with fewer buttons plus axes than this are auxiliary and ignored
pub const MIN_GAMEPAD_INPUTS: usize = 4;

/// Options for a keyboard-backed controller
#[derive(Debug, Clone, Default)]
pub struct KeyboardOptions {
    /// Let the next connecting gamepad take over this controller's slot
    pub replace_keyboard: bool,
    /// Bindings used instead of the stored or default keyboard config
    pub config: Option<Vec<ButtonBinding>>,
}

/// What kind of device a free slot is being looked up for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSearch {
    Keyboard,
    /// Physical gamepads may also take slots of replaceable keyboards
    Physical,
}

/// Owns every controller, indexed by slot ("P1" is slot 0)
pub struct DeviceRegistry {
    slots: Vec<Option<InputDevice>>,
    defaults: DefaultConfigs,
    store: Box<dyn ConfigStore>,
    /// Listeners used when a device has none of its own
    global: HandlerTable,
    options: DeviceOptions,
}

impl DeviceRegistry {
    /// Create a registry with factory defaults and default options
    pub fn new(store: impl ConfigStore + 'static) -> Self {
        Self::with_options(store, DeviceOptions::default())
    }

    pub fn with_options(store: impl ConfigStore + 'static, options: DeviceOptions) -> Self {
        Self {
            slots: Vec::new(),
            defaults: DefaultConfigs::factory(),
            store: Box::new(store),
            global: HandlerTable::new(),
            options,
        }
    }

    pub fn options(&self) -> &DeviceOptions {
        &self.options
    }

    /// Replace the default bindings of an archetype for devices loaded from
    /// now on
    pub fn set_default_config(&mut self, archetype: Archetype, bindings: Vec<ButtonBinding>) {
        self.defaults.set(archetype, bindings);
    }

    pub fn defaults(&self) -> &DefaultConfigs {
        &self.defaults
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn ConfigStore {
        self.store.as_mut()
    }

    /// Install a shared listener used by devices without their own
    pub fn on_event<F>(&mut self, edge: Edge, handler: F)
    where
        F: FnMut(&ActionEvent<'_>) + 'static,
    {
        self.global.on(edge, handler);
    }

    pub fn remove_event(&mut self, edge: Edge) -> bool {
        self.global.remove(edge)
    }

    /// Toggle direction repeat on every current and future device
    pub fn set_text_input(&mut self, enabled: bool) {
        self.options.text_input = enabled;
        for device in self.slots.iter_mut().flatten() {
            device.set_text_input(enabled);
        }
    }

    pub fn device(&self, slot: usize) -> Option<&InputDevice> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn device_mut(&mut self, slot: usize) -> Option<&mut InputDevice> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Every occupied slot in order
    pub fn devices(&self) -> impl Iterator<Item = &InputDevice> {
        self.slots.iter().flatten()
    }

    /// Number of slots, occupied or not
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// First slot a new device may take. Returns `slot_count()` when every
    /// slot is taken.
    pub fn find_free_slot(&self, search: SlotSearch) -> usize {
        self.slots
            .iter()
            .position(|slot| match slot {
                None => true,
                Some(device) => search == SlotSearch::Physical && device.replaces_keyboard(),
            })
            .unwrap_or(self.slots.len())
    }

    fn place(&mut self, slot: usize, device: InputDevice) {
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(device);
    }

    /// Add a keyboard-backed controller and return its slot
    pub fn add_keyboard_controller(&mut self, options: KeyboardOptions) -> usize {
        let slot = self.find_free_slot(SlotSearch::Keyboard);
        let mut device = InputDevice::keyboard(
            slot_name(slot),
            slot,
            options.replace_keyboard,
            self.options,
            self.store.as_ref(),
            &self.defaults,
        );
        if let Some(bindings) = options.config {
            device.set_config(DeviceConfig::new(bindings));
        }

        info!("Keyboard controller {} added", device.name());
        self.place(slot, device);
        slot
    }

    /// Attach a physical gamepad. Returns the slot it landed in, or `None`
    /// when the device is auxiliary or already connected.
    pub fn connect_gamepad(&mut self, raw: &RawGamepad) -> Option<usize> {
        if raw.input_count() < MIN_GAMEPAD_INPUTS {
            info!(
                "Ignoring auxiliary device {} ({} buttons, {} axes)",
                raw.id,
                raw.buttons.len(),
                raw.axes.len()
            );
            return None;
        }

        if self
            .devices()
            .any(|device| device.is_connected() && device.id() == Some(raw.id.as_str()))
        {
            debug!("{} is already connected", raw.id);
            return None;
        }

        // Reconnects prefer the slot last attached to the same host index,
        // then the first disconnected gamepad
        let reusable_for = |wanted: Option<usize>| {
            self.slots.iter().position(|slot| {
                slot.as_ref().is_some_and(|device| {
                    !device.is_keyboard()
                        && !device.is_connected()
                        && wanted.map_or(true, |index| device.last_index() == Some(index))
                })
            })
        };
        let reusable = reusable_for(Some(raw.index)).or_else(|| reusable_for(None));
        if let Some(slot) = reusable {
            if let Some(device) = self.slots[slot].as_mut() {
                device.connect(raw, self.store.as_ref(), &self.defaults);
            }
            return Some(slot);
        }

        let slot = self.find_free_slot(SlotSearch::Physical);
        let mut device = InputDevice::gamepad(slot_name(slot), slot, self.options);
        if let Some(keyboard) = self.slots.get_mut(slot).and_then(Option::as_mut) {
            info!("{} replaces keyboard controller {}", raw.id, keyboard.name());
            device.set_handlers(keyboard.take_handlers());
        }
        device.connect(raw, self.store.as_ref(), &self.defaults);
        self.place(slot, device);
        Some(slot)
    }

    /// Detach the gamepad with host id `id`; its slot and bindings stay
    pub fn disconnect_gamepad(&mut self, id: &str) -> bool {
        match self
            .slots
            .iter_mut()
            .flatten()
            .find(|device| device.id() == Some(id))
        {
            Some(device) => {
                device.disconnect();
                true
            }
            None => {
                warn!("Disconnect for unknown device {}", id);
                false
            }
        }
    }

    /// Feed a key notification to every keyboard controller. Returns whether
    /// any keyboard controller exists to consume it.
    pub fn handle_key(&mut self, edge: Edge, code: u32) -> bool {
        self.handle_key_at(edge, code, Instant::now())
    }

    pub fn handle_key_at(&mut self, edge: Edge, code: u32, now: Instant) -> bool {
        let mut consumed = false;
        for device in self.slots.iter_mut().flatten() {
            if device.is_keyboard() {
                device.handle_key(edge, code, &mut self.global, now);
                consumed = true;
            }
        }
        consumed
    }

    /// Feed a winit keyboard event. Auto-repeat presses and keys without a
    /// key code are skipped.
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(key_code) = event.physical_key else {
            return false;
        };
        let Some(code) = dom_key_code(key_code) else {
            return false;
        };

        match event.state {
            ElementState::Pressed if event.repeat => false,
            ElementState::Pressed => self.handle_key(Edge::Down, code),
            ElementState::Released => self.handle_key(Edge::Up, code),
        }
    }

    /// Poll the host and run edge detection for every connected gamepad
    pub fn process_activity(&mut self, source: &mut impl GamepadSource) {
        self.process_activity_at(source, Instant::now());
    }

    pub fn process_activity_at(&mut self, source: &mut impl GamepadSource, now: Instant) {
        for raw in source.gamepads() {
            if let Some(device) = self
                .slots
                .iter_mut()
                .flatten()
                .find(|device| device.is_connected() && device.index() == Some(raw.index))
            {
                device.handle_input(&raw, &mut self.global, now);
            }
        }
    }

    /// Whether any device currently holds an input
    pub fn any_activity(&self, filter: ActivityFilter) -> bool {
        self.devices().any(|device| device.has_activity(filter))
    }

    /// Begin remapping `action` on the device in `slot`
    pub fn start_capture(&mut self, slot: usize, action: &str) -> Result<(), InputError> {
        self.start_capture_at(slot, action, Instant::now())
    }

    pub fn start_capture_at(
        &mut self,
        slot: usize,
        action: &str,
        now: Instant,
    ) -> Result<(), InputError> {
        self.device_mut(slot)
            .ok_or(InputError::UnknownSlot(slot))?
            .start_capture(action, now)
    }

    /// Persist the bindings of the device in `slot`
    pub fn save_config(&mut self, slot: usize) -> anyhow::Result<()> {
        let device = self
            .slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(InputError::UnknownSlot(slot))?;
        device.save_config(self.store.as_mut())
    }
}

fn slot_name(slot: usize) -> String {
    format!("P{}", slot + 1)
}
