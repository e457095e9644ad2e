// Input handling system
//
// Maps keyboard keys and gamepad buttons/axes onto named logical actions and
// delivers `down`/`up` edge events to listeners, with per-device remapping
// and persisted configurations.
//
// ## Architecture
//
// - `action`: Action names, key codes and the edge event type
// - `axis`: Dead zone / step normalization of analog axes
// - `binding`: One action mapped onto one physical source
// - `config`: Per-archetype binding tables and their defaults
// - `handlers`: Edge listeners, per device and shared
// - `capture`: Remap capture and input suppression
// - `source`: Raw gamepad snapshots from the host
// - `store`: Configuration persistence
// - `device`: Per-device state and edge detection
// - `registry`: Slot assignment and fan-out to every device
//
// ## Usage Example
//
// ```rust
// use padflex::engine::input::{DeviceRegistry, Edge, JsonFileStore, KeyboardOptions};
//
// let mut registry = DeviceRegistry::new(JsonFileStore::new("config"));
// registry.add_keyboard_controller(KeyboardOptions::default());
// registry.on_event(Edge::Down, |e| println!("{} pressed {}", e.device, e.action));
//
// // In your event loop
// registry.process_keyboard_event(&key_event);
// registry.connect_gamepad(&raw_gamepad);
//
// // Once per frame
// registry.process_activity(&mut gamepads);
// ```

pub mod action;
pub mod axis;
pub mod binding;
pub mod capture;
pub mod config;
pub mod device;
pub mod handlers;
pub mod registry;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use action::{dom_key_code, keys, names, ActionEvent, Edge};
pub use axis::{AxisMode, AxisNormalizer, DEFAULT_AXIS_THRESHOLD};
pub use binding::{ButtonBinding, PhysicalInput, SourceRef};
pub use capture::{CaptureState, RemapCapture};
pub use config::{Archetype, DefaultConfigs, DeviceConfig};
pub use device::{ActivityFilter, DeviceOptions, InputDevice};
pub use handlers::{Handler, HandlerTable};
pub use registry::{DeviceRegistry, KeyboardOptions, SlotSearch};
pub use source::{GamepadSource, RawButton, RawGamepad};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};

/// Input system errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown device slot: {0}")]
    UnknownSlot(usize),

    #[error("Device has no configuration: {0}")]
    NoConfig(String),

    #[error("Invalid binding {name}: {reason}")]
    InvalidBinding { name: String, reason: String },

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
