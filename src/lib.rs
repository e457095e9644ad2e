// padflex - Keyboard and gamepad action mapping with remappable bindings

pub mod core;
pub mod engine;
