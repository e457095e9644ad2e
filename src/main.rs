use anyhow::Result;
use log::{info, warn};
use padflex::engine::input::{
    names, DeviceRegistry, Edge, JsonFileStore, KeyboardOptions, RawGamepad,
};
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

const CONFIG_DIR: &str = "padflex-config";

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting padflex demo...");

    let mut registry = DeviceRegistry::new(JsonFileStore::new(CONFIG_DIR));
    let keyboard = registry.add_keyboard_controller(KeyboardOptions {
        replace_keyboard: true,
        config: None,
    });
    registry.on_event(Edge::Down, |e| {
        info!("{} {} {} ({})", e.device, e.edge, e.action, e.value)
    });
    registry.on_event(Edge::Up, |e| info!("{} {} {}", e.device, e.edge, e.action));

    // No host gamepad backend in the demo; frames come from this list
    let mut gamepads: Vec<RawGamepad> = Vec::new();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("padflex")
        .with_inner_size(winit::dpi::LogicalSize::new(640, 360))
        .build(&event_loop)?;

    info!("Window created. F1 remaps A, F2 saves bindings to {}", CONFIG_DIR);

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => {
                let pressed = event.state == ElementState::Pressed && !event.repeat;
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::F1) if pressed => {
                        if let Err(e) = registry.start_capture(keyboard, names::A) {
                            warn!("Cannot remap: {}", e);
                        }
                    }
                    PhysicalKey::Code(KeyCode::F2) if pressed => {
                        if let Err(e) = registry.save_config(keyboard) {
                            warn!("Failed to save bindings: {}", e);
                        }
                    }
                    _ => {
                        registry.process_keyboard_event(&event);
                    }
                }
            }
            Event::AboutToWait => {
                registry.process_activity(&mut gamepads);
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
