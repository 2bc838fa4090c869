use std::time::Instant;

use tracing::{error, info, warn};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

use pole_position::controller::{FrameLoopContext, InputEvent};
use pole_position::model::{Doodad, Scene, Transform};
use pole_position::{logging, ControllerConfig};

/// Binding names for the keys the controller understands.
fn key_name(code: KeyCode) -> Option<&'static str> {
    let name = match code {
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::KeyE => "e",
        KeyCode::KeyQ => "q",
        KeyCode::KeyC => "c",
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::Escape => "Escape",
        _ => return None,
    };
    Some(name)
}

struct App {
    window: Window,
    frame_loop: FrameLoopContext,
    last_frame_time: Instant,
}

impl App {
    fn set_pointer_lock(&mut self, locked: bool) {
        if locked {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                warn!(%e, "cursor grab unavailable");
                return;
            }
            self.window.set_cursor_visible(false);
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
            self.window.set_cursor_visible(true);
        }
        self.frame_loop.handle_event(&InputEvent::PointerLockChanged { locked });
    }

    /// Returns true if the event was consumed.
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else {
                    return false;
                };
                let Some(name) = key_name(*code) else {
                    return false;
                };
                match state {
                    ElementState::Pressed => {
                        if self.frame_loop.input_processor.is_escape(name) {
                            self.set_pointer_lock(false);
                        }
                        self.frame_loop.handle_event(&InputEvent::KeyDown(name.to_string()));
                    }
                    ElementState::Released => {
                        self.frame_loop.handle_event(&InputEvent::KeyUp(name.to_string()));
                    }
                }
                true
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                self.set_pointer_lock(true);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.frame_loop.handle_event(&InputEvent::MouseWheel { delta_y });
                true
            }
            WindowEvent::Focused(false) => {
                self.frame_loop.handle_event(&InputEvent::FocusLost);
                false
            }
            _ => false,
        }
    }

    fn update_title(&self) {
        let telemetry = self.frame_loop.controller.telemetry();
        let camera = self.frame_loop.controller.camera().borrow();
        let gear = telemetry.gear.map_or_else(|| "-".to_string(), |g| (g + 1).to_string());
        self.window.set_title(&format!(
            "pole_position | gear {} | {:.1} m/s | {:?} | cam ({:.1}, {:.1}, {:.1}) yaw {:.0} pitch {:.0}",
            gear,
            telemetry.signed_speed_mps,
            self.frame_loop.controller.rig().mode(),
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            camera.yaw,
            camera.pitch,
        ));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = ControllerConfig::load_default()?;
    let player = Doodad::dynamic("player", Transform::default());
    let mut frame_loop = config.build_frame_loop(Scene::new("track"), player)?;
    frame_loop.awaken();

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("pole_position")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes)?;
    info!("click to capture the mouse, Esc releases it, c toggles the camera rig");

    let mut app = App { window, frame_loop, last_frame_time: Instant::now() };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let dt = (now - app.last_frame_time).as_secs_f32();
                        app.last_frame_time = now;

                        match app.frame_loop.advance(dt) {
                            Ok(_) => app.update_title(),
                            Err(e) => {
                                error!(%e, "player controller failed, stopping");
                                elwt.exit();
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
            // winit reports downward motion as positive dy; the rig pitches up on positive dy
            app.frame_loop.handle_event(&InputEvent::MouseMove { dx: delta.0 as f32, dy: -delta.1 as f32 });
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
