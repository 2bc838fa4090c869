/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec2;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseWheel { delta_y: f32 },

    // Window events
    FocusLost,
    PointerLockChanged { locked: bool },
}

/// Held keys and the analog deltas accumulated since they were last consumed.
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub look_delta: (f32, f32),
    pub scroll_delta: f32,
    pub pointer_locked: bool,
    /// Keys that went down since the last fixed tick sampled them.
    pending_presses: Vec<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            look_delta: (0.0, 0.0),
            scroll_delta: 0.0,
            pointer_locked: false,
            pending_presses: Vec::new(),
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                let key = normalize_key(key);
                // Auto-repeat arrives as more KeyDowns; only the first one is a press
                if self.pressed_keys.insert(key.clone()) {
                    self.pending_presses.push(key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(normalize_key(key).as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseWheel { delta_y } => {
                self.scroll_delta += delta_y;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
                if !locked {
                    self.look_delta = (0.0, 0.0);
                }
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
        self.pending_presses.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    pub fn consume_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_delta)
    }

    pub fn consume_presses(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_presses)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Single characters are stored lowercase so "W" and "w" are the same key.
fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

/// Key mapping configuration
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub shift_up: String,
    pub shift_down: String,
    pub toggle_rig: String,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            shift_up: "e".to_string(),
            shift_down: "q".to_string(),
            toggle_rig: "c".to_string(),
            escape: "Escape".to_string(),
        }
    }
}

/// What the fixed tick consumes: held directional keys plus gear shift presses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub shift_up: bool,
    pub shift_down: bool,
}

/// What the frame update consumes: mouse and wheel movement since the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookInput {
    pub delta: Vec2,
    pub scroll: f32,
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.forward) || input.is_key_pressed("ArrowUp")
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.backward) || input.is_key_pressed("ArrowDown")
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.left) || input.is_key_pressed("ArrowLeft")
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.right) || input.is_key_pressed("ArrowRight")
    }

    pub fn wants_to_toggle_rig(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(&self.bindings.toggle_rig)
    }

    pub fn is_escape(&self, key: &str) -> bool {
        key == self.bindings.escape
    }

    /// Sample the held keys for one fixed tick and drain pending gear shifts.
    pub fn sample_drive(&self, input: &mut InputState) -> DriveInput {
        let presses = input.consume_presses();
        let pressed = |binding: &str| presses.iter().any(|k| k.eq_ignore_ascii_case(binding));
        DriveInput {
            forward: self.is_moving_forward(input),
            backward: self.is_moving_backward(input),
            left: self.is_moving_left(input),
            right: self.is_moving_right(input),
            shift_up: pressed(&self.bindings.shift_up),
            shift_down: pressed(&self.bindings.shift_down),
        }
    }

    /// Take everything the mouse did since the previous frame.
    pub fn take_look(&self, input: &mut InputState) -> LookInput {
        let (dx, dy) = input.consume_look();
        LookInput { delta: Vec2::new(dx, dy), scroll: input.consume_scroll() }
    }
}
