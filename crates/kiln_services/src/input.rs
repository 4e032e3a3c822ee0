//! Input state written by the event boundary and read by the frame loop
//! and scripts.

use kiln_core::math::Vec2;
use std::collections::HashSet;

/// Platform key code. Scripts pass the raw number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const SPACE: KeyCode = KeyCode(32);
    pub const F5: KeyCode = KeyCode(294);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
}

/// Events delivered by the windowing layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseMove(Vec2),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    mouse_position: Vec2,
    mouse_buttons: [bool; 3],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.held.insert(key);
                self.pressed.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.held.remove(&key);
            }
            InputEvent::MouseMove(position) => self.mouse_position = position,
            InputEvent::MouseDown(button) => self.mouse_buttons[button as usize] = true,
            InputEvent::MouseUp(button) => self.mouse_buttons[button as usize] = false,
        }
    }

    /// Forget this frame's key presses. Held keys stay held.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
    }

    /// Key currently held down.
    pub fn key(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Key went down since the last `begin_frame`.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Out-of-range button indices read as released.
    pub fn mouse_button(&self, index: usize) -> bool {
        self.mouse_buttons.get(index).copied().unwrap_or(false)
    }
}
