//! The single input event stream consumed by cameras and the simulation.
//!
//! winit events are narrowed to [`InputEvent`] by [`translate`], which also
//! keeps [`KeyState`] current so handlers can ask whether a key is still held.
//! Keys are physical key codes, so bindings follow key positions rather than
//! the active keyboard layout.

use std::collections::HashSet;

use winit::{
    event::{ElementState, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    WheelUp,
    WheelDown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseButtonDown(MouseButton),
    Resize { width: u32, height: u32 },
}

/// Keys currently held down.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    pressed: HashSet<KeyCode>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Mirrors a key event into the held set.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => self.press(key),
            InputEvent::KeyUp(key) => self.release(key),
            _ => {}
        }
    }
}

/// Narrows a window event, updating `keys`. Auto-repeated key presses and
/// events nobody listens to yield `None`.
pub fn translate(event: &WindowEvent, keys: &mut KeyState) -> Option<InputEvent> {
    let input = match event {
        WindowEvent::CloseRequested => InputEvent::Quit,
        WindowEvent::Resized(size) => InputEvent::Resize {
            width: size.width,
            height: size.height,
        },
        WindowEvent::KeyboardInput { event, .. } => {
            let PhysicalKey::Code(code) = event.physical_key else {
                return None;
            };
            if event.repeat {
                return None;
            }
            match event.state {
                ElementState::Pressed => InputEvent::KeyDown(code),
                ElementState::Released => InputEvent::KeyUp(code),
            }
        }
        WindowEvent::MouseWheel { delta, .. } => InputEvent::MouseButtonDown(wheel(*delta)?),
        WindowEvent::MouseInput {
            state: ElementState::Pressed,
            ..
        } => InputEvent::MouseButtonDown(MouseButton::Other),
        _ => return None,
    };
    keys.apply(&input);
    Some(input)
}

fn wheel(delta: MouseScrollDelta) -> Option<MouseButton> {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(position) => position.y,
    };
    if y > 0.0 {
        Some(MouseButton::WheelUp)
    } else if y < 0.0 {
        Some(MouseButton::WheelDown)
    } else {
        None
    }
}
