use nalgebra::Vector2;
use std::collections::HashMap;
use winit::dpi::PhysicalPosition;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub type KeyState = ElementState;

/// Per-frame keyboard, mouse and cursor state.
///
/// `is_key_down`/`is_button_down` report transitions that happened this
/// frame, `is_key_pressed` reports held keys, and `is_key_released` reports
/// a release that happened this frame. Deltas and transition lists reset in
/// [`InputManager::next_frame`].
#[derive(Debug, Default)]
pub struct InputManager {
    key_states: HashMap<KeyCode, KeyState>,
    key_just_updated: Vec<KeyCode>,
    button_states: HashMap<MouseButton, ElementState>,
    button_just_updated: Vec<MouseButton>,
    mouse_wheel_delta: f32,
    mouse_pos: PhysicalPosition<f32>,
    mouse_delta: Vector2<f32>,
    is_locked: bool,
    cursor_request: Option<bool>,
}

impl InputManager {
    pub fn new() -> Self {
        InputManager::default()
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = PhysicalPosition::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y as f64,
                    MouseScrollDelta::PixelDelta(pos) => pos.y,
                };
                self.mouse_wheel_delta += y as f32;
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.handle_button(*button, *state);
            }
            _ => {}
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse_delta += Vector2::new(delta.0 as f32, delta.1 as f32);
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, state: KeyState) {
        if !state.is_pressed()
            || self
                .key_states
                .get(&code)
                .is_none_or(|state| !state.is_pressed())
        {
            self.key_just_updated.push(code);
        }

        self.key_states.insert(code, state);
    }

    pub(crate) fn handle_button(&mut self, button: MouseButton, state: ElementState) {
        if !state.is_pressed()
            || self
                .button_states
                .get(&button)
                .is_none_or(|state| !state.is_pressed())
        {
            self.button_just_updated.push(button);
        }

        self.button_states.insert(button, state);
    }

    pub fn key_state(&self, key_code: KeyCode) -> KeyState {
        self.key_states
            .get(&key_code)
            .copied()
            .unwrap_or(ElementState::Released)
    }

    /// The key went down this frame.
    pub fn is_key_down(&self, key_code: KeyCode) -> bool {
        self.key_state(key_code).is_pressed() && self.key_just_updated.contains(&key_code)
    }

    /// The key is currently held.
    pub fn is_key_pressed(&self, key_code: KeyCode) -> bool {
        self.key_state(key_code).is_pressed()
    }

    /// The key was released this frame.
    pub fn is_key_released(&self, key_code: KeyCode) -> bool {
        !self.key_state(key_code).is_pressed() && self.key_just_updated.contains(&key_code)
    }

    pub fn button_state(&self, button: MouseButton) -> ElementState {
        self.button_states
            .get(&button)
            .copied()
            .unwrap_or(ElementState::Released)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.button_state(button).is_pressed() && self.button_just_updated.contains(&button)
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.button_state(button).is_pressed()
    }

    pub fn mouse_position(&self) -> PhysicalPosition<f32> {
        self.mouse_pos
    }

    /// Cursor movement accumulated since the last frame.
    pub fn mouse_delta(&self) -> Vector2<f32> {
        self.mouse_delta
    }

    pub fn mouse_wheel_delta(&self) -> f32 {
        self.mouse_wheel_delta
    }

    /// Asks the windowing layer to capture and hide the cursor.
    pub fn lock_cursor(&mut self) {
        self.is_locked = true;
        self.cursor_request = Some(true);
    }

    pub fn unlock_cursor(&mut self) {
        self.is_locked = false;
        self.cursor_request = Some(false);
    }

    pub fn is_cursor_locked(&self) -> bool {
        self.is_locked
    }

    /// The pending capture change, consumed by the windowing layer.
    pub fn take_cursor_request(&mut self) -> Option<bool> {
        self.cursor_request.take()
    }

    pub fn next_frame(&mut self) {
        self.key_just_updated.clear();
        self.button_just_updated.clear();
        self.mouse_delta = Vector2::zeros();
        self.mouse_wheel_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_transitions_reset_each_frame() {
        let mut input = InputManager::new();

        input.handle_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(!input.is_key_released(KeyCode::KeyW));

        input.next_frame();
        assert!(!input.is_key_down(KeyCode::KeyW));
        assert!(input.is_key_pressed(KeyCode::KeyW));

        input.handle_key(KeyCode::KeyW, ElementState::Released);
        assert!(input.is_key_released(KeyCode::KeyW));
        assert!(!input.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn key_repeats_do_not_retrigger_down() {
        let mut input = InputManager::new();

        input.handle_key(KeyCode::Space, ElementState::Pressed);
        input.next_frame();
        input.handle_key(KeyCode::Space, ElementState::Pressed);

        assert!(input.is_key_pressed(KeyCode::Space));
        assert!(!input.is_key_down(KeyCode::Space));
    }

    #[test]
    fn mouse_delta_accumulates_until_next_frame() {
        let mut input = InputManager::new();

        input.process_device_event(&DeviceEvent::MouseMotion { delta: (2.0, 3.0) });
        input.process_device_event(&DeviceEvent::MouseMotion { delta: (1.0, -1.0) });
        assert_eq!(input.mouse_delta(), Vector2::new(3.0, 2.0));

        input.next_frame();
        assert_eq!(input.mouse_delta(), Vector2::zeros());
    }

    #[test]
    fn cursor_requests_are_consumed_once() {
        let mut input = InputManager::new();

        input.lock_cursor();
        assert!(input.is_cursor_locked());
        assert_eq!(input.take_cursor_request(), Some(true));
        assert_eq!(input.take_cursor_request(), None);

        input.unlock_cursor();
        assert_eq!(input.take_cursor_request(), Some(false));
    }
}
