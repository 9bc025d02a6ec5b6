//! Live peripherals
//!
//! While recording, the host feeds its input events in and the controller
//! snapshots the peripherals once per tick. During playback the controller
//! loads recorded ticks back in; the difference between consecutive subtick
//! states is queued as events for the host to deliver to the game.

use std::collections::VecDeque;

use super::camera::{Camera, CameraEvent, CameraState};
use super::keyboard::{Keyboard, KeyboardEvent, KeyboardState};
use super::mouse::{Mouse, MouseEvent, MouseState};
use crate::tick::TickContainer;

#[derive(Debug, Default)]
pub struct VirtualInput {
    keyboard: Keyboard,
    mouse: Mouse,
    camera: Camera,
    keyboard_events: VecDeque<KeyboardEvent>,
    mouse_events: VecDeque<MouseEvent>,
    camera_events: VecDeque<CameraEvent>,
}

impl VirtualInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn key_event(&mut self, code: i32, pressed: bool, character: Option<char>) {
        self.keyboard.key_event(code, pressed, character);
    }

    pub fn mouse_event(&mut self, code: i32, pressed: bool, scroll: i32, cursor_x: i32, cursor_y: i32) {
        self.mouse
            .mouse_event(code, pressed, scroll, cursor_x, cursor_y);
    }

    pub fn rotate_camera(&mut self, pitch_delta: f32, yaw_delta: f32) {
        self.camera.rotate(pitch_delta, yaw_delta);
    }

    pub fn look(&mut self, pitch: f32, yaw: f32) {
        self.camera.look(pitch, yaw);
    }

    pub fn set_camera(&mut self, pitch: f32, yaw: f32) {
        self.camera.set(pitch, yaw);
    }

    /// Copy of the peripherals as they stand this tick
    pub fn snapshot(&self) -> TickContainer {
        TickContainer::with_inputs(
            self.keyboard.clone(),
            self.mouse.clone(),
            self.camera.clone(),
        )
    }

    /// Drop subticks and per-update data; held keys, cursor and camera persist
    pub fn begin_tick(&mut self) {
        self.keyboard.begin_tick();
        self.mouse.begin_tick();
        self.camera.begin_tick();
    }

    /// Load a recorded tick, queueing the events that reproduce every one of
    /// its subtick states in order
    pub fn play_tick(&mut self, tick: &TickContainer) {
        let mut keyboard = self.keyboard.current().clone();
        for state in tick.keyboard.all() {
            self.keyboard_events.extend(keyboard.difference(state));
            keyboard = state.clone();
        }

        let mut mouse = self.mouse.current().clone();
        for state in tick.mouse.all() {
            self.mouse_events.extend(mouse.difference(state));
            mouse = state.clone();
        }

        let mut camera = *self.camera.current();
        for state in tick.camera.all() {
            self.camera_events.extend(camera.difference(state));
            camera = *state;
        }

        self.keyboard.reset_to(keyboard);
        self.mouse.reset_to(mouse);
        self.camera.reset_to(camera);
    }

    /// Release every held key and button, queueing the release events.
    /// The camera is left where it is.
    pub fn release_all(&mut self) {
        let empty_keyboard = KeyboardState::default();
        self.keyboard_events
            .extend(self.keyboard.current().difference(&empty_keyboard));

        let (cursor_x, cursor_y) = self.mouse.current().cursor();
        let released_mouse = MouseState::new([], 0, cursor_x, cursor_y);
        self.mouse_events
            .extend(self.mouse.current().difference(&released_mouse));

        self.keyboard.reset_to(empty_keyboard);
        self.mouse.reset_to(released_mouse);
    }

    /// Forget everything, including queued events
    pub fn clear(&mut self) {
        self.keyboard.clear();
        self.mouse.clear();
        self.camera.reset_to(CameraState::default());
        self.keyboard_events.clear();
        self.mouse_events.clear();
        self.camera_events.clear();
    }

    pub fn poll_keyboard_event(&mut self) -> Option<KeyboardEvent> {
        self.keyboard_events.pop_front()
    }

    pub fn poll_mouse_event(&mut self) -> Option<MouseEvent> {
        self.mouse_events.pop_front()
    }

    pub fn poll_camera_event(&mut self) -> Option<CameraEvent> {
        self.camera_events.pop_front()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.keyboard_events.is_empty()
            || !self.mouse_events.is_empty()
            || !self.camera_events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::MOUSE_LEFT;

    #[test]
    fn test_snapshot_and_begin_tick() {
        let mut input = VirtualInput::new();
        input.key_event(17, true, Some('w'));
        input.key_event(29, true, None);

        let tick = input.snapshot();
        assert_eq!(tick.keyboard.len(), 2);

        input.begin_tick();
        assert_eq!(input.keyboard().len(), 1);
        assert!(input.keyboard().current().is_pressed(17));
        assert!(input.keyboard().current().chars().is_empty());
    }

    #[test]
    fn test_play_tick_replays_every_subtick() {
        let mut recorder = VirtualInput::new();
        recorder.key_event(17, true, None);
        recorder.key_event(29, true, None);
        recorder.key_event(17, false, None);
        let tick = recorder.snapshot();

        let mut player = VirtualInput::new();
        player.play_tick(&tick);

        let mut replayed = KeyboardState::default();
        let mut states = Vec::new();
        while let Some(event) = player.poll_keyboard_event() {
            replayed.apply(&event);
            states.push(replayed.clone());
        }
        let expected: Vec<_> = tick.keyboard.all().cloned().collect();
        assert_eq!(states, expected);
        assert_eq!(player.keyboard().current(), tick.keyboard.current());
    }

    #[test]
    fn test_release_all() {
        let mut input = VirtualInput::new();
        input.key_event(17, true, None);
        input.mouse_event(MOUSE_LEFT, true, 0, 5, 5);
        input.release_all();

        assert!(input.keyboard().current().keys().is_empty());
        assert!(input.mouse().current().buttons().is_empty());
        assert_eq!(input.mouse().current().cursor(), (5, 5));
        assert_eq!(input.poll_keyboard_event().map(|e| e.pressed), Some(false));
        assert_eq!(input.poll_mouse_event().map(|e| e.code), Some(MOUSE_LEFT));
    }
}
