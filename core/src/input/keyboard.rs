//! Keyboard snapshots
//!
//! A [`KeyboardState`] holds the pressed keys and the characters typed by the
//! update that produced it. [`Keyboard`] adds subtick tracking on top.

use super::pressed::PressedCodes;
use super::subtick::{SubtickValue, Subticked};
use crate::keys::KEY_NONE;

/// Keyboard with subtick history
pub type Keyboard = Subticked<KeyboardState>;

/// One replayable keyboard change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Key code, or [`KEY_NONE`] for a character-only event
    pub code: i32,
    pub pressed: bool,
    pub character: Option<char>,
}

impl KeyboardEvent {
    pub fn new(code: i32, pressed: bool, character: Option<char>) -> Self {
        Self {
            code,
            pressed,
            character,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    keys: PressedCodes,
    chars: Vec<char>,
}

impl SubtickValue for KeyboardState {
    fn begin_tick(&mut self) {
        self.chars.clear();
    }
}

impl KeyboardState {
    pub fn new(keys: impl IntoIterator<Item = i32>, chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            keys: PressedCodes::from_codes(keys),
            chars: chars.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> &PressedCodes {
        &self.keys
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn is_pressed(&self, code: i32) -> bool {
        self.keys.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.chars.is_empty()
    }

    /// Apply a single event without clearing characters
    pub fn apply(&mut self, event: &KeyboardEvent) {
        if event.code != KEY_NONE {
            self.keys.set(event.code, event.pressed);
        }
        if let Some(c) = event.character {
            self.chars.push(c);
        }
    }

    /// Apply a batch of events produced by one [`KeyboardState::difference`]
    /// call. Characters describe a single update, so they start empty.
    pub fn apply_events<'a>(&mut self, events: impl IntoIterator<Item = &'a KeyboardEvent>) {
        self.chars.clear();
        for event in events {
            self.apply(event);
        }
    }

    /// Minimal events that turn `self` into `next`.
    ///
    /// Releases come first (in this state's press order), then presses (in
    /// `next`'s press order). Typed characters ride on the press events in
    /// order; any left over become character-only events.
    pub fn difference(&self, next: &KeyboardState) -> Vec<KeyboardEvent> {
        let (released, pressed) = self.keys.difference(&next.keys);
        let mut events = Vec::with_capacity(released.len() + pressed.len() + next.chars.len());

        events.extend(
            released
                .into_iter()
                .map(|code| KeyboardEvent::new(code, false, None)),
        );

        let mut chars = next.chars.iter().copied();
        for code in pressed {
            events.push(KeyboardEvent::new(code, true, chars.next()));
        }
        events.extend(chars.map(|c| KeyboardEvent::new(KEY_NONE, true, Some(c))));

        events
    }
}

impl Subticked<KeyboardState> {
    /// Record one key change from the host. Characters are per update, so the
    /// previous ones are dropped.
    pub fn key_event(&mut self, code: i32, pressed: bool, character: Option<char>) {
        self.update_from_event(|state| {
            state.chars.clear();
            state.apply(&KeyboardEvent::new(code, pressed, character));
        });
    }
}
