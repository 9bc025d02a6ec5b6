//! Mouse snapshots

use super::pressed::PressedCodes;
use super::subtick::{SubtickValue, Subticked};
use crate::keys::KEY_NONE;

/// Mouse with subtick history
pub type Mouse = Subticked<MouseState>;

/// One replayable mouse change. Every event carries the full pointer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Button code, or [`KEY_NONE`] for a move/scroll-only event
    pub code: i32,
    pub pressed: bool,
    pub scroll: i32,
    pub cursor_x: i32,
    pub cursor_y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MouseState {
    buttons: PressedCodes,
    /// Scroll delta of the update that produced this state
    scroll: i32,
    cursor_x: i32,
    cursor_y: i32,
}

impl SubtickValue for MouseState {
    fn begin_tick(&mut self) {
        self.scroll = 0;
    }
}

impl MouseState {
    pub fn new(
        buttons: impl IntoIterator<Item = i32>,
        scroll: i32,
        cursor_x: i32,
        cursor_y: i32,
    ) -> Self {
        Self {
            buttons: PressedCodes::from_codes(buttons),
            scroll,
            cursor_x,
            cursor_y,
        }
    }

    pub fn buttons(&self) -> &PressedCodes {
        &self.buttons
    }

    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn is_pressed(&self, code: i32) -> bool {
        self.buttons.contains(code)
    }

    pub fn apply(&mut self, event: &MouseEvent) {
        if event.code != KEY_NONE {
            self.buttons.set(event.code, event.pressed);
        }
        self.scroll = event.scroll;
        self.cursor_x = event.cursor_x;
        self.cursor_y = event.cursor_y;
    }

    /// Apply a batch of events from one [`MouseState::difference`] call.
    /// Scroll describes a single update, so it starts at zero.
    pub fn apply_events<'a>(&mut self, events: impl IntoIterator<Item = &'a MouseEvent>) {
        self.scroll = 0;
        for event in events {
            self.apply(event);
        }
    }

    /// Minimal events that turn `self` into `next`.
    ///
    /// Button releases first, then presses. When no button changed but the
    /// pointer moved or scrolled, a single move event is emitted instead.
    pub fn difference(&self, next: &MouseState) -> Vec<MouseEvent> {
        let (released, pressed) = self.buttons.difference(&next.buttons);
        let event = |code: i32, pressed: bool| MouseEvent {
            code,
            pressed,
            scroll: next.scroll,
            cursor_x: next.cursor_x,
            cursor_y: next.cursor_y,
        };

        let mut events: Vec<MouseEvent> = released
            .into_iter()
            .map(|code| event(code, false))
            .chain(pressed.into_iter().map(|code| event(code, true)))
            .collect();

        if events.is_empty() && (next.scroll != 0 || self.cursor() != next.cursor()) {
            events.push(event(KEY_NONE, false));
        }
        events
    }
}

impl Subticked<MouseState> {
    /// Record one button/scroll/move change from the host
    pub fn mouse_event(&mut self, code: i32, pressed: bool, scroll: i32, cursor_x: i32, cursor_y: i32) {
        self.update_from_event(|state| {
            state.apply(&MouseEvent {
                code,
                pressed,
                scroll,
                cursor_x,
                cursor_y,
            })
        });
    }
}
