//! Per-tick input container
//!
//! A [`TickContainer`] holds everything recorded during one tick. It has no
//! index of its own: its identity is its position in the owning sequence.

use crate::input::{Camera, Keyboard, Mouse};

/// Inputs and comments for exactly one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickContainer {
    pub keyboard: Keyboard,
    pub mouse: Mouse,
    pub camera: Camera,
    pub comments: CommentContainer,
}

impl TickContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(keyboard: Keyboard, mouse: Mouse, camera: Camera) -> Self {
        Self {
            keyboard,
            mouse,
            camera,
            comments: CommentContainer::default(),
        }
    }

    /// Number of data lines this tick needs: the longest subtick list
    pub fn subtick_count(&self) -> usize {
        self.keyboard
            .len()
            .max(self.mouse.len())
            .max(self.camera.len())
    }
}

/// Free-text comments of one tick.
///
/// `inline` holds whole-tick comment lines written before the tick line.
/// `endline` has one slot per data line (tick line first, then subticks).
/// A `None` slot has no text; trailing `None`s are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentContainer {
    inline: Vec<Option<String>>,
    endline: Vec<Option<String>>,
}

impl CommentContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inline(&mut self, text: impl Into<String>) {
        self.inline.push(Some(text.into()));
    }

    /// Set the inline text of line `index`, padding with empty slots
    pub fn set_inline(&mut self, index: usize, text: Option<String>) {
        set_slot(&mut self.inline, index, text);
    }

    /// Set the endline text of data line `index` (0 = tick line)
    pub fn set_endline(&mut self, index: usize, text: Option<String>) {
        set_slot(&mut self.endline, index, text);
    }

    pub fn inline(&self) -> &[Option<String>] {
        &self.inline
    }

    pub fn endline(&self) -> &[Option<String>] {
        &self.endline
    }

    pub fn inline_at(&self, index: usize) -> Option<&str> {
        self.inline.get(index).and_then(|s| s.as_deref())
    }

    pub fn endline_at(&self, index: usize) -> Option<&str> {
        self.endline.get(index).and_then(|s| s.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.endline.is_empty()
    }

    pub fn clear(&mut self) {
        self.inline.clear();
        self.endline.clear();
    }
}

fn set_slot(slots: &mut Vec<Option<String>>, index: usize, text: Option<String>) {
    if index >= slots.len() {
        if text.is_none() {
            return;
        }
        slots.resize(index + 1, None);
    }
    slots[index] = text;
    while matches!(slots.last(), Some(None)) {
        slots.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtick_count_is_longest_list() {
        let mut tick = TickContainer::new();
        assert_eq!(tick.subtick_count(), 1);
        tick.keyboard.key_event(17, true, None);
        tick.keyboard.key_event(29, true, None);
        tick.keyboard.key_event(17, false, None);
        assert_eq!(tick.subtick_count(), 3);
    }

    #[test]
    fn test_slots_are_padded_and_trimmed() {
        let mut comments = CommentContainer::new();
        comments.set_endline(2, Some("third".into()));
        assert_eq!(comments.endline(), &[None, None, Some("third".to_string())]);

        comments.set_endline(2, None);
        assert!(comments.endline().is_empty());

        comments.set_endline(5, None);
        assert!(comments.is_empty());
    }

    #[test]
    fn test_inline_lookup() {
        let mut comments = CommentContainer::new();
        comments.add_inline("hello");
        comments.set_inline(2, Some("later".into()));
        assert_eq!(comments.inline_at(0), Some("hello"));
        assert_eq!(comments.inline_at(1), None);
        assert_eq!(comments.inline_at(2), Some("later"));
    }
}
