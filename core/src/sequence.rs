//! Tick sequence storage
//!
//! The controller only needs an indexable, appendable sequence. Short files
//! live in a [`MemorySequence`]; a paged or disk-backed store can be swapped in
//! by implementing [`TickSequence`]. Implementations must make a value written
//! by a caller visible to that caller's next read.

use crate::tick::TickContainer;

pub trait TickSequence: Send {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the tick at `index`
    fn get(&self, index: usize) -> Option<TickContainer>;

    fn push(&mut self, tick: TickContainer);

    /// Replace the tick at `index`. Returns false if `index` is out of range.
    fn set(&mut self, index: usize, tick: TickContainer) -> bool;

    /// Keep only the first `len` ticks
    fn truncate(&mut self, len: usize);

    fn clear(&mut self) {
        self.truncate(0);
    }
}

/// In-memory sequence backed by a `Vec`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySequence {
    ticks: Vec<TickContainer>,
}

impl MemorySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[TickContainer] {
        &self.ticks
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickContainer> {
        self.ticks.iter()
    }

    pub fn into_vec(self) -> Vec<TickContainer> {
        self.ticks
    }
}

impl From<Vec<TickContainer>> for MemorySequence {
    fn from(ticks: Vec<TickContainer>) -> Self {
        Self { ticks }
    }
}

impl TickSequence for MemorySequence {
    fn len(&self) -> usize {
        self.ticks.len()
    }

    fn get(&self, index: usize) -> Option<TickContainer> {
        self.ticks.get(index).cloned()
    }

    fn push(&mut self, tick: TickContainer) {
        self.ticks.push(tick);
    }

    fn set(&mut self, index: usize, tick: TickContainer) -> bool {
        match self.ticks.get_mut(index) {
            Some(slot) => {
                *slot = tick;
                true
            }
            None => false,
        }
    }

    fn truncate(&mut self, len: usize) {
        self.ticks.truncate(len);
    }
}

/// Collect any sequence into memory
pub fn to_vec(sequence: &dyn TickSequence) -> Vec<TickContainer> {
    (0..sequence.len())
        .filter_map(|i| sequence.get(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_after_write() {
        let mut seq = MemorySequence::new();
        assert!(seq.is_empty());

        let mut tick = TickContainer::new();
        tick.keyboard.key_event(17, true, None);
        seq.push(TickContainer::new());
        seq.push(tick.clone());
        assert_eq!(seq.get(1), Some(tick));

        let replacement = TickContainer::new();
        assert!(seq.set(1, replacement.clone()));
        assert_eq!(seq.get(1), Some(replacement));
        assert!(!seq.set(5, TickContainer::new()));
    }

    #[test]
    fn test_truncate_and_clear() {
        let mut seq = MemorySequence::from(vec![TickContainer::new(); 5]);
        seq.truncate(2);
        assert_eq!(seq.len(), 2);
        seq.clear();
        assert!(seq.is_empty());
    }
}
