//! Sub-tick aware values
//!
//! A [`Subticked`] value is the "parent" of a peripheral: it holds the current
//! state plus every intermediate state observed since the last tick boundary.
//! The individual states (`T`) are the "children" and never own a list of
//! their own.

use std::fmt;

/// A peripheral state that can be tracked per subtick
pub trait SubtickValue: Clone + PartialEq + Default + fmt::Debug {
    /// Reset fields that only describe a single update (typed characters,
    /// scroll amount). Called when a new tick begins.
    fn begin_tick(&mut self) {}
}

/// Current state plus the ordered list of states it passed through this tick
#[derive(Debug, Clone)]
pub struct Subticked<T> {
    /// Older states, oldest first
    subticks: Vec<T>,
    current: T,
    /// Set after construction and at each tick boundary so the boundary state
    /// is not stored as a spurious subtick
    ignore_first_update: bool,
}

impl<T: SubtickValue> Default for Subticked<T> {
    fn default() -> Self {
        Self::with_state(T::default())
    }
}

impl<T: SubtickValue> Subticked<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parent whose current state is `state`
    pub fn with_state(state: T) -> Self {
        Self {
            subticks: Vec::new(),
            current: state,
            ignore_first_update: true,
        }
    }

    /// Rebuild a parent from the list returned by [`Subticked::all`].
    ///
    /// Returns `None` for an empty list.
    pub fn from_states(states: impl IntoIterator<Item = T>) -> Option<Self> {
        let mut iter = states.into_iter();
        let first = iter.next()?;
        let mut value = Self::with_state(T::default());
        value.update_from_state(first);
        for state in iter {
            value.update_from_state(state);
        }
        Some(value)
    }

    fn snapshot(&mut self) {
        if self.ignore_first_update {
            self.ignore_first_update = false;
        } else {
            self.subticks.push(self.current.clone());
        }
    }

    /// Apply one discrete change. The pre-change state becomes a subtick
    /// unless this is the first update since construction.
    pub fn update_from_event<R>(&mut self, change: impl FnOnce(&mut T) -> R) -> R {
        self.snapshot();
        change(&mut self.current)
    }

    /// Replace the whole state in one call, with the same snapshot rule
    pub fn update_from_state(&mut self, state: T) {
        self.snapshot();
        self.current = state;
    }

    /// Mutate the current state without creating a subtick
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn subticks(&self) -> &[T] {
        &self.subticks
    }

    /// All states, oldest to newest (subticks then current)
    pub fn all(&self) -> impl Iterator<Item = &T> + '_ {
        self.subticks.iter().chain(std::iter::once(&self.current))
    }

    /// Number of states returned by [`Subticked::all`] (always at least 1)
    pub fn len(&self) -> usize {
        self.subticks.len() + 1
    }

    /// Never true: a parent always has a current state
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        match index.cmp(&self.subticks.len()) {
            std::cmp::Ordering::Less => self.subticks.get(index),
            std::cmp::Ordering::Equal => Some(&self.current),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Start a new tick: drop the subticks, keep the current state and re-arm
    /// first-update suppression
    pub fn begin_tick(&mut self) {
        self.subticks.clear();
        self.current.begin_tick();
        self.ignore_first_update = true;
    }

    /// Replace everything with `state` as the new tick-boundary state
    pub fn reset_to(&mut self, state: T) {
        self.subticks.clear();
        self.current = state;
        self.begin_tick();
    }

    /// Reset to the default state with no subticks
    pub fn clear(&mut self) {
        self.reset_to(T::default());
    }

    /// Deep copy `other` into `self`
    pub fn copy_from(&mut self, other: &Self) {
        self.subticks.clone_from(&other.subticks);
        self.current.clone_from(&other.current);
        self.ignore_first_update = other.ignore_first_update;
    }

    /// Move `other` into `self`, leaving `other` cleared
    pub fn move_from(&mut self, other: &mut Self) {
        *self = std::mem::take(other);
    }
}

/// Equality compares the observed states only, not the suppression flag
impl<T: PartialEq> PartialEq for Subticked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.subticks == other.subticks && self.current == other.current
    }
}
