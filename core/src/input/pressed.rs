//! Ordered set of pressed key or button codes, shared by keyboard and mouse

use smallvec::SmallVec;

use crate::keys::KEY_NONE;

/// Codes currently held down, in the order they were pressed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedCodes {
    codes: SmallVec<[i32; 8]>,
}

impl PressedCodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, dropping duplicates and [`KEY_NONE`] but keeping order
    pub fn from_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        let mut set = Self::new();
        for code in codes {
            set.press(code);
        }
        set
    }

    /// Mark a code as held. Returns false if it already was.
    pub fn press(&mut self, code: i32) -> bool {
        if code == KEY_NONE || self.contains(code) {
            return false;
        }
        self.codes.push(code);
        true
    }

    /// Mark a code as released. Returns false if it was not held.
    pub fn release(&mut self, code: i32) -> bool {
        match self.codes.iter().position(|&c| c == code) {
            Some(pos) => {
                self.codes.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn set(&mut self, code: i32, pressed: bool) -> bool {
        if pressed {
            self.press(code)
        } else {
            self.release(code)
        }
    }

    pub fn contains(&self, code: i32) -> bool {
        self.codes.contains(&code)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.codes
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.codes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    /// Symmetric difference towards `next`: codes to release (in this set's
    /// order) and codes to press (in `next`'s order)
    pub fn difference(&self, next: &PressedCodes) -> (Vec<i32>, Vec<i32>) {
        let released = self.iter().filter(|&c| !next.contains(c)).collect();
        let pressed = next.iter().filter(|&c| !self.contains(c)).collect();
        (released, pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_keep_order() {
        let mut set = PressedCodes::new();
        assert!(set.press(17));
        assert!(set.press(29));
        assert!(!set.press(17));
        assert_eq!(set.as_slice(), &[17, 29]);
        assert!(set.release(17));
        assert!(!set.release(17));
        assert_eq!(set.as_slice(), &[29]);
    }

    #[test]
    fn test_none_is_never_held() {
        let set = PressedCodes::from_codes([KEY_NONE, 30, 30]);
        assert_eq!(set.as_slice(), &[30]);
    }

    #[test]
    fn test_difference() {
        let a = PressedCodes::from_codes([17, 29, 30]);
        let b = PressedCodes::from_codes([30, 42, 17, 31]);
        let (released, pressed) = a.difference(&b);
        assert_eq!(released, vec![29]);
        assert_eq!(pressed, vec![42, 31]);
    }
}
