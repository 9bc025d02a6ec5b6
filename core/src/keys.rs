//! Key catalogue
//!
//! Static bidirectional mapping between canonical key names and numeric codes.
//! Keyboard codes follow the LWJGL2 numbering, mouse buttons use negative codes.
//! Codes without an entry are still valid: they are written as their decimal
//! number and read back verbatim.

use std::borrow::Cow;
use std::sync::LazyLock;

use hashbrown::HashMap;

/// A catalogue entry: immutable (code, canonical name) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualKey {
    pub code: i32,
    pub name: &'static str,
}

/// "No key" marker, used by events that only carry characters or movement
pub const KEY_NONE: i32 = 0;

/// Left mouse button
pub const MOUSE_LEFT: i32 = -100;
/// Right mouse button
pub const MOUSE_RIGHT: i32 = -99;
/// Middle mouse button
pub const MOUSE_MIDDLE: i32 = -98;

const fn key(code: i32, name: &'static str) -> VirtualKey {
    VirtualKey { code, name }
}

/// Every named key and mouse button
pub static CATALOGUE: &[VirtualKey] = &[
    key(KEY_NONE, "NONE"),
    key(1, "ESC"),
    key(2, "KEY_1"),
    key(3, "KEY_2"),
    key(4, "KEY_3"),
    key(5, "KEY_4"),
    key(6, "KEY_5"),
    key(7, "KEY_6"),
    key(8, "KEY_7"),
    key(9, "KEY_8"),
    key(10, "KEY_9"),
    key(11, "KEY_0"),
    key(12, "MINUS"),
    key(13, "EQUALS"),
    key(14, "BACK"),
    key(15, "TAB"),
    key(16, "Q"),
    key(17, "W"),
    key(18, "E"),
    key(19, "R"),
    key(20, "T"),
    key(21, "Y"),
    key(22, "U"),
    key(23, "I"),
    key(24, "O"),
    key(25, "P"),
    key(26, "LBRACKET"),
    key(27, "RBRACKET"),
    key(28, "RETURN"),
    key(29, "LCONTROL"),
    key(30, "A"),
    key(31, "S"),
    key(32, "D"),
    key(33, "F"),
    key(34, "G"),
    key(35, "H"),
    key(36, "J"),
    key(37, "K"),
    key(38, "L"),
    key(39, "SEMICOLON"),
    key(40, "APOSTROPHE"),
    key(41, "GRAVE"),
    key(42, "LSHIFT"),
    key(43, "BACKSLASH"),
    key(44, "Z"),
    key(45, "X"),
    key(46, "C"),
    key(47, "V"),
    key(48, "B"),
    key(49, "N"),
    key(50, "M"),
    key(51, "COMMA"),
    key(52, "PERIOD"),
    key(53, "SLASH"),
    key(54, "RSHIFT"),
    key(55, "MULTIPLY"),
    key(56, "LMENU"),
    key(57, "SPACE"),
    key(58, "CAPITAL"),
    key(59, "F1"),
    key(60, "F2"),
    key(61, "F3"),
    key(62, "F4"),
    key(63, "F5"),
    key(64, "F6"),
    key(65, "F7"),
    key(66, "F8"),
    key(67, "F9"),
    key(68, "F10"),
    key(69, "NUMLOCK"),
    key(70, "SCROLL"),
    key(71, "NUMPAD7"),
    key(72, "NUMPAD8"),
    key(73, "NUMPAD9"),
    key(74, "SUBTRACT"),
    key(75, "NUMPAD4"),
    key(76, "NUMPAD5"),
    key(77, "NUMPAD6"),
    key(78, "ADD"),
    key(79, "NUMPAD1"),
    key(80, "NUMPAD2"),
    key(81, "NUMPAD3"),
    key(82, "NUMPAD0"),
    key(83, "DECIMAL"),
    key(87, "F11"),
    key(88, "F12"),
    key(156, "NUMPADENTER"),
    key(157, "RCONTROL"),
    key(181, "DIVIDE"),
    key(184, "RMENU"),
    key(197, "PAUSE"),
    key(199, "HOME"),
    key(200, "UP"),
    key(201, "PRIOR"),
    key(203, "LEFT"),
    key(205, "RIGHT"),
    key(207, "END"),
    key(208, "DOWN"),
    key(209, "NEXT"),
    key(210, "INSERT"),
    key(211, "DELETE"),
    key(219, "LMETA"),
    key(220, "RMETA"),
    key(221, "APPS"),
    // Mouse buttons
    key(MOUSE_LEFT, "LC"),
    key(MOUSE_RIGHT, "RC"),
    key(MOUSE_MIDDLE, "MC"),
    key(-97, "MBUTTON4"),
    key(-96, "MBUTTON5"),
    key(-95, "MBUTTON6"),
    key(-94, "MBUTTON7"),
    key(-93, "MBUTTON8"),
    key(-92, "MBUTTON9"),
    key(-91, "MBUTTON10"),
    key(-90, "MBUTTON11"),
    key(-89, "MBUTTON12"),
    key(-88, "MBUTTON13"),
    key(-87, "MBUTTON14"),
    key(-86, "MBUTTON15"),
    key(-85, "MBUTTON16"),
];

static BY_CODE: LazyLock<HashMap<i32, &'static VirtualKey>> =
    LazyLock::new(|| CATALOGUE.iter().map(|k| (k.code, k)).collect());

/// Keyed by upper-case name
static BY_NAME: LazyLock<HashMap<String, &'static VirtualKey>> =
    LazyLock::new(|| CATALOGUE.iter().map(|k| (k.name.to_ascii_uppercase(), k)).collect());

/// Look up the catalogue entry for a code
pub fn lookup_code(code: i32) -> Option<&'static VirtualKey> {
    BY_CODE.get(&code).copied()
}

/// Look up the catalogue entry for a canonical name (case-insensitive)
pub fn lookup_name(name: &str) -> Option<&'static VirtualKey> {
    BY_NAME.get(name.to_ascii_uppercase().as_str()).copied()
}

/// Canonical name of a code, or its decimal form if the code is unknown
pub fn key_name(code: i32) -> Cow<'static, str> {
    match lookup_code(code) {
        Some(k) => Cow::Borrowed(k.name),
        None => Cow::Owned(code.to_string()),
    }
}

/// Parse a key token: a catalogue name or a raw signed integer code
pub fn parse_key(token: &str) -> Option<i32> {
    let token = token.trim();
    if let Some(k) = lookup_name(token) {
        return Some(k.code);
    }
    token.parse::<i32>().ok()
}

/// Whether a code belongs to the mouse range
pub fn is_mouse_button(code: i32) -> bool {
    (-100..=-85).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_codes_are_unique() {
        for (i, a) in CATALOGUE.iter().enumerate() {
            for b in &CATALOGUE[i + 1..] {
                assert_ne!(a.code, b.code, "duplicate code {}", a.code);
                assert_ne!(a.name, b.name, "duplicate name {}", a.name);
            }
        }
    }

    #[test]
    fn test_bidirectional_lookup() {
        assert_eq!(lookup_name("W").map(|k| k.code), Some(17));
        assert_eq!(lookup_name("lcontrol").map(|k| k.code), Some(29));
        assert_eq!(key_name(17), "W");
        assert_eq!(key_name(MOUSE_LEFT), "LC");
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        assert_eq!(key_name(1234), "1234");
        assert_eq!(parse_key("1234"), Some(1234));
        assert_eq!(parse_key("-7"), Some(-7));
        assert_eq!(parse_key("NOT_A_KEY"), None);
    }

    #[test]
    fn test_mouse_range() {
        assert!(is_mouse_button(MOUSE_RIGHT));
        assert!(is_mouse_button(-85));
        assert!(!is_mouse_button(17));
    }
}
