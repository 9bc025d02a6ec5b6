//! Field codecs for the three `|`-separated columns of a data line
//!
//! ```text
//! keyboard   W,LCONTROL;wa
//! mouse      LC;0,420,300
//! camera     12.5;~-3
//! ```
//!
//! An empty state keeps its separators (`;`, `;0,0,0`, `;`). A completely
//! empty field means the component has no entry on that line.

use crate::error::LoadErrorKind;
use crate::input::{CameraState, KeyboardState, MouseState};
use crate::keys::{key_name, parse_key};

/// Prefix marking a camera value relative to the previous one
pub const RELATIVE_PREFIX: char = '~';

fn render_codes(codes: impl Iterator<Item = i32>) -> String {
    codes
        .map(key_name)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_codes(field: &str) -> Result<Vec<i32>, LoadErrorKind> {
    if field.trim().is_empty() {
        return Ok(Vec::new());
    }
    field
        .split(',')
        .map(|token| parse_key(token).ok_or_else(|| LoadErrorKind::UnknownKey(token.trim().to_string())))
        .collect()
}

/// Escape `\`, `|`, tab and newline in typed characters
pub fn escape_chars(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    for &c in chars {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\p"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_chars`]. Unknown escapes are kept literally.
pub fn unescape_chars(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    let mut iter = text.chars();
    while let Some(c) = iter.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match iter.next() {
            Some('\\') => out.push('\\'),
            Some('p') => out.push('|'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn split_pair<'a>(field: &'a str, name: &'static str) -> Result<(&'a str, &'a str), LoadErrorKind> {
    field.split_once(';').ok_or(LoadErrorKind::FieldCount {
        field: name,
        expected: 2,
        found: 1,
    })
}

pub fn render_keyboard(state: &KeyboardState) -> String {
    format!(
        "{};{}",
        render_codes(state.keys().iter()),
        escape_chars(state.chars())
    )
}

pub fn parse_keyboard(field: &str) -> Result<KeyboardState, LoadErrorKind> {
    let (keys, chars) = split_pair(field, "keyboard")?;
    Ok(KeyboardState::new(parse_codes(keys)?, unescape_chars(chars)))
}

pub fn render_mouse(state: &MouseState) -> String {
    let (x, y) = state.cursor();
    format!(
        "{};{},{},{}",
        render_codes(state.buttons().iter()),
        state.scroll(),
        x,
        y
    )
}

fn parse_int(token: &str) -> Result<i32, LoadErrorKind> {
    let token = token.trim();
    token
        .parse()
        .map_err(|_| LoadErrorKind::InvalidNumber(token.to_string()))
}

pub fn parse_mouse(field: &str) -> Result<MouseState, LoadErrorKind> {
    let (buttons, pointer) = split_pair(field, "mouse")?;
    let values: Vec<&str> = pointer.split(',').collect();
    let [scroll, x, y] = values.as_slice() else {
        return Err(LoadErrorKind::FieldCount {
            field: "mouse",
            expected: 3,
            found: values.len(),
        });
    };
    Ok(MouseState::new(
        parse_codes(buttons)?,
        parse_int(scroll)?,
        parse_int(x)?,
        parse_int(y)?,
    ))
}

/// Render one camera angle. `~delta` is used only when asked for, when a
/// previous value exists and when adding the delta gives the value back
/// exactly.
fn render_angle(value: Option<f32>, previous: Option<f32>, relative: bool) -> String {
    let Some(value) = value else {
        return String::new();
    };
    match previous {
        Some(previous) if relative => {
            let delta = value - previous;
            if delta.is_finite() && previous + delta == value {
                format!("{}{}", RELATIVE_PREFIX, delta)
            } else {
                value.to_string()
            }
        }
        _ => value.to_string(),
    }
}

pub fn render_camera(state: &CameraState, previous: Option<&CameraState>, relative: bool) -> String {
    format!(
        "{};{}",
        render_angle(state.pitch(), previous.and_then(|p| p.pitch()), relative),
        render_angle(state.yaw(), previous.and_then(|p| p.yaw()), relative)
    )
}

fn parse_float(token: &str) -> Result<f32, LoadErrorKind> {
    let value: f32 = token
        .parse()
        .map_err(|_| LoadErrorKind::InvalidNumber(token.to_string()))?;
    if !value.is_finite() {
        return Err(LoadErrorKind::InvalidNumber(token.to_string()));
    }
    Ok(value)
}

fn parse_angle(
    token: &str,
    previous: Option<f32>,
    name: &'static str,
) -> Result<Option<f32>, LoadErrorKind> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    match token.strip_prefix(RELATIVE_PREFIX) {
        Some(delta) => {
            let previous = previous.ok_or(LoadErrorKind::UnresolvableRelative(name))?;
            let value = previous + parse_float(delta.trim())?;
            if !value.is_finite() {
                return Err(LoadErrorKind::InvalidNumber(token.to_string()));
            }
            Ok(Some(value))
        }
        None => parse_float(token).map(Some),
    }
}

/// Parse a camera field; relative values resolve against `previous`
pub fn parse_camera(field: &str, previous: &CameraState) -> Result<CameraState, LoadErrorKind> {
    let parts: Vec<&str> = field.split(';').collect();
    let [pitch, yaw] = parts.as_slice() else {
        return Err(LoadErrorKind::FieldCount {
            field: "camera",
            expected: 2,
            found: parts.len(),
        });
    };
    Ok(CameraState::new(
        parse_angle(pitch, previous.pitch(), "pitch")?,
        parse_angle(yaw, previous.yaw(), "yaw")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{MOUSE_LEFT, MOUSE_RIGHT};

    #[test]
    fn test_keyboard() {
        let state = KeyboardState::new([17, 29], ['w', '|']);
        let text = render_keyboard(&state);
        assert_eq!(text, "W,LCONTROL;w\\p");
        assert_eq!(parse_keyboard(&text).unwrap(), state);

        assert_eq!(render_keyboard(&KeyboardState::default()), ";");
        assert_eq!(parse_keyboard(";").unwrap(), KeyboardState::default());
    }

    #[test]
    fn test_keyboard_unknown_code_is_numeric() {
        let state = KeyboardState::new([250], [] as [char; 0]);
        assert_eq!(render_keyboard(&state), "250;");
        assert_eq!(parse_keyboard("250;").unwrap(), state);
    }

    #[test]
    fn test_keyboard_errors() {
        assert!(matches!(
            parse_keyboard("W"),
            Err(LoadErrorKind::FieldCount { field: "keyboard", .. })
        ));
        assert!(matches!(
            parse_keyboard("W,FOO;"),
            Err(LoadErrorKind::UnknownKey(ref k)) if k == "FOO"
        ));
    }

    #[test]
    fn test_chars_escaping() {
        let chars = ['a', '\\', '\t', '\n', '|', ';'];
        let escaped = escape_chars(&chars);
        assert!(!escaped.contains('\t'));
        assert_eq!(unescape_chars(&escaped), chars);
        assert_eq!(unescape_chars("\\q"), ['\\', 'q']);
    }

    #[test]
    fn test_mouse() {
        let state = MouseState::new([MOUSE_LEFT, MOUSE_RIGHT], -1, 420, 300);
        let text = render_mouse(&state);
        assert_eq!(text, "LC,RC;-1,420,300");
        assert_eq!(parse_mouse(&text).unwrap(), state);
        assert_eq!(render_mouse(&MouseState::default()), ";0,0,0");
    }

    #[test]
    fn test_mouse_errors() {
        assert!(matches!(
            parse_mouse("LC;1,2"),
            Err(LoadErrorKind::FieldCount { field: "mouse", expected: 3, found: 2 })
        ));
        assert!(matches!(
            parse_mouse(";1,x,2"),
            Err(LoadErrorKind::InvalidNumber(ref n)) if n == "x"
        ));
    }

    #[test]
    fn test_camera_absolute() {
        let state = CameraState::at(12.5, -370.25);
        assert_eq!(render_camera(&state, None, false), "12.5;-370.25");
        assert_eq!(parse_camera("12.5;-370.25", &CameraState::default()).unwrap(), state);

        assert_eq!(render_camera(&CameraState::default(), None, true), ";");
        assert_eq!(
            parse_camera(";", &CameraState::default()).unwrap(),
            CameraState::default()
        );
    }

    #[test]
    fn test_camera_relative() {
        let previous = CameraState::at(20.0, 100.0);
        let state = parse_camera("~10;~-5", &previous).unwrap();
        assert_eq!(state, CameraState::at(30.0, 95.0));

        assert_eq!(render_camera(&state, Some(&previous), true), "~10;~-5");
        assert_eq!(render_camera(&state, Some(&previous), false), "30;95");
        assert_eq!(render_camera(&state, None, true), "30;95");
    }

    #[test]
    fn test_relative_only_when_exact() {
        let previous = CameraState::at(0.1, 1.0e8);
        let state = CameraState::at(0.3, 1.0e8 + 8.0);
        let text = render_camera(&state, Some(&previous), true);
        let decoded = parse_camera(&text, &previous).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_camera_errors() {
        assert!(matches!(
            parse_camera("~1;5", &CameraState::default()),
            Err(LoadErrorKind::UnresolvableRelative("pitch"))
        ));
        assert!(matches!(
            parse_camera("1;NaN", &CameraState::default()),
            Err(LoadErrorKind::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_camera("1;2;3", &CameraState::default()),
            Err(LoadErrorKind::FieldCount { field: "camera", found: 3, .. })
        ));
    }

    #[test]
    fn test_pitch_is_clamped_on_read() {
        let previous = CameraState::at(85.0, 0.0);
        let state = parse_camera("~10;0", &previous).unwrap();
        assert_eq!(state.pitch(), Some(90.0));
    }
}
