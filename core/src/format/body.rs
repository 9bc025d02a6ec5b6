//! Tick blocks
//!
//! ```text
//! // $label(Start); inline comment
//! 5|W;w|;0,420,300|12.5;90		// $desyncMonitor(1, 2, 3, 0, 0, 0); endline
//! 	1|W,LCONTROL;|;0,420,300|;
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::comments;
use super::extract::TickBlock;
use super::flavor::Flavor;
use crate::error::{LoadError, LoadErrorKind};
use crate::extensions::{FileCommand, FileCommandRegistry, TickCommands};
use crate::input::{Camera, CameraState, Keyboard, KeyboardState, Mouse, MouseState};
use crate::tick::TickContainer;

/// Separator before an endline comment
pub const ENDLINE_SEPARATOR: &str = "\t\t";

static DATA_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\t)?(\d+)\|([^|]*)\|([^|]*)\|([^\t|]*)(?:\t\t//(.*))?$").expect("data line regex")
});

/// Render one tick. `previous_camera` is the final camera of the tick
/// before, used for relative encoding of the tick line.
pub fn render_tick(
    flavor: &dyn Flavor,
    file_commands: &FileCommandRegistry,
    index: usize,
    tick: &TickContainer,
    previous_camera: Option<&CameraState>,
    relative: bool,
) -> Vec<String> {
    let mut lines = Vec::new();

    let inline = file_commands.handle_on_serialise_inline(index, tick);
    let inline_count = inline
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(tick.comments.inline().len());
    for i in 0..inline_count {
        let commands = inline.iter().filter_map(|per_ext| per_ext.get(i));
        lines.push(comments::render_line(commands, tick.comments.inline_at(i)));
    }

    let endline = file_commands.handle_on_serialise_endline(index, tick);
    let data_count = tick.subtick_count();
    let dropped = endline.iter().any(|per_ext| per_ext.len() > data_count)
        || tick.comments.endline().len() > data_count;
    if dropped {
        tracing::warn!(tick = index, "endline data past the last subtick is not written");
    }

    for i in 0..data_count {
        let keyboard = tick
            .keyboard
            .get(i)
            .map(|s| flavor.serialise_keyboard(s))
            .unwrap_or_default();
        let mouse = tick
            .mouse
            .get(i)
            .map(|s| flavor.serialise_mouse(s))
            .unwrap_or_default();
        let camera = tick
            .camera
            .get(i)
            .map(|s| {
                let previous = match i {
                    0 => previous_camera,
                    _ => tick.camera.get(i - 1),
                };
                flavor.serialise_camera(s, previous, relative)
            })
            .unwrap_or_default();

        let mut line = match i {
            0 => format!("{}|{}|{}|{}", index, keyboard, mouse, camera),
            _ => format!("\t{}|{}|{}|{}", i, keyboard, mouse, camera),
        };

        let commands: Vec<&FileCommand> = endline
            .iter()
            .filter_map(|per_ext| per_ext.get(i).and_then(Option::as_ref))
            .collect();
        let text = tick.comments.endline_at(i);
        if !commands.is_empty() || text.is_some() {
            line.push_str(ENDLINE_SEPARATOR);
            line.push_str(&comments::render_line(commands, text));
        }
        lines.push(line);
    }
    lines
}

/// Parse one extracted block into the tick at `position`, together with the
/// file commands found in its comments.
pub fn parse_tick(
    flavor: &dyn Flavor,
    block: &TickBlock<'_>,
    position: usize,
    previous_camera: &CameraState,
) -> Result<(TickContainer, TickCommands), LoadError> {
    let mut tick = TickContainer::new();
    let mut commands = TickCommands::default();

    let mut keyboards: Vec<KeyboardState> = Vec::new();
    let mut mice: Vec<MouseState> = Vec::new();
    let mut cameras: Vec<CameraState> = Vec::new();

    let mut data_index = 0;
    for &(number, line) in &block.lines {
        if let Some((found, text)) = comments::parse_line(line) {
            tick.comments.set_inline(commands.inline.len(), text);
            commands.inline.push((number, found));
            continue;
        }

        let at = |kind: LoadErrorKind| {
            LoadError::new(kind)
                .at_line(number)
                .at_tick(position)
                .at_subtick(data_index)
        };
        let caps = DATA_LINE
            .captures(line)
            .ok_or_else(|| at(LoadErrorKind::UnrecognisedLine(line.to_string())))?;

        let is_subtick = caps.get(1).is_some();
        if is_subtick != (data_index > 0) {
            let kind = match is_subtick {
                true => LoadErrorKind::SubtickBeforeTick,
                false => LoadErrorKind::UnrecognisedLine(line.to_string()),
            };
            return Err(at(kind));
        }
        let expected = if is_subtick { data_index } else { position };
        if caps[2].parse::<usize>().ok() != Some(expected) {
            tracing::warn!(
                line = number,
                found = &caps[2],
                expected,
                "index in file does not match position, using position"
            );
        }

        let keyboard_field = &caps[3];
        if !keyboard_field.is_empty() {
            keyboards.push(flavor.deserialise_keyboard(keyboard_field).map_err(at)?);
        } else if data_index == 0 {
            keyboards.push(KeyboardState::default());
        }

        let mouse_field = &caps[4];
        if !mouse_field.is_empty() {
            mice.push(flavor.deserialise_mouse(mouse_field).map_err(at)?);
        } else if data_index == 0 {
            mice.push(MouseState::default());
        }

        let camera_field = &caps[5];
        let prior = cameras.last().unwrap_or(previous_camera);
        if !camera_field.is_empty() {
            let camera = flavor.deserialise_camera(camera_field, prior).map_err(at)?;
            cameras.push(camera);
        } else if data_index == 0 {
            cameras.push(*previous_camera);
        }

        let (found, text) = caps
            .get(6)
            .map(|m| comments::parse_body(m.as_str()))
            .unwrap_or_default();
        tick.comments.set_endline(data_index, text);
        commands.endline.push((number, found));

        data_index += 1;
    }

    if data_index == 0 {
        return Err(LoadError::new(LoadErrorKind::SubtickBeforeTick).at_tick(position));
    }

    tick.keyboard = Keyboard::from_states(keyboards).unwrap_or_default();
    tick.mouse = Mouse::from_states(mice).unwrap_or_default();
    tick.camera = Camera::from_states(cameras).unwrap_or_default();
    Ok((tick, commands))
}
