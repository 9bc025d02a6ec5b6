//! Serialise/deserialise round trips over recorded input

use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::format::{self, extract};
use crate::format::flavor::{HEADER_END, HEADER_START};
use crate::input::{CameraState, KeyboardState, MouseState, VirtualInput};
use crate::keys::MOUSE_LEFT;
use crate::sequence::{MemorySequence, TickSequence};
use crate::tick::TickContainer;

use super::test_utils::*;

const W: i32 = 17;
const LCONTROL: i32 = 29;

fn file(body: &[&str]) -> String {
    let mut lines = vec![HEADER_START, "Flavor: beta1", "FileCommand-Extensions: ", HEADER_END];
    lines.extend_from_slice(body);
    lines.join("\n")
}

// ============================================================================
// Fixed sessions
// ============================================================================

#[test]
fn test_held_keys_then_release_with_mouse_move() {
    let mut input = VirtualInput::new();
    let mut sequence = MemorySequence::new();
    sequence.push(input.snapshot());

    input.begin_tick();
    input.key_event(W, true, Some('w'));
    input.key_event(LCONTROL, true, None);
    sequence.push(input.snapshot());

    input.begin_tick();
    input.key_event(W, false, None);
    input.key_event(LCONTROL, false, None);
    input.mouse_event(0, false, 0, 420, 300);
    sequence.push(input.snapshot());

    let tick = sequence.get(1).unwrap();
    assert_eq!(
        tick.keyboard.all().cloned().collect::<Vec<_>>(),
        vec![
            KeyboardState::new([W], ['w']),
            KeyboardState::new([W, LCONTROL], []),
        ]
    );

    let mut ctx = context(false);
    let (lines, loaded) = round_trip(&mut ctx, &sequence);
    assert_eq!(
        lines[lines.len() - 5..],
        [
            "0|;|;0,0,0|;",
            "1|W;w|;0,0,0|;",
            "\t1|W,LCONTROL;||",
            "2|LCONTROL;|;0,420,300|;",
            "\t1|;||",
        ]
    );
    assert_same_ticks(&sequence, &loaded);

    for index in 0..sequence.len() {
        let (a, b) = (sequence.get(index).unwrap(), loaded.get(index).unwrap());
        for (i, (x, y)) in a.keyboard.all().zip(b.keyboard.all()).enumerate() {
            assert_eq!(x, y, "keyboard subtick {} of tick {}", i, index);
        }
        for (i, (x, y)) in a.mouse.all().zip(b.mouse.all()).enumerate() {
            assert_eq!(x, y, "mouse subtick {} of tick {}", i, index);
        }
    }
}

#[test]
fn test_empty_extension_line_disables_everything() {
    let mut ctx = context(false);
    assert_eq!(ctx.file_commands.enabled_names().len(), 3);

    let loaded = format::deserialise(&mut ctx, &file(&["0|;|;0,0,0|;"]), None).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(ctx.file_commands.enabled_names().is_empty());
}

#[test]
fn test_relative_camera_resolves_against_previous_tick() {
    let mut ctx = context(false);
    let text = file(&["0|;|;0,0,0|20;100", "1|;|;0,0,0|~10;~-5"]);
    let loaded = format::deserialise(&mut ctx, &text, None).unwrap();
    let camera = *loaded.get(1).unwrap().camera.current();
    assert_eq!(camera, CameraState::at(30.0, 95.0));
}

#[test]
fn test_comments_and_blank_lines_survive() {
    let mut ctx = context(false);
    let text = file(&[
        "// opening note",
        "0|;|;0,0,0|;\t\t// first tick",
        "",
        "1|W;|;0,0,0|;",
        "\t1|;||\t\t// let go",
        "// before two",
        "// second line",
        "2|;|;0,0,0|;",
    ]);
    let loaded = format::deserialise(&mut ctx, &text, None).unwrap();
    assert_eq!(loaded.len(), 3);

    let first = loaded.get(0).unwrap();
    assert_eq!(first.comments.inline_at(0), Some("opening note"));
    assert_eq!(first.comments.endline_at(0), Some("first tick"));
    assert_eq!(loaded.get(1).unwrap().comments.endline_at(1), Some("let go"));
    assert_eq!(loaded.get(2).unwrap().comments.inline().len(), 2);

    let (lines, again) = round_trip(&mut ctx, &loaded);
    assert!(lines.contains(&"// before two".to_string()));
    assert_same_ticks(&loaded, &again);
}

// ============================================================================
// Blank camera fields
// ============================================================================

/// A tick line with an empty camera column takes the final camera of the
/// tick before, not its first subtick
#[test]
fn test_blank_camera_takes_previous_final_value() {
    let mut ctx = context(false);
    let text = file(&[
        "0|;|;0,0,0|0;0",
        "\t1|;||5;10",
        "\t2|;||7;20",
        "1|;|;0,0,0|",
        "2|;|;0,0,0|~1;~1",
    ]);
    let loaded = format::deserialise(&mut ctx, &text, None).unwrap();
    assert_eq!(*loaded.get(1).unwrap().camera.current(), CameraState::at(7.0, 20.0));
    assert_eq!(loaded.get(1).unwrap().camera.len(), 1);
    assert_eq!(*loaded.get(2).unwrap().camera.current(), CameraState::at(8.0, 21.0));
}

#[test]
fn test_relative_without_prior_is_an_error() {
    let mut ctx = context(false);
    let text = file(&["0|;|;0,0,0|;", "1|;|;0,0,0|~1;~1"]);
    let err = format::deserialise(&mut ctx, &text, None).unwrap_err();
    assert_eq!(err.location.tick, Some(1));
    assert_eq!(err.location.line, Some(6));
}

// ============================================================================
// Randomised sessions
// ============================================================================

#[test]
fn test_random_sessions_round_trip() {
    for seed in 0..16 {
        let mut rng = Pcg64::seed_from_u64(seed);
        let sequence = random_session(&mut rng, 120);
        for relative in [false, true] {
            let mut ctx = context(relative);
            let (_, loaded) = round_trip(&mut ctx, &sequence);
            assert_same_ticks(&sequence, &loaded);
        }
    }
}

#[test]
fn test_relative_and_absolute_files_agree() {
    let mut rng = Pcg64::seed_from_u64(7);
    let sequence = random_session(&mut rng, 60);

    let absolute = format::serialise(&context(false), &sequence, None).unwrap();
    let relative = format::serialise(&context(true), &sequence, None).unwrap();
    assert!(relative.iter().any(|line| line.contains('~')));
    assert!(!absolute.iter().any(|line| line.contains('~')));

    let mut ctx = context(false);
    let from_absolute = format::deserialise(&mut ctx, &absolute.join("\n"), None).unwrap();
    let from_relative = format::deserialise(&mut ctx, &relative.join("\n"), None).unwrap();
    assert_same_ticks(&from_absolute, &from_relative);
}

/// Replaying every recorded tick through a fresh peripheral set reproduces
/// each subtick state from the queued events alone
#[test]
fn test_playback_events_rebuild_recorded_states() {
    let mut rng = Pcg64::seed_from_u64(42);
    let sequence = random_session(&mut rng, 200);

    let mut player = VirtualInput::new();
    let mut keyboard = KeyboardState::default();
    let mut mouse = MouseState::default();
    let mut camera = CameraState::default();

    for tick in sequence.iter() {
        for (expected, previous) in tick.keyboard.all().zip(
            std::iter::once(keyboard.clone()).chain(tick.keyboard.all().cloned()),
        ) {
            let events = previous.difference(expected);
            for event in &events {
                assert!(
                    event.character.is_some() || previous.is_pressed(event.code) != event.pressed,
                    "redundant event {:?}",
                    event
                );
            }
            let mut rebuilt = previous.clone();
            rebuilt.apply_events(&events);
            assert_eq!(&rebuilt, expected);
        }

        player.play_tick(tick);
        while let Some(event) = player.poll_keyboard_event() {
            keyboard.apply(&event);
        }
        while let Some(event) = player.poll_mouse_event() {
            mouse.apply(&event);
        }
        while let Some(event) = player.poll_camera_event() {
            camera.apply(&event);
        }

        assert_eq!(keyboard.keys(), tick.keyboard.current().keys());
        assert_eq!(mouse.buttons(), tick.mouse.current().buttons());
        assert_eq!(mouse.cursor(), tick.mouse.current().cursor());
        assert_eq!(camera, *tick.camera.current());
        keyboard = KeyboardState::new(keyboard.keys().iter(), []);
    }
}

#[test]
fn test_random_session_survives_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("random.mctas");

    let mut rng = Pcg64::seed_from_u64(0xC0FFEE);
    let sequence = random_session(&mut rng, 300);
    let mut ctx = context(true);
    format::save_file(&ctx, &sequence, &path, None).unwrap();
    let loaded = format::load_file(&mut ctx, &path, None).unwrap();
    assert_same_ticks(&sequence, &loaded);
}

#[test]
fn test_extraction_matches_serialised_ticks() {
    let mut rng = Pcg64::seed_from_u64(3);
    let sequence = random_session(&mut rng, 40);
    let ctx = context(false);
    let lines = format::serialise(&ctx, &sequence, None).unwrap();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let start = lines.iter().position(|l| *l == HEADER_END).unwrap() + 1;

    let blocks = extract::extract(&lines, start).unwrap();
    assert_eq!(blocks.len(), sequence.len());
    for (block, tick) in blocks.iter().zip(sequence.iter()) {
        assert_eq!(block.lines.len(), tick.subtick_count());
    }
}

#[test]
fn test_baseline_only_sequence() {
    let sequence = MemorySequence::from(vec![TickContainer::new()]);
    let mut ctx = context(false);
    let (lines, loaded) = round_trip(&mut ctx, &sequence);
    assert_eq!(lines.last().map(String::as_str), Some("0|;|;0,0,0|;"));
    assert_same_ticks(&sequence, &loaded);

    let mut pressed = TickContainer::new();
    pressed.mouse.mouse_event(MOUSE_LEFT, true, 0, 1, 2);
    let sequence = MemorySequence::from(vec![pressed]);
    let (lines, _) = round_trip(&mut ctx, &sequence);
    assert_eq!(lines.last().map(String::as_str), Some("0|;|LC;0,1,2|;"));
}
