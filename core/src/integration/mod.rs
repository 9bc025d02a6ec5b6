//! Integration tests for the tasrec core
//!
//! Recording sessions pushed through the text format and back, plus full
//! controller sessions saved to disk.

#[cfg(test)]
mod roundtrip_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use rand::Rng;
    use rand_pcg::Pcg64;

    use crate::config::TasConfig;
    use crate::context::TasContext;
    use crate::format;
    use crate::input::VirtualInput;
    use crate::keys::{MOUSE_LEFT, MOUSE_MIDDLE, MOUSE_RIGHT};
    use crate::sequence::{MemorySequence, TickSequence};

    /// W, A, S, D, LCONTROL, LSHIFT, SPACE
    pub const KEYS: [i32; 7] = [17, 30, 31, 32, 29, 42, 57];
    pub const BUTTONS: [i32; 3] = [MOUSE_LEFT, MOUSE_RIGHT, MOUSE_MIDDLE];

    pub fn context(relative_camera: bool) -> TasContext {
        TasContext::new(TasConfig {
            relative_camera,
            ..TasConfig::default()
        })
    }

    /// Record `ticks` ticks of random host input into a sequence whose tick 0
    /// is the empty baseline
    pub fn random_session(rng: &mut Pcg64, ticks: usize) -> MemorySequence {
        let mut input = VirtualInput::new();
        let mut sequence = MemorySequence::new();
        sequence.push(input.snapshot());

        let (mut x, mut y) = (0, 0);
        for _ in 0..ticks {
            input.begin_tick();
            for _ in 0..rng.random_range(0..5) {
                match rng.random_range(0..6) {
                    0 | 1 => {
                        let code = KEYS[rng.random_range(0..KEYS.len())];
                        let typed = rng
                            .random_bool(0.3)
                            .then(|| char::from(b'a' + rng.random_range(0..26u8)));
                        input.key_event(code, rng.random_bool(0.6), typed);
                    }
                    2 => {
                        let code = BUTTONS[rng.random_range(0..BUTTONS.len())];
                        input.mouse_event(code, rng.random_bool(0.5), 0, x, y);
                    }
                    3 => {
                        x += rng.random_range(-40..=40);
                        y += rng.random_range(-40..=40);
                        let scroll = rng.random_range(-2..=2);
                        input.mouse_event(0, false, scroll, x, y);
                    }
                    4 => {
                        let pitch = rng.random_range(-180..=180) as f32 * 0.5;
                        let yaw = rng.random_range(-720..=720) as f32 * 0.25;
                        input.look(pitch, yaw);
                    }
                    _ => {
                        let pitch = rng.random_range(-8..=8) as f32 * 0.5;
                        let yaw = rng.random_range(-8..=8) as f32 * 1.5;
                        input.rotate_camera(pitch, yaw);
                    }
                }
            }
            sequence.push(input.snapshot());
        }
        sequence
    }

    /// Serialise with `ctx`, then load the text back with the same context
    pub fn round_trip(ctx: &mut TasContext, sequence: &MemorySequence) -> (Vec<String>, MemorySequence) {
        let lines = format::serialise(ctx, sequence, None).unwrap();
        let loaded = format::deserialise(ctx, &lines.join("\n"), None).unwrap();
        (lines, loaded)
    }

    pub fn assert_same_ticks(expected: &MemorySequence, actual: &MemorySequence) {
        assert_eq!(expected.len(), actual.len());
        for (i, (a, b)) in expected.iter().zip(actual.iter()).enumerate() {
            assert_eq!(a.keyboard, b.keyboard, "keyboard of tick {}", i);
            assert_eq!(a.mouse, b.mouse, "mouse of tick {}", i);
            assert_eq!(a.camera, b.camera, "camera of tick {}", i);
            assert_eq!(a.comments, b.comments, "comments of tick {}", i);
        }
    }
}
