//! Recording and playback controller
//!
//! Four states: [`TasState::None`], [`TasState::Recording`],
//! [`TasState::Playback`] and [`TasState::Paused`]. The host calls
//! [`PlaybackController::on_tick`] exactly once per simulation step.
//!
//! Tick 0 of a sequence is the baseline: recording writes from index 1 on
//! and playback loads from index 1 on.

use std::fmt;
use std::path::Path;

use crate::context::TasContext;
use crate::error::{LoadError, SaveError};
use crate::extensions::Credits;
use crate::format;
use crate::input::{CameraEvent, KeyboardEvent, MouseEvent, VirtualInput};
use crate::sequence::{MemorySequence, TickSequence};
use crate::tick::TickContainer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TasState {
    #[default]
    None,
    Recording,
    Playback,
    Paused,
}

impl fmt::Display for TasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TasState::None => "stopped",
            TasState::Recording => "recording",
            TasState::Playback => "playing back",
            TasState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// A state change the controller refused, with a message for the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRefused {
    #[error("already {0}")]
    AlreadyInState(TasState),

    #[error("can't start playback while recording, stop the recording first")]
    RecordingToPlayback,

    #[error("can't start recording while playing back, stop the playback first")]
    PlaybackToRecording,

    #[error("nothing to pause")]
    NothingToPause,

    #[error("paused while {paused_from}, can't resume {requested}")]
    ResumeMismatch {
        paused_from: TasState,
        requested: TasState,
    },

    #[error("not paused")]
    NotPaused,

    #[error("can't clear inputs while {0}")]
    ClearWhileActive(TasState),
}

pub struct PlaybackController {
    ctx: TasContext,
    state: TasState,
    /// State to return to when unpausing
    state_after_pause: Option<TasState>,
    index: usize,
    inputs: Box<dyn TickSequence>,
    input: VirtualInput,
    play_until: Option<usize>,
}

impl PlaybackController {
    pub fn new(ctx: TasContext) -> Self {
        Self::with_sequence(ctx, Box::new(MemorySequence::new()))
    }

    /// Controller over a caller-supplied sequence store
    pub fn with_sequence(ctx: TasContext, inputs: Box<dyn TickSequence>) -> Self {
        Self {
            ctx,
            state: TasState::None,
            state_after_pause: None,
            index: 0,
            inputs,
            input: VirtualInput::new(),
            play_until: None,
        }
    }

    pub fn state(&self) -> TasState {
        self.state
    }

    pub fn state_after_pause(&self) -> Option<TasState> {
        self.state_after_pause
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of ticks in the sequence
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn is_recording(&self) -> bool {
        self.state == TasState::Recording
    }

    pub fn is_playing_back(&self) -> bool {
        self.state == TasState::Playback
    }

    pub fn ctx(&self) -> &TasContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut TasContext {
        &mut self.ctx
    }

    pub fn input(&self) -> &VirtualInput {
        &self.input
    }

    pub fn inputs(&self) -> &dyn TickSequence {
        self.inputs.as_ref()
    }

    pub fn tick(&self, index: usize) -> Option<TickContainer> {
        self.inputs.get(index)
    }

    /// Take the sequence out, leaving an empty one
    pub fn take_inputs(&mut self) -> Box<dyn TickSequence> {
        self.index = 0;
        self.play_until = None;
        std::mem::replace(&mut self.inputs, Box::new(MemorySequence::new()))
    }

    /// Swap in a sequence mid-run and continue from `index`. The tick at
    /// `index` becomes the live input state. Returns the previous sequence.
    pub fn splice(&mut self, inputs: Box<dyn TickSequence>, index: usize) -> Box<dyn TickSequence> {
        let previous = std::mem::replace(&mut self.inputs, inputs);
        self.index = index.min(self.inputs.len().saturating_sub(1));
        if let Some(tick) = self.inputs.get(self.index) {
            self.input.play_tick(&tick);
        }
        tracing::debug!(index = self.index, len = self.inputs.len(), "sequence spliced in");
        previous
    }

    pub fn play_until(&self) -> Option<usize> {
        self.play_until
    }

    /// Stop playback at `index` and continue by recording from there.
    /// `None` cancels.
    pub fn set_play_until(&mut self, index: Option<usize>) {
        if let Some(target) = index
            && self.state == TasState::Playback
            && target <= self.index
        {
            tracing::warn!(target, index = self.index, "play-until target already passed");
        }
        self.play_until = index;
    }

    /// Request a state change. `Ok` carries a message for the user.
    pub fn set_state(&mut self, target: TasState) -> Result<String, TransitionRefused> {
        use TasState::*;

        let message = match (self.state, target) {
            (None, None) | (Recording, Recording) | (Playback, Playback) | (Paused, Paused) => {
                return Err(TransitionRefused::AlreadyInState(self.state));
            }
            (Recording, Playback) => return Err(TransitionRefused::RecordingToPlayback),
            (Playback, Recording) => return Err(TransitionRefused::PlaybackToRecording),
            (None, Paused) => return Err(TransitionRefused::NothingToPause),

            (None, Recording) => {
                if self.inputs.is_empty() {
                    self.inputs.push(TickContainer::new());
                }
                self.index = self.inputs.len() - 1;
                self.input.begin_tick();
                "Starting a recording".to_string()
            }
            (None, Playback) => {
                self.index = 0;
                self.input.clear();
                if let Some(baseline) = self.inputs.get(0) {
                    self.input.play_tick(&baseline);
                }
                "Starting playback".to_string()
            }
            (from @ (Recording | Playback), Paused) => {
                self.state_after_pause = Some(from);
                self.input.release_all();
                "Pausing".to_string()
            }
            (Recording, None) => "Stopping the recording".to_string(),
            (Playback, None) => {
                self.input.release_all();
                "Stopping the playback".to_string()
            }
            (Paused, None) => {
                self.state_after_pause = Option::None;
                "Aborting".to_string()
            }
            (Paused, requested) => match self.state_after_pause {
                Some(paused_from) if paused_from == requested => {
                    self.state_after_pause = Option::None;
                    format!("Resuming {}", requested)
                }
                other => {
                    return Err(TransitionRefused::ResumeMismatch {
                        paused_from: other.unwrap_or_default(),
                        requested,
                    });
                }
            },
        };

        tracing::info!(from = %self.state, to = %target, "{}", message);
        self.state = target;
        Ok(message)
    }

    /// Pause when running, resume into the remembered state when paused
    pub fn toggle_pause(&mut self) -> Result<String, TransitionRefused> {
        match self.state {
            TasState::Paused => self.resume(),
            TasState::None => Err(TransitionRefused::NothingToPause),
            _ => self.set_state(TasState::Paused),
        }
    }

    pub fn resume(&mut self) -> Result<String, TransitionRefused> {
        match (self.state, self.state_after_pause) {
            (TasState::Paused, Some(previous)) => self.set_state(previous),
            _ => Err(TransitionRefused::NotPaused),
        }
    }

    /// Advance by one simulation step
    pub fn on_tick(&mut self) {
        match self.state {
            TasState::Recording => self.record_tick(),
            TasState::Playback => self.playback_tick(),
            TasState::None | TasState::Paused => {}
        }
    }

    fn record_tick(&mut self) {
        let tick = self.input.snapshot();
        let next = self.index + 1;
        self.ctx.file_commands.handle_on_record(next, &tick);
        if next < self.inputs.len() {
            self.inputs.set(next, tick);
        } else {
            self.inputs.push(tick);
        }
        self.index = next;
        self.input.begin_tick();
    }

    fn playback_tick(&mut self) {
        self.index += 1;
        let Some(tick) = self.inputs.get(self.index) else {
            self.input.release_all();
            self.index = self.inputs.len().saturating_sub(1);
            self.state = TasState::None;
            tracing::info!(ticks = self.inputs.len(), "playback finished");
            return;
        };

        self.input.play_tick(&tick);
        self.ctx.file_commands.handle_on_playback(self.index, &tick);

        if self.play_until == Some(self.index) {
            self.inputs.truncate(self.index + 1);
            self.ctx.file_commands.handle_on_truncate(self.index + 1);
            self.play_until = None;
            self.state = TasState::Recording;
            if let Some(credits) = self.ctx.metadata.get_mut::<Credits>() {
                credits.add_rerecord();
            }
            tracing::info!(index = self.index, "play-until reached, recording from here");
        }
    }

    fn accepts_host_input(&self) -> bool {
        match self.state {
            TasState::Playback => false,
            TasState::Paused => self.state_after_pause != Some(TasState::Playback),
            TasState::None | TasState::Recording => true,
        }
    }

    /// Feed a keyboard event from the host. Ignored during playback.
    pub fn key_event(&mut self, code: i32, pressed: bool, character: Option<char>) -> bool {
        let accepted = self.accepts_host_input();
        if accepted {
            self.input.key_event(code, pressed, character);
        }
        accepted
    }

    /// Feed a mouse event from the host. Ignored during playback.
    pub fn mouse_event(
        &mut self,
        code: i32,
        pressed: bool,
        scroll: i32,
        cursor_x: i32,
        cursor_y: i32,
    ) -> bool {
        let accepted = self.accepts_host_input();
        if accepted {
            self.input.mouse_event(code, pressed, scroll, cursor_x, cursor_y);
        }
        accepted
    }

    /// Feed a camera turn from the host. Ignored during playback.
    pub fn rotate_camera(&mut self, pitch_delta: f32, yaw_delta: f32) -> bool {
        let accepted = self.accepts_host_input();
        if accepted {
            self.input.rotate_camera(pitch_delta, yaw_delta);
        }
        accepted
    }

    /// Report the absolute camera angle. Ignored during playback.
    pub fn look(&mut self, pitch: f32, yaw: f32) -> bool {
        let accepted = self.accepts_host_input();
        if accepted {
            self.input.look(pitch, yaw);
        }
        accepted
    }

    /// Set the camera without creating a subtick, e.g. after a teleport
    pub fn set_camera(&mut self, pitch: f32, yaw: f32) {
        self.input.set_camera(pitch, yaw);
    }

    pub fn poll_keyboard_event(&mut self) -> Option<KeyboardEvent> {
        self.input.poll_keyboard_event()
    }

    pub fn poll_mouse_event(&mut self) -> Option<MouseEvent> {
        self.input.poll_mouse_event()
    }

    pub fn poll_camera_event(&mut self) -> Option<CameraEvent> {
        self.input.poll_camera_event()
    }

    /// Drop every tick and all extension data. Only allowed when stopped.
    pub fn clear(&mut self) -> Result<String, TransitionRefused> {
        if self.state != TasState::None {
            return Err(TransitionRefused::ClearWhileActive(self.state));
        }
        self.inputs.clear();
        self.index = 0;
        self.play_until = None;
        self.input.clear();
        self.ctx.file_commands.handle_on_clear();
        self.ctx.metadata.handle_on_clear();
        tracing::info!("inputs cleared");
        Ok("Cleared inputs".to_string())
    }

    pub fn save(&self, path: &Path, flavor: Option<&str>) -> Result<(), SaveError> {
        format::save_file(&self.ctx, self.inputs.as_ref(), path, flavor)
    }

    /// Replace the sequence with a file's contents. A running recording or
    /// playback is stopped first.
    pub fn load(&mut self, path: &Path, flavor: Option<&str>) -> Result<(), LoadError> {
        self.stop_for_load();
        let sequence = format::load_file(&mut self.ctx, path, flavor)?;
        self.install(sequence);
        Ok(())
    }

    /// Same as [`Self::load`] with the file already in memory
    pub fn load_str(&mut self, text: &str, flavor: Option<&str>) -> Result<(), LoadError> {
        self.stop_for_load();
        let sequence = format::deserialise(&mut self.ctx, text, flavor)?;
        self.install(sequence);
        Ok(())
    }

    fn stop_for_load(&mut self) {
        if self.state != TasState::None {
            tracing::info!(state = %self.state, "stopping before load");
            if self.state == TasState::Playback
                || self.state_after_pause == Some(TasState::Playback)
            {
                self.input.release_all();
            }
            self.state = TasState::None;
            self.state_after_pause = None;
        }
    }

    fn install(&mut self, sequence: MemorySequence) {
        self.inputs.clear();
        for tick in sequence.into_vec() {
            self.inputs.push(tick);
        }
        self.index = 0;
        self.play_until = None;
    }

    /// Stop everything and tear the context down
    pub fn shutdown(mut self) {
        self.stop_for_load();
        self.input.clear();
        self.ctx.teardown();
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("state_after_pause", &self.state_after_pause)
            .field("index", &self.index)
            .field("len", &self.inputs.len())
            .field("play_until", &self.play_until)
            .finish()
    }
}
