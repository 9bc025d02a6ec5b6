//! Camera angle snapshots
//!
//! Both angles stay `None` until the host reports them for the first time;
//! `None` and `Some(0.0)` are different states.

use super::subtick::{SubtickValue, Subticked};

/// Camera angle with subtick history
pub type Camera = Subticked<CameraState>;

pub const PITCH_MIN: f32 = -90.0;
pub const PITCH_MAX: f32 = 90.0;

/// Target angle to apply during playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraEvent {
    pub pitch: Option<f32>,
    pub yaw: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraState {
    pitch: Option<f32>,
    yaw: Option<f32>,
}

impl SubtickValue for CameraState {}

pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(PITCH_MIN, PITCH_MAX)
}

impl CameraState {
    /// Pitch is clamped to [-90, 90]; yaw is unbounded
    pub fn new(pitch: Option<f32>, yaw: Option<f32>) -> Self {
        Self {
            pitch: pitch.map(clamp_pitch),
            yaw,
        }
    }

    pub fn at(pitch: f32, yaw: f32) -> Self {
        Self::new(Some(pitch), Some(yaw))
    }

    pub fn pitch(&self) -> Option<f32> {
        self.pitch
    }

    pub fn yaw(&self) -> Option<f32> {
        self.yaw
    }

    pub fn is_observed(&self) -> bool {
        self.pitch.is_some() && self.yaw.is_some()
    }

    pub fn apply(&mut self, event: &CameraEvent) {
        *self = Self::new(event.pitch, event.yaw);
    }

    /// Event that turns `self` into `next`, or `None` if nothing changed.
    /// The pitch is clamped again; yaw is passed through as is.
    pub fn difference(&self, next: &CameraState) -> Option<CameraEvent> {
        if self == next {
            return None;
        }
        Some(CameraEvent {
            pitch: next.pitch.map(clamp_pitch),
            yaw: next.yaw,
        })
    }
}

impl Subticked<CameraState> {
    /// Turn the camera by a delta. Ignored until the camera has been observed.
    pub fn rotate(&mut self, pitch_delta: f32, yaw_delta: f32) {
        let current = *self.current();
        let (Some(pitch), Some(yaw)) = (current.pitch, current.yaw) else {
            tracing::debug!("camera rotation ignored: angle not observed yet");
            return;
        };
        self.update_from_event(|state| {
            *state = CameraState::at(pitch + pitch_delta, yaw + yaw_delta);
        });
    }

    /// Record an absolute angle as one change
    pub fn look(&mut self, pitch: f32, yaw: f32) {
        self.update_from_event(|state| *state = CameraState::at(pitch, yaw));
    }

    /// Set the angle without creating a subtick (first observation, teleports)
    pub fn set(&mut self, pitch: f32, yaw: f32) {
        *self.current_mut() = CameraState::at(pitch, yaw);
    }
}
