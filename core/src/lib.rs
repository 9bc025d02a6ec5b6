//! tasrec core - deterministic input recording and playback
//!
//! Records keyboard, mouse and camera input once per simulation tick,
//! including every intermediate state within a tick, and replays it exactly.
//! Recordings are stored in a line-oriented, human-editable text format.
//!
//! # Architecture
//!
//! - [`PlaybackController`] - NONE/RECORDING/PLAYBACK/PAUSED state machine driven per tick
//! - [`VirtualInput`] - live peripherals, fed by the host or by playback
//! - [`TickContainer`] - everything recorded during one tick
//! - [`TasContext`] - flavors, extension registries and settings
//! - [`format`] - text codec, flavors and the background file writer

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod extensions;
pub mod format;
pub mod input;
#[cfg(test)]
mod integration;
pub mod keys;
pub mod sequence;
pub mod tick;

pub use config::TasConfig;
pub use context::TasContext;
pub use controller::{PlaybackController, TasState, TransitionRefused};
pub use error::{ErrorLocation, ExtensionError, LoadError, LoadErrorKind, RegistryError, SaveError};
pub use extensions::{
    FileCommand, FileCommandExtension, FileCommandRegistry, MetadataBlock, MetadataExtension,
    MetadataRegistry,
};
pub use format::{DETECTION_WINDOW, Flavor, FlavorRegistry};
pub use input::{CameraState, KeyboardState, MouseState, VirtualInput};
pub use sequence::{MemorySequence, TickSequence};
pub use tick::{CommentContainer, TickContainer};
