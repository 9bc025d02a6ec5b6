//! Input snapshots
//!
//! - [`subtick`]: current state + intermediate states within a tick
//! - [`keyboard`], [`mouse`], [`camera`]: peripheral states and their diffing
//! - [`virtual_input`]: the live peripherals driven by recording and playback

pub mod camera;
pub mod keyboard;
pub mod mouse;
mod pressed;
pub mod subtick;
pub mod virtual_input;

pub use camera::{Camera, CameraEvent, CameraState};
pub use keyboard::{Keyboard, KeyboardEvent, KeyboardState};
pub use mouse::{Mouse, MouseEvent, MouseState};
pub use pressed::PressedCodes;
pub use subtick::{SubtickValue, Subticked};
pub use virtual_input::VirtualInput;
