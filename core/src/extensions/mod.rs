//! Extension registries and the built-in extensions
//!
//! - [`metadata`]: named header blocks ([`credits`], [`start_position`])
//! - [`file_command`]: per-tick commands embedded in comments
//!   ([`desync`], [`label`], [`options`])

pub mod credits;
pub mod desync;
pub mod file_command;
pub mod label;
pub mod metadata;
pub mod options;
pub mod start_position;

pub use credits::Credits;
pub use desync::{DesyncMonitorExtension, DesyncReport, MotionSample, PositionProbe};
pub use file_command::{
    FileCommand, FileCommandExtension, FileCommandRegistry, StagedTick, TickCommands,
};
pub use label::LabelExtension;
pub use metadata::{MetadataBlock, MetadataExtension, MetadataRegistry};
pub use options::{HudControl, OptionsExtension};
pub use start_position::{Position, StartPosition};

/// Names of the built-in file-command extensions, in registration order
pub const BUILTIN_FILE_COMMANDS: [&str; 3] = [desync::NAME, label::NAME, options::NAME];
