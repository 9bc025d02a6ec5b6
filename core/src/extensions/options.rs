//! Game option toggles replayed with the inputs, e.g. `$hud(false);`

use std::collections::BTreeMap;

use super::file_command::{FileCommand, FileCommandExtension};
use crate::error::ExtensionError;
use crate::tick::TickContainer;

pub const NAME: &str = "options@v1";
pub const COMMAND_HUD: &str = "hud";

/// Host hook that shows or hides the HUD
pub trait HudControl: Send {
    fn set_hud_visible(&mut self, visible: bool);
}

#[derive(Default)]
pub struct OptionsExtension {
    hud: BTreeMap<usize, bool>,
    control: Option<Box<dyn HudControl>>,
}

impl OptionsExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_control(&mut self, control: impl HudControl + 'static) {
        self.control = Some(Box::new(control));
    }

    /// Schedule a HUD change at `tick`
    pub fn set_hud(&mut self, tick: usize, visible: bool) {
        self.hud.insert(tick, visible);
    }

    pub fn hud_at(&self, tick: usize) -> Option<bool> {
        self.hud.get(&tick).copied()
    }
}

impl FileCommandExtension for OptionsExtension {
    fn name(&self) -> &str {
        NAME
    }

    fn command_names(&self) -> &[&'static str] {
        &[COMMAND_HUD]
    }

    fn on_clear(&mut self) {
        self.hud.clear();
    }

    fn on_truncate(&mut self, len: usize) {
        self.hud.retain(|tick, _| *tick < len);
    }

    fn on_playback(&mut self, tick: usize, _container: &TickContainer) {
        if let (Some(visible), Some(control)) = (self.hud.get(&tick), self.control.as_mut()) {
            tracing::debug!(tick, visible, "hud toggled by playback");
            control.set_hud_visible(*visible);
        }
    }

    fn on_serialise_inline(&self, tick: usize, _container: &TickContainer) -> Vec<FileCommand> {
        self.hud
            .get(&tick)
            .map(|visible| FileCommand::new(COMMAND_HUD, [visible.to_string()]))
            .into_iter()
            .collect()
    }

    fn check_inline(&self, _tick: usize, commands: &[FileCommand]) -> Result<(), ExtensionError> {
        commands.iter().try_for_each(|c| parse_hud(c).map(drop))
    }

    fn on_deserialise_inline(
        &mut self,
        tick: usize,
        commands: &[FileCommand],
    ) -> Result<(), ExtensionError> {
        for command in commands {
            let visible = parse_hud(command)?;
            self.hud.insert(tick, visible);
        }
        Ok(())
    }
}

fn parse_hud(command: &FileCommand) -> Result<bool, ExtensionError> {
    match command.arg(0) {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        other => Err(ExtensionError::new(format!(
            "hud expects true or false, got {:?}",
            other.unwrap_or("")
        ))),
    }
}
