//! Credits header block: title, author, playing time and rerecord count

use std::time::Duration;

use super::metadata::{MetadataBlock, MetadataExtension};
use crate::error::ExtensionError;

pub const DEFAULT_TITLE: &str = "Insert TAS category here";
pub const DEFAULT_AUTHOR: &str = "Insert author here";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credits {
    pub title: String,
    pub author: String,
    pub playing_time: Duration,
    pub rerecords: u64,
}

impl Default for Credits {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            playing_time: Duration::ZERO,
            rerecords: 0,
        }
    }
}

impl Credits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rerecord(&mut self) {
        self.rerecords += 1;
    }

    pub fn add_playtime(&mut self, elapsed: Duration) {
        self.playing_time += elapsed;
    }

    /// Defaults overridden by whatever the block sets
    fn from_block(block: &MetadataBlock) -> Result<Self, ExtensionError> {
        let mut credits = Credits::default();
        if let Some(title) = block.get("Title") {
            credits.title = title.to_string();
        }
        if let Some(author) = block.get("Author") {
            credits.author = author.to_string();
        }
        if let Some(time) = block.get("Playing Time") {
            credits.playing_time = parse_playing_time(time)
                .ok_or_else(|| ExtensionError::new(format!("invalid playing time `{}`", time)))?;
        }
        if let Some(rerecords) = block.get("Rerecords") {
            credits.rerecords = rerecords
                .trim()
                .parse()
                .map_err(|_| ExtensionError::new(format!("invalid rerecord count `{}`", rerecords)))?;
        }
        Ok(credits)
    }
}

/// `HH:MM:SS.mmm`; hours grow past two digits if needed
pub fn format_playing_time(time: Duration) -> String {
    let millis = time.as_millis();
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis / 1000) % 60;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis % 1000)
}

pub fn parse_playing_time(text: &str) -> Option<Duration> {
    let (hms, millis) = text.trim().split_once('.')?;
    let mut parts = hms.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 || millis.len() != 3 {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;
    Some(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}

impl MetadataExtension for Credits {
    fn name(&self) -> &str {
        "Credits"
    }

    fn on_store(&self) -> MetadataBlock {
        MetadataBlock::new()
            .with("Title", &self.title)
            .with("Author", &self.author)
            .with("Playing Time", format_playing_time(self.playing_time))
            .with("Rerecords", self.rerecords.to_string())
    }

    fn check(&self, block: &MetadataBlock) -> Result<(), ExtensionError> {
        Credits::from_block(block).map(drop)
    }

    fn on_load(&mut self, block: &MetadataBlock) -> Result<(), ExtensionError> {
        *self = Credits::from_block(block)?;
        Ok(())
    }

    fn on_clear(&mut self) {
        *self = Credits::default();
    }
}
