//! Chapter labels written as `$label(text);` above a tick

use std::collections::BTreeMap;

use super::file_command::{FileCommand, FileCommandExtension};
use crate::error::ExtensionError;
use crate::tick::TickContainer;

pub const NAME: &str = "label@v1";
pub const COMMAND: &str = "label";

/// Label text as written between the parentheses. Backslashes, semicolons
/// and line breaks are escaped so the command and the line stay intact.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[derive(Debug, Default)]
pub struct LabelExtension {
    labels: BTreeMap<usize, Vec<String>>,
    reached: Vec<(usize, String)>,
}

impl LabelExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_label(&mut self, tick: usize, text: impl Into<String>) {
        self.labels.entry(tick).or_default().push(text.into());
    }

    pub fn remove_labels(&mut self, tick: usize) -> Vec<String> {
        self.labels.remove(&tick).unwrap_or_default()
    }

    pub fn labels_at(&self, tick: usize) -> &[String] {
        self.labels.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every label in tick order
    pub fn labels(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels
            .iter()
            .flat_map(|(tick, texts)| texts.iter().map(move |t| (*tick, t.as_str())))
    }

    /// First tick carrying a label with this exact text
    pub fn find(&self, text: &str) -> Option<usize> {
        self.labels()
            .find(|(_, label)| *label == text)
            .map(|(tick, _)| tick)
    }

    /// Labels passed during playback since the last clear
    pub fn reached(&self) -> &[(usize, String)] {
        &self.reached
    }
}

impl FileCommandExtension for LabelExtension {
    fn name(&self) -> &str {
        NAME
    }

    fn command_names(&self) -> &[&'static str] {
        &[COMMAND]
    }

    fn on_clear(&mut self) {
        self.labels.clear();
        self.reached.clear();
    }

    fn on_truncate(&mut self, len: usize) {
        self.labels.retain(|tick, _| *tick < len);
    }

    fn on_playback(&mut self, tick: usize, _container: &TickContainer) {
        if let Some(texts) = self.labels.get(&tick) {
            for text in texts {
                tracing::info!(tick, label = %text, "label reached");
                self.reached.push((tick, text.clone()));
            }
        }
    }

    fn on_serialise_inline(&self, tick: usize, _container: &TickContainer) -> Vec<FileCommand> {
        self.labels_at(tick)
            .iter()
            .map(|text| FileCommand::from_text(COMMAND, escape(text)))
            .collect()
    }

    fn on_deserialise_inline(
        &mut self,
        tick: usize,
        commands: &[FileCommand],
    ) -> Result<(), ExtensionError> {
        for command in commands {
            self.add_label(tick, unescape(&command.text));
        }
        Ok(())
    }
}
