//! Player position and view at the start of the recording

use super::metadata::{MetadataBlock, MetadataExtension};
use crate::error::ExtensionError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f32,
    pub yaw: f32,
}

/// Stores an optional [`Position`]. An empty block means "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartPosition {
    position: Option<Position>,
}

impl StartPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }
}

fn field<T: std::str::FromStr>(block: &MetadataBlock, key: &str) -> Result<T, ExtensionError> {
    let raw = block
        .get(key)
        .ok_or_else(|| ExtensionError::new(format!("missing `{}`", key)))?;
    raw.trim()
        .parse()
        .map_err(|_| ExtensionError::new(format!("invalid `{}` value `{}`", key, raw)))
}

fn parse_block(block: &MetadataBlock) -> Result<Option<Position>, ExtensionError> {
    if block.is_empty() {
        return Ok(None);
    }
    Ok(Some(Position {
        x: field(block, "x")?,
        y: field(block, "y")?,
        z: field(block, "z")?,
        pitch: field(block, "pitch")?,
        yaw: field(block, "yaw")?,
    }))
}

impl MetadataExtension for StartPosition {
    fn name(&self) -> &str {
        "StartPosition"
    }

    fn on_store(&self) -> MetadataBlock {
        match self.position {
            Some(p) => MetadataBlock::new()
                .with("x", p.x.to_string())
                .with("y", p.y.to_string())
                .with("z", p.z.to_string())
                .with("pitch", p.pitch.to_string())
                .with("yaw", p.yaw.to_string()),
            None => MetadataBlock::new(),
        }
    }

    fn check(&self, block: &MetadataBlock) -> Result<(), ExtensionError> {
        parse_block(block).map(drop)
    }

    fn on_load(&mut self, block: &MetadataBlock) -> Result<(), ExtensionError> {
        self.position = parse_block(block)?;
        Ok(())
    }

    fn on_clear(&mut self) {
        self.position = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut start = StartPosition::new();
        start.set_position(Some(Position {
            x: 12.5,
            y: 64.0,
            z: -3.25,
            pitch: 10.0,
            yaw: -90.5,
        }));
        let block = start.on_store();
        assert_eq!(block.get("y"), Some("64"));

        let mut loaded = StartPosition::new();
        loaded.on_load(&block).unwrap();
        assert_eq!(loaded, start);
    }

    #[test]
    fn test_empty_block_is_unset() {
        let mut start = StartPosition::new();
        assert!(start.on_store().is_empty());
        start.on_load(&MetadataBlock::new()).unwrap();
        assert_eq!(start.position(), None);
    }

    #[test]
    fn test_partial_block_is_rejected() {
        let block = MetadataBlock::new().with("x", "1");
        let err = StartPosition::new().on_load(&block).unwrap_err();
        assert_eq!(err.0, "missing `y`");
    }
}
