//! Error types for loading and saving TAS files and for registry misuse

use std::fmt;

/// Where in a file a load error occurred
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorLocation {
    /// 1-based absolute line number in the file
    pub line: Option<usize>,
    /// Tick index (position in the sequence)
    pub tick: Option<usize>,
    /// Subtick index within the tick (0 = tick line)
    pub subtick: Option<usize>,
}

impl ErrorLocation {
    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.tick.is_none() && self.subtick.is_none()
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(3);
        if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }
        if let Some(tick) = self.tick {
            parts.push(format!("tick {}", tick));
        }
        if let Some(subtick) = self.subtick {
            parts.push(format!("subtick {}", subtick));
        }
        write!(f, " ({})", parts.join(", "))
    }
}

/// The reason a file could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadErrorKind {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("no `Flavor:` line found in the first {0} lines")]
    MissingFlavor(usize),

    #[error("unknown flavor `{0}`")]
    UnknownFlavor(String),

    #[error("file declares flavor `{found}` but `{expected}` was requested")]
    FlavorMismatch { expected: String, found: String },

    #[error("header start banner not found")]
    MissingHeaderStart,

    #[error("header end banner not found")]
    MissingHeaderEnd,

    #[error("malformed header line: {0}")]
    MalformedHeader(String),

    #[error("subtick line without a preceding tick line")]
    SubtickBeforeTick,

    #[error("unrecognised line: {0}")]
    UnrecognisedLine(String),

    #[error("{field} field has {found} values, expected {expected}")]
    FieldCount {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("unknown key `{0}`")]
    UnknownKey(String),

    #[error("relative {0} value has no previous value to resolve against")]
    UnresolvableRelative(&'static str),

    #[error("file command `{command}` belongs to disabled extension `{extension}`")]
    DisabledExtension { extension: String, command: String },

    #[error("extension `{0}` has more than one command on the same endline")]
    DuplicateEndlineCommand(String),

    #[error("extension `{name}` rejected its data: {message}")]
    Extension { name: String, message: String },
}

/// Malformed or unreadable TAS data
#[derive(Debug, thiserror::Error)]
#[error("{kind}{location}")]
pub struct LoadError {
    #[source]
    pub kind: LoadErrorKind,
    pub location: ErrorLocation,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::default(),
        }
    }

    /// Attach an absolute line number (1-based)
    pub fn at_line(mut self, line: usize) -> Self {
        self.location.line = Some(line);
        self
    }

    pub fn at_tick(mut self, tick: usize) -> Self {
        self.location.tick = Some(tick);
        self
    }

    pub fn at_subtick(mut self, subtick: usize) -> Self {
        self.location.subtick = Some(subtick);
        self
    }
}

impl From<LoadErrorKind> for LoadError {
    fn from(kind: LoadErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(LoadErrorKind::Io(err))
    }
}

/// A TAS file could not be written
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to save: the input sequence is empty")]
    EmptySequence,

    #[error("unknown flavor `{0}`")]
    UnknownFlavor(String),

    #[error("file writer thread panicked")]
    WriterPanicked,
}

/// Registration misuse on one of the extension registries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("an extension named `{0}` is already registered")]
    DuplicateName(String),

    #[error("an extension of the same type as `{0}` is already registered")]
    DuplicateInstance(String),

    #[error("no extension named `{0}` is registered")]
    NotRegistered(String),
}

/// Error reported by an extension while consuming its own data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ExtensionError(pub String);

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_suffix() {
        let err = LoadError::new(LoadErrorKind::InvalidNumber("x".into()))
            .at_line(12)
            .at_tick(3)
            .at_subtick(1);
        assert_eq!(
            err.to_string(),
            "invalid number `x` (line 12, tick 3, subtick 1)"
        );
    }

    #[test]
    fn test_location_omitted_when_unknown() {
        let err = LoadError::new(LoadErrorKind::MissingHeaderEnd);
        assert_eq!(err.to_string(), "header end banner not found");
    }
}
