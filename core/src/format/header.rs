//! File header
//!
//! ```text
//! ################################################# TASfile ###
//! Flavor: beta1
//! FileCommand-Extensions: desyncMonitor@v1, label@v1
//! ### Credits
//! Title:Insert TAS category here
//! ##################################################################
//! ```

use super::flavor::Flavor;
use crate::error::{LoadError, LoadErrorKind};
use crate::extensions::MetadataBlock;

pub const FLAVOR_PREFIX: &str = "Flavor:";
pub const EXTENSIONS_PREFIX: &str = "FileCommand-Extensions:";
pub const BLOCK_PREFIX: &str = "###";

/// Everything the header carries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub flavor: Option<String>,
    /// Raw comma separated list, `None` if the line is missing
    pub file_commands: Option<String>,
    pub metadata: Vec<(String, MetadataBlock)>,
    /// Index of the first line after the end banner
    pub body_start: usize,
}

impl Header {
    pub fn file_command_names(&self) -> Vec<&str> {
        self.file_commands
            .as_deref()
            .map(|csv| {
                csv.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Value of a `Flavor:` line, if `line` is one
pub fn flavor_line(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix(FLAVOR_PREFIX)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

pub fn render(
    flavor: &dyn Flavor,
    enabled_file_commands: &[String],
    metadata: &[(String, MetadataBlock)],
) -> Vec<String> {
    let mut lines = vec![
        flavor.header_start().to_string(),
        format!("{} {}", FLAVOR_PREFIX, flavor.name()),
        format!("{} {}", EXTENSIONS_PREFIX, enabled_file_commands.join(", ")),
    ];
    for (name, block) in metadata {
        lines.push(format!("{} {}", BLOCK_PREFIX, name));
        lines.extend(block.iter().map(|(key, value)| format!("{}:{}", key, value)));
    }
    lines.push(flavor.header_end().to_string());
    lines
}

/// Parse the header at the top of `lines`. Line numbers in errors are 1-based.
pub fn parse(flavor: &dyn Flavor, lines: &[&str]) -> Result<Header, LoadError> {
    let mut iter = lines
        .iter()
        .enumerate()
        .skip_while(|(_, line)| line.trim().is_empty());

    match iter.next() {
        Some((_, line)) if line.trim_end() == flavor.header_start() => {}
        Some((i, _)) => return Err(LoadError::new(LoadErrorKind::MissingHeaderStart).at_line(i + 1)),
        None => return Err(LoadErrorKind::MissingHeaderStart.into()),
    }

    let mut header = Header::default();
    let mut block: Option<(String, MetadataBlock)> = None;

    for (i, raw) in iter {
        let line = raw.trim_end();
        if line == flavor.header_end() {
            header.metadata.extend(block.take());
            header.body_start = i + 1;
            return Ok(header);
        }
        if line.trim().is_empty() {
            continue;
        }
        let malformed = || LoadError::new(LoadErrorKind::MalformedHeader(line.to_string())).at_line(i + 1);

        if let Some(name) = line.strip_prefix(BLOCK_PREFIX) {
            header.metadata.extend(block.take());
            block = Some((name.trim().to_string(), MetadataBlock::new()));
        } else if let Some((_, current)) = block.as_mut() {
            let (key, value) = line.split_once(':').ok_or_else(malformed)?;
            current.insert(key, value);
        } else if let Some(csv) = line.strip_prefix(EXTENSIONS_PREFIX) {
            header.file_commands = Some(csv.trim().to_string());
        } else if line.starts_with(FLAVOR_PREFIX) {
            header.flavor = flavor_line(line).map(str::to_string);
        } else {
            return Err(malformed());
        }
    }

    Err(LoadErrorKind::MissingHeaderEnd.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::flavor::{Beta1Flavor, HEADER_END, HEADER_START};

    #[test]
    fn test_render() {
        let metadata = vec![(
            "Credits".to_string(),
            MetadataBlock::new().with("Title", "Any%").with("Playing Time", "00:00:01.000"),
        )];
        let lines = render(&Beta1Flavor, &["label@v1".to_string()], &metadata);
        assert_eq!(
            lines,
            vec![
                HEADER_START,
                "Flavor: beta1",
                "FileCommand-Extensions: label@v1",
                "### Credits",
                "Title:Any%",
                "Playing Time:00:00:01.000",
                HEADER_END,
            ]
        );

        let parsed = parse(&Beta1Flavor, &lines.iter().map(String::as_str).collect::<Vec<_>>()).unwrap();
        assert_eq!(parsed.flavor.as_deref(), Some("beta1"));
        assert_eq!(parsed.file_command_names(), vec!["label@v1"]);
        assert_eq!(parsed.metadata, metadata);
        assert_eq!(parsed.body_start, 7);
    }

    #[test]
    fn test_blocks_flush_on_next_marker() {
        let lines = [
            HEADER_START,
            "Flavor: beta1",
            "FileCommand-Extensions: ",
            "",
            "### A",
            "k:v:w",
            "### B",
            "### C",
            "x:",
            HEADER_END,
            "0|;|;0,0,0|;",
        ];
        let header = parse(&Beta1Flavor, &lines).unwrap();
        assert_eq!(header.file_commands.as_deref(), Some(""));
        assert!(header.file_command_names().is_empty());
        assert_eq!(header.metadata.len(), 3);
        assert_eq!(header.metadata[0].1.get("k"), Some("v:w"));
        assert!(header.metadata[1].1.is_empty());
        assert_eq!(header.metadata[2].1.get("x"), Some(""));
        assert_eq!(header.body_start, 10);
    }

    #[test]
    fn test_missing_banners() {
        let err = parse(&Beta1Flavor, &["Flavor: beta1"]).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::MissingHeaderStart));
        assert_eq!(err.location.line, Some(1));

        let err = parse(&Beta1Flavor, &[HEADER_START, "Flavor: beta1"]).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::MissingHeaderEnd));
    }

    #[test]
    fn test_malformed_line() {
        let err = parse(&Beta1Flavor, &[HEADER_START, "### A", "novalue", HEADER_END]).unwrap_err();
        assert!(matches!(err.kind, LoadErrorKind::MalformedHeader(ref l) if l == "novalue"));
        assert_eq!(err.location.line, Some(3));
    }
}
