//! Comment bodies: file commands followed by free text
//!
//! `// $label(Start); $hud(false); free text`

use std::sync::LazyLock;

use regex::Regex;

use crate::extensions::FileCommand;

pub const COMMENT_PREFIX: &str = "//";

static COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$([A-Za-z0-9_]+)\((.*?)\);").expect("command regex"));

/// Render the part after `//`. Empty when there is nothing to write.
pub fn render_body<'a>(
    commands: impl IntoIterator<Item = &'a FileCommand>,
    text: Option<&str>,
) -> String {
    let mut parts: Vec<String> = commands.into_iter().map(ToString::to_string).collect();
    if let Some(text) = text {
        parts.push(text.to_string());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" {}", parts.join(" "))
    }
}

/// Split the part after `//` into commands and free text
pub fn parse_body(body: &str) -> (Vec<FileCommand>, Option<String>) {
    let mut rest = body.strip_prefix(' ').unwrap_or(body);
    let mut commands = Vec::new();

    while let Some(caps) = COMMAND.captures(rest) {
        commands.push(FileCommand::from_text(&caps[1], &caps[2]));
        let end = caps.get(0).map_or(0, |m| m.end());
        rest = &rest[end..];
        rest = rest.strip_prefix(' ').unwrap_or(rest);
    }

    let text = (!rest.is_empty()).then(|| rest.to_string());
    (commands, text)
}

/// A whole inline comment line
pub fn render_line<'a>(
    commands: impl IntoIterator<Item = &'a FileCommand>,
    text: Option<&str>,
) -> String {
    format!("{}{}", COMMENT_PREFIX, render_body(commands, text))
}

/// Parse a whole inline comment line. `None` if it is not a comment.
pub fn parse_line(line: &str) -> Option<(Vec<FileCommand>, Option<String>)> {
    line.strip_prefix(COMMENT_PREFIX).map(parse_body)
}
