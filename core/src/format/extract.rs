//! Tick extraction
//!
//! The body has no explicit block terminator, so a small scanner decides
//! which lines belong to each tick:
//!
//! ```text
//!            comment            tick              subtick
//! NONE ───────────────▶ COMMENTS ────▶ TICK ──────────────▶ SUBTICK
//!   │                                   ▲  ◀── comment/tick/blank close the block
//!   └──────────────── tick ─────────────┘
//! ```
//!
//! A subtick line while no tick line is open is an error. A comment line
//! ends the open block and starts the next one.

use crate::error::{LoadError, LoadErrorKind};

use super::comments::COMMENT_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    None,
    Comments,
    Tick,
    Subtick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Tick,
    Subtick,
    Other,
}

fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if line.starts_with(COMMENT_PREFIX) {
        LineKind::Comment
    } else if line.starts_with(|c: char| c.is_ascii_digit()) {
        LineKind::Tick
    } else if line
        .strip_prefix('\t')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
    {
        LineKind::Subtick
    } else {
        LineKind::Other
    }
}

/// The lines of one tick: inline comments, the tick line, subtick lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickBlock<'a> {
    /// `(1-based line number, text)`
    pub lines: Vec<(usize, &'a str)>,
}

impl<'a> TickBlock<'a> {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Line number of the tick line
    pub fn tick_line(&self) -> Option<usize> {
        self.lines
            .iter()
            .find(|(_, l)| classify(l) == LineKind::Tick)
            .map(|(n, _)| *n)
    }
}

/// Split the body (`lines[start..]`) into tick blocks
pub fn extract<'a>(lines: &[&'a str], start: usize) -> Result<Vec<TickBlock<'a>>, LoadError> {
    let mut blocks = Vec::new();
    let mut state = ScanState::None;
    let mut block = TickBlock::new();

    for (i, &line) in lines.iter().enumerate().skip(start) {
        let number = i + 1;
        let kind = classify(line);

        state = match (state, kind) {
            (_, LineKind::Other) => {
                return Err(LoadError::new(LoadErrorKind::UnrecognisedLine(line.to_string()))
                    .at_line(number));
            }
            (ScanState::None | ScanState::Comments, LineKind::Subtick) => {
                return Err(LoadError::new(LoadErrorKind::SubtickBeforeTick).at_line(number));
            }

            (ScanState::None, LineKind::Blank) => ScanState::None,
            (ScanState::Comments, LineKind::Blank) => ScanState::Comments,
            (ScanState::None | ScanState::Comments, LineKind::Comment) => {
                block.lines.push((number, line));
                ScanState::Comments
            }
            (ScanState::None | ScanState::Comments, LineKind::Tick) => {
                block.lines.push((number, line));
                ScanState::Tick
            }

            (ScanState::Tick | ScanState::Subtick, LineKind::Subtick) => {
                block.lines.push((number, line));
                ScanState::Subtick
            }
            (ScanState::Tick | ScanState::Subtick, LineKind::Blank) => {
                blocks.push(std::mem::replace(&mut block, TickBlock::new()));
                ScanState::None
            }
            (ScanState::Tick | ScanState::Subtick, LineKind::Comment) => {
                blocks.push(std::mem::replace(&mut block, TickBlock::new()));
                block.lines.push((number, line));
                ScanState::Comments
            }
            (ScanState::Tick | ScanState::Subtick, LineKind::Tick) => {
                blocks.push(std::mem::replace(&mut block, TickBlock::new()));
                block.lines.push((number, line));
                ScanState::Tick
            }
        };
    }

    match state {
        ScanState::Tick | ScanState::Subtick => blocks.push(block),
        ScanState::Comments => {
            let first = block.lines.first().map_or(0, |(n, _)| *n);
            tracing::warn!(line = first, "comments at the end of the file belong to no tick, ignoring");
        }
        ScanState::None => {}
    }
    Ok(blocks)
}
