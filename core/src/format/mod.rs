//! TAS text format
//!
//! A file is a header followed by one block per tick:
//!
//! - [`header`]: banners, flavor, enabled file commands, metadata blocks
//! - [`extract`]: slices the body into per-tick line blocks
//! - [`body`]: tick/subtick lines and their comments
//! - [`fields`]: the keyboard, mouse and camera columns
//! - [`comments`]: `$name(args);` commands and free text
//! - [`flavor`]: named dialects of the grammar
//! - [`writer`]: background file writer
//!
//! Loading is two-staged: extraction first decides which lines form a tick,
//! then each block is parsed on its own.

pub mod body;
pub mod comments;
pub mod extract;
pub mod fields;
pub mod flavor;
pub mod header;
pub mod writer;

use std::path::Path;
use std::sync::Arc;

use crate::context::TasContext;
use crate::error::{LoadError, LoadErrorKind, SaveError};
use crate::input::CameraState;
use crate::sequence::{MemorySequence, TickSequence};

pub use flavor::{Beta1Flavor, Flavor, FlavorRegistry};
pub use writer::LineWriter;

/// Number of leading lines searched for `Flavor:` when none is requested
pub const DETECTION_WINDOW: usize = 100;

/// Find the declared flavor within the first [`DETECTION_WINDOW`] lines
pub fn detect_flavor(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .take(DETECTION_WINDOW)
        .find_map(|line| header::flavor_line(line))
        .map(str::to_string)
}

fn resolve_save_flavor(ctx: &TasContext, requested: Option<&str>) -> Result<Arc<dyn Flavor>, SaveError> {
    let name = requested.unwrap_or(&ctx.config.default_flavor);
    ctx.flavors
        .get(name)
        .ok_or_else(|| SaveError::UnknownFlavor(name.to_string()))
}

/// Render a sequence with the context's registries.
///
/// `flavor` defaults to the configured one.
pub fn serialise(
    ctx: &TasContext,
    inputs: &dyn TickSequence,
    flavor: Option<&str>,
) -> Result<Vec<String>, SaveError> {
    if inputs.is_empty() {
        return Err(SaveError::EmptySequence);
    }
    let flavor = resolve_save_flavor(ctx, flavor)?;

    let mut lines = header::render(
        flavor.as_ref(),
        &ctx.file_commands.enabled_names(),
        &ctx.metadata.handle_on_store(),
    );

    let mut previous: Option<CameraState> = None;
    for index in 0..inputs.len() {
        let Some(tick) = inputs.get(index) else {
            break;
        };
        lines.extend(body::render_tick(
            flavor.as_ref(),
            &ctx.file_commands,
            index,
            &tick,
            previous.as_ref(),
            ctx.config.relative_camera,
        ));
        previous = Some(*tick.camera.current());
    }
    Ok(lines)
}

fn resolve_load_flavor(
    ctx: &TasContext,
    lines: &[&str],
    requested: Option<&str>,
) -> Result<Arc<dyn Flavor>, LoadError> {
    let declared = detect_flavor(lines);
    let name = match (requested, declared) {
        (Some(requested), Some(found)) if requested != found => {
            return Err(LoadErrorKind::FlavorMismatch {
                expected: requested.to_string(),
                found,
            }
            .into());
        }
        (Some(requested), _) => requested.to_string(),
        (None, Some(found)) => found,
        (None, None) => return Err(LoadErrorKind::MissingFlavor(DETECTION_WINDOW).into()),
    };
    ctx.flavors
        .get(&name)
        .ok_or_else(|| LoadErrorKind::UnknownFlavor(name).into())
}

/// Parse TAS text into a new sequence.
///
/// The whole file is parsed and every extension's data checked before the
/// context changes. Only then is the file-command registry cleared, set to
/// the extensions listed in the header and fed the commands; metadata
/// extensions receive their blocks. A failed load leaves the context as it
/// was.
pub fn deserialise(
    ctx: &mut TasContext,
    text: &str,
    flavor: Option<&str>,
) -> Result<MemorySequence, LoadError> {
    let lines: Vec<&str> = text.lines().collect();
    let flavor = resolve_load_flavor(ctx, &lines, flavor)?;

    let header = header::parse(flavor.as_ref(), &lines)?;
    match header.flavor.as_deref() {
        Some(found) if found == flavor.name() => {}
        found => {
            return Err(LoadErrorKind::FlavorMismatch {
                expected: flavor.name().to_string(),
                found: found.unwrap_or_default().to_string(),
            }
            .into());
        }
    }

    let enabled = match &header.file_commands {
        Some(_) => {
            let registered = ctx.file_commands.all_names();
            let (known, unknown): (Vec<String>, Vec<String>) = header
                .file_command_names()
                .into_iter()
                .map(|name| name.to_string())
                .partition(|name| registered.contains(name));
            for name in unknown {
                tracing::warn!(extension = %name, "file names an unregistered file command extension");
            }
            known
        }
        None => {
            tracing::debug!("no FileCommand-Extensions line, keeping current selection");
            ctx.file_commands.enabled_names()
        }
    };
    ctx.metadata.check_load(&header.metadata)?;

    let blocks = extract::extract(&lines, header.body_start)?;
    let mut sequence = MemorySequence::new();
    let mut staged = Vec::with_capacity(blocks.len());
    let mut previous = CameraState::default();
    for (position, block) in blocks.iter().enumerate() {
        let (tick, commands) = body::parse_tick(flavor.as_ref(), block, position, &previous)?;
        if !commands.is_empty() {
            staged.push(ctx.file_commands.stage(position, &commands, &enabled)?);
        }
        previous = *tick.camera.current();
        sequence.push(tick);
    }

    ctx.file_commands.handle_on_clear();
    if header.file_commands.is_some() {
        ctx.file_commands.set_enabled_names(&enabled);
    }
    ctx.metadata.handle_on_load(&header.metadata)?;
    for tick in staged {
        ctx.file_commands.commit(tick)?;
    }
    Ok(sequence)
}

/// Serialise and write to `path` through a [`LineWriter`]
pub fn save_file(
    ctx: &TasContext,
    inputs: &dyn TickSequence,
    path: &Path,
    flavor: Option<&str>,
) -> Result<(), SaveError> {
    let lines = serialise(ctx, inputs, flavor)?;
    let writer = LineWriter::create(path)?;
    for line in lines {
        writer.write_line(line);
    }
    let written = writer.close()?;
    tracing::info!(path = %path.display(), ticks = inputs.len(), lines = written, "TAS file saved");
    Ok(())
}

pub fn load_file(
    ctx: &mut TasContext,
    path: &Path,
    flavor: Option<&str>,
) -> Result<MemorySequence, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let sequence = deserialise(ctx, &text, flavor)?;
    tracing::info!(path = %path.display(), ticks = sequence.len(), "TAS file loaded");
    Ok(sequence)
}
