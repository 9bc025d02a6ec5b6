//! File-command extensions
//!
//! A file command is a named directive embedded in a comment line:
//! `$name(arg0, arg1);`. Extensions own one or more command names and use
//! them to store per-tick side data in the file. Unlike metadata extensions,
//! each one can be switched on and off; only enabled extensions are asked to
//! write, and commands of a disabled extension make a file fail to load.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::{ExtensionError, LoadError, LoadErrorKind, RegistryError};
use crate::tick::TickContainer;

/// A named directive with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommand {
    pub name: String,
    /// Trimmed, comma separated arguments
    pub args: Vec<String>,
    /// Everything between the parentheses, untouched
    pub text: String,
}

impl FileCommand {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            text: args.join(", "),
            args,
        }
    }

    /// A command from its raw argument text, e.g. as read from a file
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            name: name.into(),
            args: split_args(&text),
            text,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

fn split_args(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(|arg| arg.trim().to_string()).collect()
}

impl fmt::Display for FileCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}({});", self.name, self.text)
    }
}

/// A contributor of per-tick side data.
///
/// Every hook has a no-op default so an extension only implements what it
/// needs.
pub trait FileCommandExtension: Any + Send {
    /// Unique, versioned name, e.g. `label@v1`
    fn name(&self) -> &str;

    /// Command names this extension reads and writes
    fn command_names(&self) -> &[&'static str];

    fn on_enable(&mut self) {}

    fn on_disable(&mut self) {}

    /// Drop all stored data
    fn on_clear(&mut self) {}

    /// The sequence was cut down to `len` ticks. Data for ticks `len` and
    /// later belongs to inputs that no longer exist.
    fn on_truncate(&mut self, _len: usize) {}

    /// A tick was recorded
    fn on_record(&mut self, _tick: usize, _container: &TickContainer) {}

    /// A tick was played back
    fn on_playback(&mut self, _tick: usize, _container: &TickContainer) {}

    /// Commands for the whole-tick comment lines. Command `i` goes on line `i`.
    fn on_serialise_inline(&self, _tick: usize, _container: &TickContainer) -> Vec<FileCommand> {
        Vec::new()
    }

    /// Commands for the data lines. Entry `i` goes on data line `i`
    /// (0 = tick line).
    fn on_serialise_endline(
        &self,
        _tick: usize,
        _container: &TickContainer,
    ) -> Vec<Option<FileCommand>> {
        Vec::new()
    }

    /// Reject inline commands [`Self::on_deserialise_inline`] would refuse,
    /// without storing anything. Loading checks the whole file this way
    /// before any extension state changes.
    fn check_inline(&self, _tick: usize, _commands: &[FileCommand]) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Endline counterpart of [`Self::check_inline`]
    fn check_endline(
        &self,
        _tick: usize,
        _commands: &[Option<FileCommand>],
    ) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// This extension's commands from the tick's comment lines, in line order
    fn on_deserialise_inline(
        &mut self,
        _tick: usize,
        _commands: &[FileCommand],
    ) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// This extension's command per data line (0 = tick line)
    fn on_deserialise_endline(
        &mut self,
        _tick: usize,
        _commands: &[Option<FileCommand>],
    ) -> Result<(), ExtensionError> {
        Ok(())
    }
}

struct Registered {
    type_id: TypeId,
    enabled: bool,
    extension: Box<dyn FileCommandExtension>,
}

/// Name-keyed, insertion-ordered set of file-command extensions
#[derive(Default)]
pub struct FileCommandRegistry {
    extensions: Vec<Registered>,
}

impl FileCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension, initially disabled. Names, concrete types and
    /// command names must be unique.
    pub fn register<E: FileCommandExtension>(&mut self, extension: E) -> Result<(), RegistryError> {
        let name = extension.name().to_string();
        if self.position(&name).is_some() {
            return Err(RegistryError::DuplicateName(name));
        }
        let type_id = TypeId::of::<E>();
        if self.extensions.iter().any(|r| r.type_id == type_id) {
            return Err(RegistryError::DuplicateInstance(name));
        }
        if let Some(command) = extension
            .command_names()
            .iter()
            .find(|c| self.owner_of(c).is_some())
        {
            return Err(RegistryError::DuplicateName(command.to_string()));
        }
        tracing::debug!(extension = %name, "file command extension registered");
        self.extensions.push(Registered {
            type_id,
            enabled: false,
            extension: Box::new(extension),
        });
        Ok(())
    }

    pub fn unregister(
        &mut self,
        name: &str,
    ) -> Result<Box<dyn FileCommandExtension>, RegistryError> {
        let pos = self
            .position(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        let mut registered = self.extensions.remove(pos);
        if registered.enabled {
            registered.extension.on_disable();
        }
        tracing::debug!(extension = %name, "file command extension unregistered");
        Ok(registered.extension)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.extensions
            .iter()
            .position(|r| r.extension.name() == name)
    }

    /// Index of the extension owning a command name
    fn owner_of(&self, command: &str) -> Option<usize> {
        self.extensions
            .iter()
            .position(|r| r.extension.command_names().contains(&command))
    }

    pub fn get<E: FileCommandExtension>(&self) -> Option<&E> {
        self.extensions
            .iter()
            .find(|r| r.type_id == TypeId::of::<E>())
            .and_then(|r| (r.extension.as_ref() as &dyn Any).downcast_ref::<E>())
    }

    pub fn get_mut<E: FileCommandExtension>(&mut self) -> Option<&mut E> {
        self.extensions
            .iter_mut()
            .find(|r| r.type_id == TypeId::of::<E>())
            .and_then(|r| (r.extension.as_mut() as &mut dyn Any).downcast_mut::<E>())
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let pos = self
            .position(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        let registered = &mut self.extensions[pos];
        if registered.enabled != enabled {
            registered.enabled = enabled;
            if enabled {
                registered.extension.on_enable();
            } else {
                registered.extension.on_disable();
            }
            tracing::debug!(extension = %name, enabled, "file command extension toggled");
        }
        Ok(())
    }

    /// Enable exactly the listed extensions and disable the rest.
    ///
    /// Returns names from the list that are not registered.
    pub fn set_enabled_names<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let wanted: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        let unknown: Vec<String> = wanted
            .iter()
            .filter(|n| self.position(n).is_none())
            .map(|n| n.to_string())
            .collect();

        for name in self.all_names() {
            let enabled = wanted.contains(&name.as_str());
            // Registered names always resolve
            let _ = self.set_enabled(&name, enabled);
        }
        unknown
    }

    /// Same as [`Self::set_enabled_names`] with a comma separated list.
    /// An empty list disables everything.
    pub fn set_enabled_from_csv(&mut self, csv: &str) -> Vec<String> {
        let names: Vec<&str> = csv
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        self.set_enabled_names(&names)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.position(name)
            .is_some_and(|pos| self.extensions[pos].enabled)
    }

    /// Enabled names in registration order
    pub fn enabled_names(&self) -> Vec<String> {
        self.extensions
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.extension.name().to_string())
            .collect()
    }

    /// All registered names in registration order
    pub fn all_names(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|r| r.extension.name().to_string())
            .collect()
    }

    pub fn enabled_csv(&self) -> String {
        self.enabled_names().join(", ")
    }

    fn enabled(&self) -> impl Iterator<Item = &dyn FileCommandExtension> {
        self.extensions
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.extension.as_ref())
    }

    fn enabled_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn FileCommandExtension>> {
        self.extensions
            .iter_mut()
            .filter(|r| r.enabled)
            .map(|r| &mut r.extension)
    }

    pub fn handle_on_record(&mut self, tick: usize, container: &TickContainer) {
        for ext in self.enabled_mut() {
            ext.on_record(tick, container);
        }
    }

    pub fn handle_on_playback(&mut self, tick: usize, container: &TickContainer) {
        for ext in self.enabled_mut() {
            ext.on_playback(tick, container);
        }
    }

    /// Clear the data of every registered extension, enabled or not
    pub fn handle_on_clear(&mut self) {
        for registered in &mut self.extensions {
            registered.extension.on_clear();
        }
    }

    /// Forget data from tick `len` on, in every registered extension
    pub fn handle_on_truncate(&mut self, len: usize) {
        tracing::debug!(len, "file command data truncated");
        for registered in &mut self.extensions {
            registered.extension.on_truncate(len);
        }
    }

    /// Inline commands per enabled extension, in registration order
    pub fn handle_on_serialise_inline(
        &self,
        tick: usize,
        container: &TickContainer,
    ) -> Vec<Vec<FileCommand>> {
        self.enabled()
            .map(|ext| ext.on_serialise_inline(tick, container))
            .collect()
    }

    /// Endline commands per enabled extension, in registration order
    pub fn handle_on_serialise_endline(
        &self,
        tick: usize,
        container: &TickContainer,
    ) -> Vec<Vec<Option<FileCommand>>> {
        self.enabled()
            .map(|ext| ext.on_serialise_endline(tick, container))
            .collect()
    }

    /// Route a command to its owning extension, given the names that are
    /// enabled. `Ok(None)` means no registered extension knows the name.
    fn route(
        &self,
        command: &FileCommand,
        enabled: &[String],
    ) -> Result<Option<usize>, LoadErrorKind> {
        let Some(pos) = self.owner_of(&command.name) else {
            tracing::warn!(command = %command.name, "no extension for file command, dropping");
            return Ok(None);
        };
        let extension = self.extensions[pos].extension.name();
        if enabled.iter().any(|name| name == extension) {
            Ok(Some(pos))
        } else {
            Err(LoadErrorKind::DisabledExtension {
                extension: extension.to_string(),
                command: command.name.clone(),
            })
        }
    }

    /// Route and check one tick's commands against the `enabled` selection
    /// without touching any extension state.
    ///
    /// Routing errors carry the line of the offending command, rejections by
    /// an extension the line of its first command in the tick.
    pub fn stage(
        &self,
        tick: usize,
        commands: &TickCommands,
        enabled: &[String],
    ) -> Result<StagedTick, LoadError> {
        let mut inline: Vec<Batch<FileCommand>> = Vec::new();
        for (line, found) in &commands.inline {
            for command in found {
                let Some(pos) = self
                    .route(command, enabled)
                    .map_err(|k| LoadError::new(k).at_line(*line).at_tick(tick))?
                else {
                    continue;
                };
                let batch = Batch::find_or_add(&mut inline, pos, *line);
                batch.commands.push(command.clone());
            }
        }

        let mut endline: Vec<Batch<Option<FileCommand>>> = Vec::new();
        for (slot, (line, found)) in commands.endline.iter().enumerate() {
            let at = |kind: LoadErrorKind| {
                LoadError::new(kind)
                    .at_line(*line)
                    .at_tick(tick)
                    .at_subtick(slot)
            };
            for command in found {
                let Some(pos) = self.route(command, enabled).map_err(at)? else {
                    continue;
                };
                let batch = Batch::find_or_add(&mut endline, pos, *line);
                if batch.commands.len() <= slot {
                    batch.commands.resize(slot + 1, None);
                }
                if batch.commands[slot].is_some() {
                    let name = self.extensions[pos].extension.name().to_string();
                    return Err(at(LoadErrorKind::DuplicateEndlineCommand(name)));
                }
                batch.commands[slot] = Some(command.clone());
            }
        }

        inline.sort_by_key(|b| b.extension);
        endline.sort_by_key(|b| b.extension);
        for batch in &inline {
            let ext = self.extensions[batch.extension].extension.as_ref();
            ext.check_inline(tick, &batch.commands)
                .map_err(|e| extension_error(ext.name(), e, tick).at_line(batch.line))?;
        }
        for batch in &endline {
            let ext = self.extensions[batch.extension].extension.as_ref();
            ext.check_endline(tick, &batch.commands)
                .map_err(|e| extension_error(ext.name(), e, tick).at_line(batch.line))?;
        }

        Ok(StagedTick {
            tick,
            inline,
            endline,
        })
    }

    /// Hand a staged tick's commands to their extensions. The registry must
    /// not have changed since [`Self::stage`].
    pub fn commit(&mut self, staged: StagedTick) -> Result<(), LoadError> {
        let tick = staged.tick;
        for batch in staged.inline {
            let ext = &mut self.extensions[batch.extension].extension;
            ext.on_deserialise_inline(tick, &batch.commands)
                .map_err(|e| extension_error(ext.name(), e, tick).at_line(batch.line))?;
        }
        for batch in staged.endline {
            let ext = &mut self.extensions[batch.extension].extension;
            ext.on_deserialise_endline(tick, &batch.commands)
                .map_err(|e| extension_error(ext.name(), e, tick).at_line(batch.line))?;
        }
        Ok(())
    }

    /// Stage against the current selection and commit straight away
    pub fn handle_on_deserialise(
        &mut self,
        tick: usize,
        commands: &TickCommands,
    ) -> Result<(), LoadError> {
        let staged = self.stage(tick, commands, &self.enabled_names())?;
        self.commit(staged)
    }
}

/// Commands found in one tick block, each list paired with its 1-based
/// line number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickCommands {
    /// One entry per comment line above the tick
    pub inline: Vec<(usize, Vec<FileCommand>)>,
    /// One entry per data line (0 = tick line)
    pub endline: Vec<(usize, Vec<FileCommand>)>,
}

impl TickCommands {
    pub fn is_empty(&self) -> bool {
        self.inline
            .iter()
            .chain(&self.endline)
            .all(|(_, commands)| commands.is_empty())
    }
}

/// Commands of one extension, with the line its first command came from
#[derive(Debug)]
struct Batch<T> {
    extension: usize,
    line: usize,
    commands: Vec<T>,
}

impl<T> Batch<T> {
    fn find_or_add(batches: &mut Vec<Batch<T>>, extension: usize, line: usize) -> &mut Batch<T> {
        let index = match batches.iter().position(|b| b.extension == extension) {
            Some(index) => index,
            None => {
                batches.push(Batch {
                    extension,
                    line,
                    commands: Vec::new(),
                });
                batches.len() - 1
            }
        };
        &mut batches[index]
    }
}

/// A tick's commands, routed and checked but not yet delivered
#[derive(Debug)]
pub struct StagedTick {
    tick: usize,
    inline: Vec<Batch<FileCommand>>,
    endline: Vec<Batch<Option<FileCommand>>>,
}

fn extension_error(name: &str, err: ExtensionError, tick: usize) -> LoadError {
    LoadError::new(LoadErrorKind::Extension {
        name: name.to_string(),
        message: err.0,
    })
    .at_tick(tick)
}

impl fmt::Debug for FileCommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCommandRegistry")
            .field("all", &self.all_names())
            .field("enabled", &self.enabled_names())
            .finish()
    }
}
