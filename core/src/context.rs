//! Shared registries and settings
//!
//! One [`TasContext`] is built at startup and handed to every component that
//! reads or writes TAS data. Dropping it (or calling [`TasContext::teardown`])
//! is the single shutdown path for all extensions.

use crate::config::TasConfig;
use crate::error::RegistryError;
use crate::extensions::{
    Credits, DesyncMonitorExtension, FileCommandRegistry, LabelExtension, MetadataRegistry,
    OptionsExtension, StartPosition,
};
use crate::format::FlavorRegistry;

#[derive(Debug)]
pub struct TasContext {
    pub config: TasConfig,
    pub flavors: FlavorRegistry,
    pub metadata: MetadataRegistry,
    pub file_commands: FileCommandRegistry,
}

impl Default for TasContext {
    fn default() -> Self {
        Self::new(TasConfig::default())
    }
}

fn log_registration(result: Result<(), RegistryError>) {
    if let Err(e) = result {
        tracing::error!("built-in extension not registered: {}", e);
    }
}

impl TasContext {
    /// Context with the built-in flavors and extensions. The file-command
    /// extensions named in the config are enabled.
    pub fn new(config: TasConfig) -> Self {
        let mut ctx = Self::empty(config);

        log_registration(ctx.metadata.register(Credits::new()));
        log_registration(ctx.metadata.register(StartPosition::new()));

        log_registration(
            ctx.file_commands
                .register(DesyncMonitorExtension::new(ctx.config.desync_tolerance)),
        );
        log_registration(ctx.file_commands.register(LabelExtension::new()));
        log_registration(ctx.file_commands.register(OptionsExtension::new()));

        ctx.apply_config();
        ctx
    }

    /// Context with the built-in flavors and no extensions
    pub fn empty(config: TasConfig) -> Self {
        Self {
            config,
            flavors: FlavorRegistry::with_builtins(),
            metadata: MetadataRegistry::new(),
            file_commands: FileCommandRegistry::new(),
        }
    }

    /// Enable exactly the file-command extensions listed in the config
    pub fn apply_config(&mut self) {
        let unknown = self
            .file_commands
            .set_enabled_names(&self.config.enabled_file_commands);
        for name in unknown {
            tracing::warn!(extension = %name, "configured file command extension is not registered");
        }
    }

    /// Reset every extension and disable all file commands
    pub fn teardown(&mut self) {
        self.file_commands.handle_on_clear();
        self.file_commands.set_enabled_names::<&str>(&[]);
        self.metadata.handle_on_clear();
        tracing::debug!("context torn down");
    }
}

impl Drop for TasContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::BUILTIN_FILE_COMMANDS;

    #[test]
    fn test_builtins_registered_and_enabled() {
        let ctx = TasContext::default();
        assert_eq!(ctx.metadata.names(), vec!["Credits", "StartPosition"]);
        assert_eq!(ctx.file_commands.all_names(), BUILTIN_FILE_COMMANDS.to_vec());
        assert_eq!(ctx.file_commands.enabled_names(), BUILTIN_FILE_COMMANDS.to_vec());
        assert_eq!(ctx.flavors.names(), vec!["beta1"]);
    }

    #[test]
    fn test_config_selects_enabled_set() {
        let config = TasConfig {
            enabled_file_commands: vec!["label@v1".into(), "ghost@v1".into()],
            ..TasConfig::default()
        };
        let ctx = TasContext::new(config);
        assert_eq!(ctx.file_commands.enabled_names(), vec!["label@v1"]);
    }

    #[test]
    fn test_teardown() {
        let mut ctx = TasContext::default();
        ctx.metadata.get_mut::<Credits>().unwrap().add_rerecord();
        ctx.teardown();
        assert_eq!(ctx.metadata.get::<Credits>().unwrap().rerecords, 0);
        assert!(ctx.file_commands.enabled_names().is_empty());
    }
}
