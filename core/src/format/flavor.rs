//! File flavors
//!
//! A flavor is a named dialect of the text format. The default methods of
//! [`Flavor`] implement the whole current grammar; a new dialect overrides
//! only what it changes.

use std::sync::Arc;

use super::fields;
use crate::error::{LoadErrorKind, RegistryError};
use crate::input::{CameraState, KeyboardState, MouseState};

pub const HEADER_START: &str = "################################################# TASfile ###";
pub const HEADER_END: &str = "##################################################################";

pub trait Flavor: Send + Sync {
    /// Name written on the `Flavor:` line
    fn name(&self) -> &str;

    fn header_start(&self) -> &str {
        HEADER_START
    }

    fn header_end(&self) -> &str {
        HEADER_END
    }

    fn serialise_keyboard(&self, state: &KeyboardState) -> String {
        fields::render_keyboard(state)
    }

    fn serialise_mouse(&self, state: &MouseState) -> String {
        fields::render_mouse(state)
    }

    fn serialise_camera(
        &self,
        state: &CameraState,
        previous: Option<&CameraState>,
        relative: bool,
    ) -> String {
        fields::render_camera(state, previous, relative)
    }

    fn deserialise_keyboard(&self, field: &str) -> Result<KeyboardState, LoadErrorKind> {
        fields::parse_keyboard(field)
    }

    fn deserialise_mouse(&self, field: &str) -> Result<MouseState, LoadErrorKind> {
        fields::parse_mouse(field)
    }

    fn deserialise_camera(
        &self,
        field: &str,
        previous: &CameraState,
    ) -> Result<CameraState, LoadErrorKind> {
        fields::parse_camera(field, previous)
    }
}

/// The current format
#[derive(Debug, Default, Clone, Copy)]
pub struct Beta1Flavor;

impl Flavor for Beta1Flavor {
    fn name(&self) -> &str {
        "beta1"
    }
}

/// Insertion-ordered set of flavors keyed by name
#[derive(Default, Clone)]
pub struct FlavorRegistry {
    flavors: Vec<Arc<dyn Flavor>>,
}

impl FlavorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in flavors
    pub fn with_builtins() -> Self {
        Self {
            flavors: vec![Arc::new(Beta1Flavor)],
        }
    }

    pub fn register(&mut self, flavor: impl Flavor + 'static) -> Result<(), RegistryError> {
        if self.get(flavor.name()).is_some() {
            return Err(RegistryError::DuplicateName(flavor.name().to_string()));
        }
        tracing::debug!(flavor = flavor.name(), "flavor registered");
        self.flavors.push(Arc::new(flavor));
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<(), RegistryError> {
        let pos = self
            .flavors
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        self.flavors.remove(pos);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Flavor>> {
        self.flavors.iter().find(|f| f.name() == name).cloned()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.flavors.iter().map(|f| f.name().to_string()).collect()
    }
}

impl std::fmt::Debug for FlavorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
