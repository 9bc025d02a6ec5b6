//! Metadata extensions
//!
//! Each registered extension owns one named block of `key:value` pairs in the
//! file header. All registered extensions take part in every save and load.

use std::any::{Any, TypeId};

use crate::error::{ExtensionError, LoadError, LoadErrorKind, RegistryError};

/// Ordered key/value pairs of one header block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    entries: Vec<(String, String)>,
}

impl MetadataBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A contributor of one header block
pub trait MetadataExtension: Any + Send {
    /// Block name, written as `### <name>`
    fn name(&self) -> &str;

    /// Produce the block to store in the header
    fn on_store(&self) -> MetadataBlock;

    /// Reject a block [`Self::on_load`] would refuse, without changing state
    fn check(&self, _block: &MetadataBlock) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Consume the block read from the header
    fn on_load(&mut self, block: &MetadataBlock) -> Result<(), ExtensionError>;

    /// Reset to defaults
    fn on_clear(&mut self);
}

struct Registered {
    type_id: TypeId,
    extension: Box<dyn MetadataExtension>,
}

/// Name-keyed, insertion-ordered set of metadata extensions
#[derive(Default)]
pub struct MetadataRegistry {
    extensions: Vec<Registered>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension. Names and concrete types must be unique.
    pub fn register<E: MetadataExtension>(&mut self, extension: E) -> Result<(), RegistryError> {
        let name = extension.name().to_string();
        if self.position(&name).is_some() {
            return Err(RegistryError::DuplicateName(name));
        }
        let type_id = TypeId::of::<E>();
        if self.extensions.iter().any(|r| r.type_id == type_id) {
            return Err(RegistryError::DuplicateInstance(name));
        }
        tracing::debug!(extension = %name, "metadata extension registered");
        self.extensions.push(Registered {
            type_id,
            extension: Box::new(extension),
        });
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<Box<dyn MetadataExtension>, RegistryError> {
        let pos = self
            .position(name)
            .ok_or_else(|| RegistryError::NotRegistered(name.to_string()))?;
        tracing::debug!(extension = %name, "metadata extension unregistered");
        Ok(self.extensions.remove(pos).extension)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.extensions
            .iter()
            .position(|r| r.extension.name() == name)
    }

    pub fn get<E: MetadataExtension>(&self) -> Option<&E> {
        self.extensions
            .iter()
            .find(|r| r.type_id == TypeId::of::<E>())
            .and_then(|r| (r.extension.as_ref() as &dyn Any).downcast_ref::<E>())
    }

    pub fn get_mut<E: MetadataExtension>(&mut self) -> Option<&mut E> {
        self.extensions
            .iter_mut()
            .find(|r| r.type_id == TypeId::of::<E>())
            .and_then(|r| (r.extension.as_mut() as &mut dyn Any).downcast_mut::<E>())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&dyn MetadataExtension> {
        self.position(name)
            .map(|pos| self.extensions[pos].extension.as_ref())
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|r| r.extension.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Collect every extension's block, in registration order
    pub fn handle_on_store(&self) -> Vec<(String, MetadataBlock)> {
        self.extensions
            .iter()
            .map(|r| (r.extension.name().to_string(), r.extension.on_store()))
            .collect()
    }

    /// Run every extension's check on its block ahead of
    /// [`Self::handle_on_load`]
    pub fn check_load(&self, blocks: &[(String, MetadataBlock)]) -> Result<(), LoadError> {
        for registered in &self.extensions {
            let ext = registered.extension.as_ref();
            if let Some((_, block)) = blocks.iter().find(|(name, _)| name == ext.name()) {
                ext.check(block).map_err(|e| rejected(ext.name(), e))?;
            }
        }
        Ok(())
    }

    /// Hand each block to the extension of the same name. Extensions without
    /// a block in the file are reset; blocks without an extension are skipped.
    pub fn handle_on_load(&mut self, blocks: &[(String, MetadataBlock)]) -> Result<(), LoadError> {
        for (name, _) in blocks {
            if self.position(name).is_none() {
                tracing::warn!(block = %name, "no metadata extension for header block, skipping");
            }
        }

        for registered in &mut self.extensions {
            let ext = &mut registered.extension;
            match blocks.iter().find(|(name, _)| name == ext.name()) {
                Some((_, block)) => ext.on_load(block).map_err(|e| rejected(ext.name(), e))?,
                None => ext.on_clear(),
            }
        }
        Ok(())
    }

    pub fn handle_on_clear(&mut self) {
        for registered in &mut self.extensions {
            registered.extension.on_clear();
        }
    }
}

fn rejected(name: &str, err: ExtensionError) -> LoadError {
    LoadError::new(LoadErrorKind::Extension {
        name: name.to_string(),
        message: err.0,
    })
}

impl std::fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("extensions", &self.names())
            .finish()
    }
}
