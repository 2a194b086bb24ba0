//! The shared state a drop runs against.
//!
//! A [`Catalog`] bundles the structure registry, the interpreter registry
//! and the [`DropConfig`]. Definitions are loaded through `&mut Catalog`;
//! drops only need `&Catalog`, so registration is finished before any drop
//! can borrow it.

use crate::annotation::Annotation;
use crate::error::{Error, Result};
use crate::interpreter::InterpreterRegistry;
use crate::registry::StructureRegistry;
use crate::structure::{StructureBuilder, StructureDescriptor};
use std::path::Path;
use std::sync::Arc;

/// What to do with a null field that consumed no bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyFieldPolicy {
    /// Emit a zero-length annotation
    #[default]
    Keep,
    /// Emit nothing
    Omit,
}

/// Configuration for dropping structures
#[derive(Debug, Clone)]
pub struct DropConfig {
    /// Handling of zero-length null fields
    pub empty_fields: EmptyFieldPolicy,
    /// Maximum structure nesting depth
    pub max_depth: usize,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            empty_fields: EmptyFieldPolicy::Keep,
            max_depth: 64,
        }
    }
}

impl DropConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handling of zero-length null fields
    pub fn empty_fields(mut self, policy: EmptyFieldPolicy) -> Self {
        self.empty_fields = policy;
        self
    }

    /// Sets the maximum structure nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Structures, interpreters and configuration for drops
#[derive(Debug, Clone)]
pub struct Catalog {
    structures: StructureRegistry,
    interpreters: InterpreterRegistry,
    config: DropConfig,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Creates a catalog with the built-in interpreters and no structures
    pub fn new() -> Self {
        Self::with_registries(StructureRegistry::new(), InterpreterRegistry::with_primitives())
    }

    /// Creates a catalog from existing registries
    pub fn with_registries(
        structures: StructureRegistry,
        interpreters: InterpreterRegistry,
    ) -> Self {
        Self {
            structures,
            interpreters,
            config: DropConfig::default(),
        }
    }

    /// Replaces the configuration
    pub fn with_config(mut self, config: DropConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a definition and registers it under its name
    pub fn define(&mut self, builder: StructureBuilder) -> Result<Arc<StructureDescriptor>> {
        let structure = Arc::new(builder.build()?);
        self.structures.register(structure.clone());
        Ok(structure)
    }

    /// Registers a descriptor, returning the one it replaced
    pub fn register(
        &mut self,
        structure: impl Into<Arc<StructureDescriptor>>,
    ) -> Option<Arc<StructureDescriptor>> {
        self.structures.register(structure)
    }

    /// Drops the structure registered as `name` at `position`
    pub fn drop(&self, name: &str, data: &[u8], position: usize) -> Result<Annotation> {
        let structure = self
            .structures
            .get(name)
            .ok_or_else(|| Error::unresolved_structure(name, position))?;
        StructureDescriptor::drop(structure, self, data, position)
    }

    /// Reads a file and drops the structure registered as `name` at `position`
    pub fn drop_file(
        &self,
        name: &str,
        path: impl AsRef<Path>,
        position: usize,
    ) -> Result<Annotation> {
        let data = read_file(path)?;
        self.drop(name, &data, position)
    }

    /// The structure registry
    pub fn structures(&self) -> &StructureRegistry {
        &self.structures
    }

    /// The interpreter registry
    pub fn interpreters(&self) -> &InterpreterRegistry {
        &self.interpreters
    }

    /// Mutable access to the interpreter registry, for custom kinds
    pub fn interpreters_mut(&mut self) -> &mut InterpreterRegistry {
        &mut self.interpreters
    }

    /// The drop configuration
    pub fn config(&self) -> &DropConfig {
        &self.config
    }
}

/// Read a whole file for dropping
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| Error::file_read(path, e))
}
