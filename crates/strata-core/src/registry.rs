//! Named structure registry.
//!
//! Structures are registered as their definitions complete and looked up by
//! name when a drop reaches an array element type, switch target or
//! reference. Because lookups happen at drop time, a structure may refer to
//! one registered after it.

use crate::structure::StructureDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps structure names to descriptors
#[derive(Debug, Clone, Default)]
pub struct StructureRegistry {
    structures: HashMap<String, Arc<StructureDescriptor>>,
}

impl StructureRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its own name.
    ///
    /// Re-registering a name replaces the earlier descriptor, which is returned.
    pub fn register(
        &mut self,
        structure: impl Into<Arc<StructureDescriptor>>,
    ) -> Option<Arc<StructureDescriptor>> {
        let structure = structure.into();
        let name = structure.name().to_string();
        let previous = self.structures.insert(name, structure);
        if let Some(previous) = &previous {
            debug!("Structure '{}' redefined", previous.name());
        }
        previous
    }

    /// Looks up a structure by name
    pub fn get(&self, name: &str) -> Option<&Arc<StructureDescriptor>> {
        self.structures.get(name)
    }

    /// Returns true if a structure is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.structures.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.structures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered structures
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, SimpleField};

    #[test]
    fn test_last_registration_wins() {
        let mut registry = StructureRegistry::new();
        let first = StructureDescriptor::new("s", vec![]);
        let second =
            StructureDescriptor::new("s", vec![Field::Simple(SimpleField::new("a", "u8"))]);

        assert!(registry.register(first).is_none());
        let replaced = registry.register(second).unwrap();

        assert!(replaced.fields().is_empty());
        assert_eq!(registry.get("s").unwrap().fields().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names() {
        let mut registry = StructureRegistry::new();
        assert!(registry.is_empty());
        registry.register(StructureDescriptor::new("b", vec![]));
        registry.register(StructureDescriptor::new("a", vec![]));

        assert_eq!(registry.names(), ["a", "b"]);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
    }
}
