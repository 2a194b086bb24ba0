//! Structure descriptors and the field-sequence walk.
//!
//! ## Algorithm Overview
//!
//! Dropping a structure at a position:
//!
//! 1. Open a child scope chained to the caller's scope
//! 2. Walk the fields in order with a cursor starting at the position
//! 3. Push each produced annotation into the scope and advance the cursor
//!    by its length; fields producing nothing leave the cursor alone
//! 4. A switch marked as replacing its parent is dropped at the cursor and
//!    its annotation returned as the whole result
//! 5. Otherwise wrap the children in a group spanning position..cursor

use crate::annotation::Annotation;
use crate::catalog::Catalog;
use crate::context::DropContext;
use crate::error::{Error, Result};
use crate::field::{ArrayField, Field, ReferenceField, Selector, SimpleField, SwitchField};
use crate::options::Options;
use std::sync::Arc;
use tracing::{debug, trace};

/// A named, ordered sequence of fields
#[derive(Debug, Clone)]
pub struct StructureDescriptor {
    name: String,
    fields: Vec<Field>,
}

impl StructureDescriptor {
    /// Creates a descriptor from its fields
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Starts a definition
    pub fn builder(name: impl Into<String>) -> StructureBuilder {
        StructureBuilder::new(name)
    }

    /// Structure name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Drop this structure onto `data` at `position`.
    ///
    /// Structure names referenced by arrays, switches and references are
    /// resolved against `catalog` as they are reached.
    pub fn drop(&self, catalog: &Catalog, data: &[u8], position: usize) -> Result<Annotation> {
        debug!(
            "Dropping '{}' at {} over {} bytes",
            self.name,
            position,
            data.len()
        );
        let root = DropContext::root();
        self.drop_in(catalog, &root, data, position)
    }

    /// Drop this structure in a new scope under `context`
    pub fn drop_in(
        &self,
        catalog: &Catalog,
        context: &DropContext<'_>,
        data: &[u8],
        position: usize,
    ) -> Result<Annotation> {
        let mut scope = context.child();

        let limit = catalog.config().max_depth;
        if scope.depth() > limit {
            return Err(Error::DepthExceeded {
                limit,
                offset: position,
            });
        }

        let mut cursor = position;

        for field in &self.fields {
            if let Field::Switch(switch) = field {
                if switch.replaces_parent {
                    trace!("'{}' replaced by switch at {}", self.name, cursor);
                    return switch.drop(catalog, &scope, data, cursor);
                }
            }

            match field.drop(catalog, &scope, data, cursor)? {
                Some(annotation) => {
                    trace!(
                        "{}.{} @{}+{}",
                        self.name,
                        annotation.label(),
                        annotation.offset,
                        annotation.length
                    );
                    cursor += annotation.length;
                    scope.push(annotation);
                }
                None => trace!("{}: field produced nothing at {}", self.name, cursor),
            }
        }

        Ok(Annotation::group(
            position,
            cursor - position,
            &self.name,
            scope.into_annotations(),
        ))
    }
}

/// Accumulates field declarations into a [`StructureDescriptor`].
///
/// Declaration errors (such as an array without a size) are kept until
/// [`StructureBuilder::build`], which reports the first one.
///
/// # Example
///
/// ```
/// use strata_core::{Catalog, Options, StructureDescriptor};
///
/// let header = StructureDescriptor::builder("header")
///     .field("magic", "u32")
///     .field("version", "u8")
///     .array("flags", Options::new().with("size", 2usize).with("element_type", "u8"))
///     .build()?;
///
/// let annotation = header.drop(&Catalog::new(), &[1, 0, 0, 0, 2, 0xff, 0xfe], 0)?;
/// assert_eq!(annotation.length, 7);
/// # Ok::<(), strata_core::Error>(())
/// ```
#[derive(Debug)]
pub struct StructureBuilder {
    name: String,
    fields: Vec<Field>,
    error: Option<Error>,
}

impl StructureBuilder {
    /// Starts a definition named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            error: None,
        }
    }

    /// Declares a primitive field decoded by the interpreter `kind`
    pub fn field(self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.push(Field::Simple(SimpleField::new(name, kind)))
    }

    /// Declares a primitive field with interpreter options
    pub fn field_with(
        self,
        name: impl Into<String>,
        kind: impl Into<String>,
        options: Options,
    ) -> Self {
        self.push(Field::Simple(SimpleField::with_options(name, kind, options)))
    }

    /// Declares a field of unknown content (the null interpreter)
    pub fn unknown(self, name: impl Into<String>, options: Options) -> Self {
        self.push(Field::Simple(SimpleField::unknown(name, options)))
    }

    /// Declares an array from `size`, `element_type` and optional `start_index`
    pub fn array(mut self, name: impl Into<String>, options: Options) -> Self {
        match ArrayField::from_options(name, &options) {
            Ok(array) => self.push(Field::Array(array)),
            Err(e) => {
                self.error.get_or_insert(e);
                self
            }
        }
    }

    /// Declares a switch on the value of an earlier field
    pub fn switch(
        self,
        discriminant: impl Into<String>,
        replaces_parent: bool,
        selector: impl Into<Selector>,
    ) -> Self {
        self.push(Field::Switch(SwitchField::new(discriminant, replaces_parent, selector)))
    }

    /// Includes a registered structure by name, resolved when dropped
    pub fn structure(self, name: impl Into<String>, structure_name: impl Into<String>) -> Self {
        self.push(Field::Reference(ReferenceField::new(name, structure_name)))
    }

    /// Nests a structure in place
    pub fn nested(self, structure: impl Into<Arc<StructureDescriptor>>) -> Self {
        self.push(Field::Structure(structure.into()))
    }

    /// Appends any field
    pub fn push(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Finishes the definition
    pub fn build(self) -> Result<StructureDescriptor> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(StructureDescriptor::new(self.name, self.fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_builder_keeps_first_error() {
        let err = StructureDescriptor::builder("s")
            .array("a", Options::new())
            .array("b", Options::new().with("size", 1usize))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::MissingOption { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_builder_field_order() {
        let s = StructureDescriptor::builder("s")
            .field("a", "u8")
            .unknown("b", Options::new())
            .structure("c", "other")
            .switch("a", false, |_: &Value| "x".to_string())
            .build()
            .unwrap();

        let names: Vec<_> = s.fields().iter().map(Field::target_name).collect();
        assert_eq!(names, [Some("a"), Some("b"), Some("c"), None]);
    }

    #[test]
    fn test_depth_limit() {
        let mut catalog = Catalog::new();
        catalog.register(
            StructureDescriptor::builder("loop")
                .structure("again", "loop")
                .build()
                .unwrap(),
        );

        let err = catalog.drop("loop", &[], 0).unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { limit: 64, offset: 0 }));
    }
}
