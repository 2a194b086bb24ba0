//! Field variants of a structure definition.
//!
//! A [`Field`] is the unit of structural description. Dropping a field at
//! a position yields zero or one [`Annotation`]; the walk in
//! [`crate::structure`] advances its cursor by the annotation's length.

use crate::annotation::Annotation;
use crate::catalog::{Catalog, EmptyFieldPolicy};
use crate::context::DropContext;
use crate::error::{Error, Result};
use crate::interpreter::NULL_INTERPRETER;
use crate::options::Options;
use crate::structure::StructureDescriptor;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A field in a structure definition
#[derive(Debug, Clone)]
pub enum Field {
    /// A primitive decoded by a named interpreter
    Simple(SimpleField),
    /// A repeated element
    Array(ArrayField),
    /// A structure chosen by the value of an earlier field
    Switch(SwitchField),
    /// A structure nested in place
    Structure(Arc<StructureDescriptor>),
    /// A structure referenced by registry name, resolved at drop time
    Reference(ReferenceField),
}

impl Field {
    /// Name the produced annotation is registered under, if known before dropping
    pub fn target_name(&self) -> Option<&str> {
        match self {
            Field::Simple(f) => Some(&f.target_name),
            Field::Array(f) => Some(&f.target_name),
            Field::Switch(_) => None,
            Field::Structure(s) => Some(s.name()),
            Field::Reference(f) => Some(&f.target_name),
        }
    }

    /// Drop this field at `position` within `context`
    pub fn drop(
        &self,
        catalog: &Catalog,
        context: &DropContext<'_>,
        data: &[u8],
        position: usize,
    ) -> Result<Option<Annotation>> {
        match self {
            Field::Simple(f) => f.drop(catalog, data, position),
            Field::Array(f) => f.drop(catalog, context, data, position).map(Some),
            Field::Switch(f) => f.drop(catalog, context, data, position).map(Some),
            Field::Structure(s) => s.drop_in(catalog, context, data, position).map(Some),
            Field::Reference(f) => f.drop(catalog, context, data, position).map(Some),
        }
    }
}

/// A leaf field decoded by a named interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleField {
    /// Annotation name
    pub target_name: String,
    /// Interpreter kind in the catalog's interpreter registry
    pub interpreter_name: String,
    /// Options passed to the interpreter kind
    pub options: Options,
}

impl SimpleField {
    /// Creates a field with no options
    pub fn new(target_name: impl Into<String>, interpreter_name: impl Into<String>) -> Self {
        Self::with_options(target_name, interpreter_name, Options::new())
    }

    /// Creates a field with interpreter options
    pub fn with_options(
        target_name: impl Into<String>,
        interpreter_name: impl Into<String>,
        options: Options,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            interpreter_name: interpreter_name.into(),
            options,
        }
    }

    /// Creates a field using the null interpreter
    pub fn unknown(target_name: impl Into<String>, options: Options) -> Self {
        Self::with_options(target_name, NULL_INTERPRETER, options)
    }

    /// Decode one value at `position`, applying the empty-field policy
    pub fn drop(
        &self,
        catalog: &Catalog,
        data: &[u8],
        position: usize,
    ) -> Result<Option<Annotation>> {
        let annotation = self.decode(catalog, data, position)?;

        if annotation.length == 0
            && annotation.value().map_or(false, Value::is_null)
            && catalog.config().empty_fields == EmptyFieldPolicy::Omit
        {
            trace!("Omitting empty field '{}' at {}", self.target_name, position);
            return Ok(None);
        }

        Ok(Some(annotation))
    }

    /// Decode one value at `position`.
    ///
    /// With the `peek` option set the value is reported with length 0, so
    /// the next field starts where this one did.
    pub fn decode(&self, catalog: &Catalog, data: &[u8], position: usize) -> Result<Annotation> {
        let info = catalog
            .interpreters()
            .get(&self.interpreter_name)
            .ok_or_else(|| Error::unknown_interpreter(&self.interpreter_name, position))?;

        let peek = self
            .options
            .get_bool(&self.target_name, "peek")?
            .unwrap_or(false);
        let decoded = info
            .create(&self.target_name, &self.options)?
            .decode(data, position)?;
        let length = if peek { 0 } else { decoded.length };

        Ok(Annotation::leaf(
            position,
            length,
            &self.target_name,
            decoded.value,
        ))
    }
}

/// Repeats an element field a fixed number of times
#[derive(Debug, Clone)]
pub struct ArrayField {
    /// Annotation name of the array and of each element
    pub target_name: String,
    /// Index of the first element
    pub start_index: u64,
    /// Number of elements
    pub count: u64,
    /// The element definition
    pub element: Box<Field>,
}

impl ArrayField {
    /// Creates an array of `count` elements of the named type.
    ///
    /// The type name is resolved at drop time: a registered structure of
    /// that name wins, otherwise it names an interpreter.
    pub fn new(
        target_name: impl Into<String>,
        count: u64,
        element_type: impl Into<String>,
    ) -> Self {
        Self::of(target_name, count, Field::Simple(SimpleField::new("", element_type)))
    }

    /// Creates an array of `count` copies of an explicit element field
    pub fn of(target_name: impl Into<String>, count: u64, element: Field) -> Self {
        Self {
            target_name: target_name.into(),
            start_index: 0,
            count,
            element: Box::new(element),
        }
    }

    /// Builds an array from `size`, `element_type` and optional `start_index` options
    pub fn from_options(target_name: impl Into<String>, options: &Options) -> Result<Self> {
        let target_name = target_name.into();
        let count = options.require_u64(&target_name, "size")?;
        let element_type = options.require_str(&target_name, "element_type")?.to_string();
        let start_index = options.get_u64(&target_name, "start_index")?.unwrap_or(0);

        Ok(Self::new(target_name, count, element_type).start_index(start_index))
    }

    /// Sets the index of the first element
    pub fn start_index(mut self, index: u64) -> Self {
        self.start_index = index;
        self
    }

    /// Drop every element in turn, starting at `position`
    pub fn drop(
        &self,
        catalog: &Catalog,
        context: &DropContext<'_>,
        data: &[u8],
        position: usize,
    ) -> Result<Annotation> {
        let structure = self.element_structure(catalog, position)?;

        let mut children = Vec::new();
        let mut cursor = position;

        for index in self.start_index..self.start_index.saturating_add(self.count) {
            // elements are never omitted, so indices stay contiguous
            let element = match (structure, self.element.as_ref()) {
                (Some(structure), _) => Some(structure.drop_in(catalog, context, data, cursor)?),
                (None, Field::Simple(simple)) => Some(simple.decode(catalog, data, cursor)?),
                (None, element) => Field::drop(element, catalog, context, data, cursor)?,
            };

            if let Some(element) = element {
                cursor += element.length;
                children.push(element.into_element(&self.target_name, index));
            }
        }

        trace!(
            "Array '{}' of {} elements at {}..{}",
            self.target_name,
            self.count,
            position,
            cursor
        );

        Ok(Annotation::group(
            position,
            cursor - position,
            &self.target_name,
            children,
        ))
    }

    /// A bare type name with no options may refer to a registered structure
    fn element_structure<'c>(
        &self,
        catalog: &'c Catalog,
        position: usize,
    ) -> Result<Option<&'c Arc<StructureDescriptor>>> {
        let Field::Simple(element) = self.element.as_ref() else {
            return Ok(None);
        };
        if !element.options.is_empty() {
            return Ok(None);
        }

        if let Some(structure) = catalog.structures().get(&element.interpreter_name) {
            return Ok(Some(structure));
        }
        if !catalog.interpreters().contains(&element.interpreter_name) {
            return Err(Error::unresolved_structure(&element.interpreter_name, position));
        }
        Ok(None)
    }
}

/// Maps a discriminant value to a structure name
#[derive(Clone)]
pub struct Selector(Arc<dyn Fn(&Value) -> String + Send + Sync>);

impl Selector {
    /// Wraps a selection function
    pub fn new(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Selects from a fixed table, falling back to `fallback` for unlisted values.
    ///
    /// Integer keys match by numeric value, whatever the signedness of the
    /// key or of the decoded discriminant.
    pub fn table<V, S>(
        entries: impl IntoIterator<Item = (V, S)>,
        fallback: impl Into<String>,
    ) -> Self
    where
        V: Into<Value>,
        S: Into<String>,
    {
        let table: HashMap<Value, String> = entries
            .into_iter()
            .map(|(v, s)| (table_key(v.into()), s.into()))
            .collect();
        let fallback = fallback.into();
        Self::new(move |value| {
            let found = match *value {
                Value::Signed(v) if v >= 0 => table.get(&Value::Unsigned(v as u64)),
                _ => table.get(value),
            };
            found.unwrap_or(&fallback).clone()
        })
    }

    /// Returns the structure name for `value`
    pub fn select(&self, value: &Value) -> String {
        (self.0)(value)
    }
}

/// Non-negative integers are keyed as unsigned
fn table_key(value: Value) -> Value {
    match value {
        Value::Signed(v) if v >= 0 => Value::Unsigned(v as u64),
        other => other,
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selector(..)")
    }
}

impl<F> From<F> for Selector
where
    F: Fn(&Value) -> String + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Drops a structure chosen by the value of an earlier field
#[derive(Debug, Clone)]
pub struct SwitchField {
    /// Name (or dotted path) of the field whose value selects the structure
    pub discriminant: String,
    /// Whether the selected structure replaces the enclosing one in the output
    pub replaces_parent: bool,
    /// Value to structure name mapping
    pub selector: Selector,
}

impl SwitchField {
    /// Creates a switch
    pub fn new(
        discriminant: impl Into<String>,
        replaces_parent: bool,
        selector: impl Into<Selector>,
    ) -> Self {
        Self {
            discriminant: discriminant.into(),
            replaces_parent,
            selector: selector.into(),
        }
    }

    /// Resolve the selected structure and drop it at `position`
    pub fn drop(
        &self,
        catalog: &Catalog,
        context: &DropContext<'_>,
        data: &[u8],
        position: usize,
    ) -> Result<Annotation> {
        let value = context
            .resolve_value(&self.discriminant)
            .ok_or_else(|| Error::unresolved_reference(&self.discriminant, position))?;

        let name = self.selector.select(value);
        trace!(
            "Switch on '{}' = {} selected '{}' at {}",
            self.discriminant,
            value,
            name,
            position
        );

        let structure = catalog
            .structures()
            .get(&name)
            .ok_or_else(|| Error::unresolved_structure(&name, position))?;

        structure.drop_in(catalog, context, data, position)
    }
}

/// A structure included by registry name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceField {
    /// Annotation name of the included structure
    pub target_name: String,
    /// Registry name of the structure
    pub structure_name: String,
}

impl ReferenceField {
    /// Creates a reference
    pub fn new(target_name: impl Into<String>, structure_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            structure_name: structure_name.into(),
        }
    }

    /// Resolve the structure and drop it, renamed to the target name
    pub fn drop(
        &self,
        catalog: &Catalog,
        context: &DropContext<'_>,
        data: &[u8],
        position: usize,
    ) -> Result<Annotation> {
        let structure = catalog
            .structures()
            .get(&self.structure_name)
            .ok_or_else(|| Error::unresolved_structure(&self.structure_name, position))?;

        let mut annotation = structure.drop_in(catalog, context, data, position)?;
        annotation.name = self.target_name.clone();
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_from_options() {
        let options = Options::new()
            .with("size", 3usize)
            .with("element_type", "entry")
            .with("start_index", 1usize);
        let array = ArrayField::from_options("entries", &options).unwrap();

        assert_eq!(array.count, 3);
        assert_eq!(array.start_index, 1);
        assert!(matches!(
            array.element.as_ref(),
            Field::Simple(SimpleField { interpreter_name, .. }) if interpreter_name == "entry"
        ));
    }

    #[test]
    fn test_array_missing_options() {
        let options = Options::new().with("size", 3usize);
        let err = ArrayField::from_options("entries", &options).unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref option, .. } if option == "element_type"));

        let options = Options::new().with("element_type", "u8");
        let err = ArrayField::from_options("entries", &options).unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref option, .. } if option == "size"));
    }

    #[test]
    fn test_selector_table() {
        let selector = Selector::table([(1u64, "one"), (2u64, "two")], "other");
        assert_eq!(selector.select(&Value::Unsigned(2)), "two");
        assert_eq!(selector.select(&Value::Unsigned(9)), "other");
        assert_eq!(selector.select(&Value::from("x")), "other");
    }

    #[test]
    fn test_selector_table_ignores_signedness() {
        let selector = Selector::table([(1u64, "one")], "other");
        assert_eq!(selector.select(&Value::Signed(1)), "one");
        assert_eq!(selector.select(&Value::Signed(-1)), "other");

        let selector = Selector::table([(1i64, "one"), (-2i64, "minus_two")], "other");
        assert_eq!(selector.select(&Value::Unsigned(1)), "one");
        assert_eq!(selector.select(&Value::Signed(1)), "one");
        assert_eq!(selector.select(&Value::Signed(-2)), "minus_two");
    }

    #[test]
    fn test_simple_field_peek() {
        let field = SimpleField::with_options(
            "magic",
            "ascii",
            Options::new().with("length", 2usize).with("peek", true),
        );
        let annotation = field.decode(&Catalog::new(), b"BM..", 0).unwrap();

        assert_eq!(annotation.length, 0);
        assert_eq!(annotation.value(), Some(&Value::from("BM")));
    }

    #[test]
    fn test_simple_field_unknown_interpreter() {
        let catalog = Catalog::new();
        let err = SimpleField::new("x", "float128")
            .drop(&catalog, &[0; 16], 3)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownInterpreter { offset: 3, .. }));
    }

    #[test]
    fn test_simple_field_empty_policy() {
        let data = [0u8; 4];
        let field = SimpleField::unknown("pad", Options::new());

        let kept = field.drop(&Catalog::new(), &data, 2).unwrap();
        assert_eq!(kept, Some(Annotation::leaf(2, 0, "pad", Value::Null)));

        let catalog = Catalog::new().with_config(
            crate::catalog::DropConfig::new().empty_fields(EmptyFieldPolicy::Omit),
        );
        assert_eq!(field.drop(&catalog, &data, 2).unwrap(), None);
    }

    #[test]
    fn test_target_name() {
        assert_eq!(Field::Simple(SimpleField::new("a", "u8")).target_name(), Some("a"));
        let switch = SwitchField::new("a", false, |_: &Value| "x".to_string());
        assert_eq!(Field::Switch(switch).target_name(), None);
    }
}
