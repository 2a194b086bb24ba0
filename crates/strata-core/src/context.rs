//! Scope chain used while dropping a structure.
//!
//! Each field sequence being walked gets its own [`DropContext`], chained
//! to the context of the sequence that contains it. Annotations produced
//! by earlier siblings are pushed into the current context so later
//! fields can look them up by name. Lookups walk outward to the root;
//! descendants of a sibling are never visible except through an explicit
//! dotted path (`header.kind`).

use crate::annotation::Annotation;
use crate::value::Value;

/// One scope in the chain of a single drop
#[derive(Debug)]
pub struct DropContext<'p> {
    parent: Option<&'p DropContext<'p>>,
    annotations: Vec<Annotation>,
    depth: usize,
}

impl DropContext<'static> {
    /// Creates the root scope of a drop
    pub fn root() -> Self {
        Self {
            parent: None,
            annotations: Vec::new(),
            depth: 0,
        }
    }
}

impl<'p> DropContext<'p> {
    /// Creates an empty scope chained to this one
    pub fn child(&self) -> DropContext<'_> {
        DropContext {
            parent: Some(self),
            annotations: Vec::new(),
            depth: self.depth + 1,
        }
    }

    /// Number of scopes between this one and the root
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Makes an annotation visible to later siblings under its name
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Annotations pushed into this scope, in order
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Consumes the scope, returning its annotations
    pub fn into_annotations(self) -> Vec<Annotation> {
        self.annotations
    }

    /// Finds the nearest annotation named `name`, searching outward.
    ///
    /// Within one scope the most recently pushed annotation wins.
    pub fn lookup(&self, name: &str) -> Option<&Annotation> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(found) = current.annotations.iter().rev().find(|a| a.name == name) {
                return Some(found);
            }
            scope = current.parent;
        }
        None
    }

    /// Resolves a possibly dotted path to a decoded value.
    ///
    /// The first segment is looked up through the scope chain, the rest
    /// descend into that annotation's children. Returns `None` if any
    /// segment is missing or the path ends on a group.
    pub fn resolve_value(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut node = self.lookup(segments.next()?)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        node.value()
    }
}
