//! Annotation trees produced by dropping a structure onto bytes.
//!
//! An [`Annotation`] labels a span of bytes. Leaves carry the decoded
//! [`Value`]; groups (structures and arrays) carry their children in
//! offset order.

use crate::render::AnnotationVisitor;
use crate::value::Value;
use std::fmt;
use std::ops::Range;

/// What an annotation holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A decoded primitive value
    Value(Value),
    /// Child annotations in offset order
    Group(Vec<Annotation>),
}

/// A labeled span of bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Start of the span
    pub offset: usize,
    /// Length of the span in bytes
    pub length: usize,
    /// Field or structure name
    pub name: String,
    /// Element index when this annotation is an array element
    pub index: Option<u64>,
    /// Value or children
    pub payload: Payload,
}

impl Annotation {
    /// Creates a leaf annotation
    pub fn leaf(offset: usize, length: usize, name: impl Into<String>, value: Value) -> Self {
        Self {
            offset,
            length,
            name: name.into(),
            index: None,
            payload: Payload::Value(value),
        }
    }

    /// Creates a group annotation
    pub fn group(
        offset: usize,
        length: usize,
        name: impl Into<String>,
        children: Vec<Annotation>,
    ) -> Self {
        Self {
            offset,
            length,
            name: name.into(),
            index: None,
            payload: Payload::Group(children),
        }
    }

    /// Returns the annotation relabeled as element `index` of an array named `name`
    pub fn into_element(mut self, name: &str, index: u64) -> Self {
        self.name = name.to_string();
        self.index = Some(index);
        self
    }

    /// One past the last byte covered
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Byte range covered
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Returns true if `position` falls inside this annotation
    pub fn contains(&self, position: usize) -> bool {
        self.range().contains(&position)
    }

    /// Display label: the name, or `name[index]` for array elements
    pub fn label(&self) -> String {
        match self.index {
            Some(index) => format!("{}[{}]", self.name, index),
            None => self.name.clone(),
        }
    }

    /// Returns true for structures and arrays
    pub fn is_group(&self) -> bool {
        matches!(self.payload, Payload::Group(_))
    }

    /// Child annotations; empty for leaves
    pub fn children(&self) -> &[Annotation] {
        match &self.payload {
            Payload::Group(children) => children,
            Payload::Value(_) => &[],
        }
    }

    /// Decoded value; `None` for groups
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Value(value) => Some(value),
            Payload::Group(_) => None,
        }
    }

    /// First direct child named `name`
    pub fn child(&self, name: &str) -> Option<&Annotation> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Chain of annotations from this one down to the deepest containing `position`.
    ///
    /// Empty if this annotation does not contain `position`.
    pub fn path_at(&self, position: usize) -> Vec<&Annotation> {
        let mut path = Vec::new();
        let mut node = self;

        if !node.contains(position) {
            return path;
        }

        loop {
            path.push(node);
            // children are sorted and never overlap
            let next = node
                .children()
                .binary_search_by(|c| {
                    if c.end() <= position {
                        std::cmp::Ordering::Less
                    } else if c.offset > position {
                        std::cmp::Ordering::Greater
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .ok()
                .map(|i| &node.children()[i]);

            match next {
                Some(child) => node = child,
                None => return path,
            }
        }
    }

    /// Walk the tree depth-first, calling the visitor for every node
    pub fn walk<V: AnnotationVisitor + ?Sized>(&self, visitor: &mut V) -> fmt::Result {
        self.walk_at(visitor, 0)
    }

    fn walk_at<V: AnnotationVisitor + ?Sized>(&self, visitor: &mut V, depth: usize) -> fmt::Result {
        match &self.payload {
            Payload::Value(value) => visitor.leaf(self, value, depth),
            Payload::Group(children) => {
                visitor.enter_group(self, depth)?;
                for child in children {
                    child.walk_at(visitor, depth + 1)?;
                }
                visitor.leave_group(self, depth)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Annotation {
        Annotation::group(
            0,
            5,
            "header",
            vec![
                Annotation::leaf(0, 4, "magic", Value::Unsigned(1)),
                Annotation::leaf(4, 0, "pad", Value::Null),
                Annotation::leaf(4, 1, "version", Value::Unsigned(2)),
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let h = header();
        assert!(h.is_group());
        assert_eq!(h.end(), 5);
        assert_eq!(h.children().len(), 3);
        assert_eq!(h.child("version").unwrap().value(), Some(&Value::Unsigned(2)));
        assert!(h.child("missing").is_none());
        assert!(h.value().is_none());
    }

    #[test]
    fn test_label() {
        let a = Annotation::leaf(0, 1, "x", Value::Null).into_element("entries", 3);
        assert_eq!(a.label(), "entries[3]");
        assert_eq!(header().label(), "header");
    }

    #[test]
    fn test_path_at() {
        let h = header();

        let path: Vec<_> = h.path_at(2).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(path, ["header", "magic"]);

        let path: Vec<_> = h.path_at(4).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(path, ["header", "version"]);

        assert!(h.path_at(5).is_empty());
    }
}
