//! Visitor trait for walking annotation trees.

use crate::annotation::Annotation;
use crate::value::Value;
use std::fmt::Result;

/// Callbacks for a depth-first walk over an [`Annotation`] tree.
///
/// Every method defaults to a no-op, so implementations only override
/// what they need.
///
/// # Example
///
/// ```
/// use strata_core::render::AnnotationVisitor;
/// use strata_core::{Annotation, Value};
///
/// #[derive(Default)]
/// struct Names(Vec<String>);
///
/// impl AnnotationVisitor for Names {
///     fn leaf(&mut self, leaf: &Annotation, _: &Value, _: usize) -> std::fmt::Result {
///         self.0.push(leaf.label());
///         Ok(())
///     }
/// }
///
/// let leaf = Annotation::leaf(0, 1, "a", Value::Unsigned(1));
/// let tree = Annotation::group(0, 1, "root", vec![leaf]);
/// let mut names = Names::default();
/// tree.walk(&mut names).unwrap();
/// assert_eq!(names.0, ["a"]);
/// ```
pub trait AnnotationVisitor {
    /// Called before the children of a structure or array
    fn enter_group(&mut self, group: &Annotation, depth: usize) -> Result {
        let _ = (group, depth);
        Ok(())
    }

    /// Called after the children of a structure or array
    fn leave_group(&mut self, group: &Annotation, depth: usize) -> Result {
        let _ = (group, depth);
        Ok(())
    }

    /// Called for every decoded primitive
    fn leaf(&mut self, annotation: &Annotation, value: &Value, depth: usize) -> Result {
        let _ = (annotation, value, depth);
        Ok(())
    }
}

/// A no-op visitor
pub struct NullVisitor;

impl AnnotationVisitor for NullVisitor {}

/// A visitor that collects statistics about an annotation tree
#[derive(Debug, Default)]
pub struct StatsVisitor {
    /// Number of structures and arrays
    pub group_count: usize,
    /// Number of decoded primitives
    pub leaf_count: usize,
    /// Deepest nesting level seen (root is 0)
    pub max_depth: usize,
    /// Bytes covered by leaves
    pub leaf_bytes: usize,
}

impl AnnotationVisitor for StatsVisitor {
    fn enter_group(&mut self, _group: &Annotation, depth: usize) -> Result {
        self.group_count += 1;
        self.max_depth = self.max_depth.max(depth);
        Ok(())
    }

    fn leaf(&mut self, annotation: &Annotation, _value: &Value, depth: usize) -> Result {
        self.leaf_count += 1;
        self.leaf_bytes += annotation.length;
        self.max_depth = self.max_depth.max(depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_visitor() {
        let tree = Annotation::leaf(0, 1, "a", Value::Null);
        assert!(tree.walk(&mut NullVisitor).is_ok());
    }

    #[test]
    fn test_stats_visitor() {
        let tree = Annotation::group(
            0,
            6,
            "root",
            vec![
                Annotation::leaf(0, 2, "a", Value::Unsigned(1)),
                Annotation::group(
                    2,
                    4,
                    "inner",
                    vec![Annotation::leaf(2, 4, "b", Value::Unsigned(2))],
                ),
            ],
        );

        let mut stats = StatsVisitor::default();
        tree.walk(&mut stats).unwrap();

        assert_eq!(stats.group_count, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.leaf_bytes, 6);
    }
}
