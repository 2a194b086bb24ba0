//! Text renderings of annotation trees.
//!
//! [`TreeRenderer`] writes one indented line per annotation,
//! [`FlatRenderer`] writes one line per decoded primitive with its full
//! dotted path. Both are [`AnnotationVisitor`]s, so custom output formats
//! plug in the same way.

mod visitor;

use crate::annotation::Annotation;
use crate::value::Value;
use std::fmt::{Result, Write};

pub use visitor::{AnnotationVisitor, NullVisitor, StatsVisitor};

/// Renders an indented tree
#[derive(Debug)]
pub struct TreeRenderer<W: Write> {
    writer: W,
    indent_str: String,
}

impl<W: Write> TreeRenderer<W> {
    /// Creates a renderer indenting with two spaces
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            indent_str: "  ".to_string(),
        }
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn indent(&mut self, depth: usize) -> Result {
        for _ in 0..depth {
            self.writer.write_str(&self.indent_str)?;
        }
        Ok(())
    }
}

impl<W: Write> AnnotationVisitor for TreeRenderer<W> {
    fn enter_group(&mut self, group: &Annotation, depth: usize) -> Result {
        self.indent(depth)?;
        writeln!(
            self.writer,
            "{} @0x{:x}+{}",
            group.label(),
            group.offset,
            group.length
        )
    }

    fn leaf(&mut self, annotation: &Annotation, value: &Value, depth: usize) -> Result {
        self.indent(depth)?;
        writeln!(
            self.writer,
            "{} @0x{:x}+{} = {}",
            annotation.label(),
            annotation.offset,
            annotation.length,
            value
        )
    }
}

/// Renders one `path.to.field<TAB>offset<TAB>length<TAB>value` line per primitive
#[derive(Debug)]
pub struct FlatRenderer<W: Write> {
    writer: W,
    path: Vec<String>,
}

impl<W: Write> FlatRenderer<W> {
    /// Creates a flat renderer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            path: Vec::new(),
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AnnotationVisitor for FlatRenderer<W> {
    fn enter_group(&mut self, group: &Annotation, _depth: usize) -> Result {
        self.path.push(group.label());
        Ok(())
    }

    fn leave_group(&mut self, _group: &Annotation, _depth: usize) -> Result {
        self.path.pop();
        Ok(())
    }

    fn leaf(&mut self, annotation: &Annotation, value: &Value, _depth: usize) -> Result {
        for segment in &self.path {
            write!(self.writer, "{}.", segment)?;
        }
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}",
            annotation.label(),
            annotation.offset,
            annotation.length,
            value
        )
    }
}

/// Renders `annotation` as an indented tree
pub fn render_tree(annotation: &Annotation) -> String {
    let mut renderer = TreeRenderer::new(String::new());
    // writing into a String cannot fail
    let _ = annotation.walk(&mut renderer);
    renderer.into_inner()
}

/// Renders `annotation` as flat path lines
pub fn render_flat(annotation: &Annotation) -> String {
    let mut renderer = FlatRenderer::new(String::new());
    // writing into a String cannot fail
    let _ = annotation.walk(&mut renderer);
    renderer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Annotation {
        Annotation::group(
            0,
            5,
            "header",
            vec![
                Annotation::leaf(0, 4, "magic", Value::Unsigned(0x11)),
                Annotation::leaf(4, 1, "version", Value::Unsigned(2)).into_element("v", 0),
            ],
        )
    }

    #[test]
    fn test_render_tree() {
        assert_eq!(
            render_tree(&sample()),
            "header @0x0+5\n  magic @0x0+4 = 17\n  v[0] @0x4+1 = 2\n"
        );
    }

    #[test]
    fn test_render_tree_custom_indent() {
        let mut renderer = TreeRenderer::new(String::new()).indent_str("\t");
        sample().walk(&mut renderer).unwrap();
        assert!(renderer.into_inner().contains("\tmagic"));
    }

    #[test]
    fn test_render_flat() {
        assert_eq!(
            render_flat(&sample()),
            "header.magic\t0\t4\t17\nheader.v[0]\t4\t1\t2\n"
        );
    }
}
