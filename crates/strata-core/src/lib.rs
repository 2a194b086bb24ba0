//! # strata-core
//!
//! A library for describing binary structures declaratively and dropping
//! them onto byte buffers to produce trees of labeled spans.
//!
//! This crate provides the core functionality for:
//! - Defining structures as ordered fields, arrays and value-driven switches
//! - Resolving structures by name at drop time (forward references)
//! - Decoding primitive values through named interpreters
//! - Producing and querying [`Annotation`] trees
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`structure`]: Structure descriptors, the definition builder and the drop walk
//! - [`field`]: Simple, array, switch and reference fields
//! - [`context`]: Scope chain for sibling lookups during a drop
//! - [`registry`]: Named structure registry
//! - [`catalog`]: Shared drop state and configuration
//! - [`interpreter`]: Primitive value interpreters
//! - [`annotation`]: The produced annotation tree
//! - [`render`]: Tree walking and text output
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use strata_core::{Catalog, Options, Selector, StructureDescriptor};
//!
//! let mut catalog = Catalog::new();
//!
//! // Element type registered after the structure that uses it
//! catalog.define(
//!     StructureDescriptor::builder("table")
//!         .field("count", "u8")
//!         .array("entries", Options::new().with("size", 2usize).with("element_type", "entry")),
//! )?;
//! catalog.define(
//!     StructureDescriptor::builder("entry")
//!         .field("kind", "u8")
//!         .switch("kind", false, Selector::table([(1u64, "short")], "long")),
//! )?;
//! catalog.define(StructureDescriptor::builder("short").field("value", "u8"))?;
//! catalog.define(StructureDescriptor::builder("long").field("value", "u16"))?;
//!
//! let data = [2, 1, 0x10, 2, 0x20, 0x30];
//! let table = catalog.drop("table", &data, 0)?;
//!
//! assert_eq!(table.length, 6);
//! assert_eq!(table.child("entries").unwrap().children().len(), 2);
//! # Ok::<(), strata_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! The library provides several traits for customization:
//!
//! - [`Interpreter`] and [`InterpreterInfo`]: Add primitive kinds
//! - [`AnnotationVisitor`]: Walk annotation trees for custom output
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod annotation;
pub mod catalog;
pub mod context;
pub mod error;
pub mod field;
pub mod interpreter;
pub mod options;
pub mod registry;
pub mod render;
pub mod structure;
pub mod value;

// Re-export primary types for convenience
pub use annotation::{Annotation, Payload};
pub use catalog::{read_file, Catalog, DropConfig, EmptyFieldPolicy};
pub use context::DropContext;
pub use error::{Error, Result};
pub use field::{ArrayField, Field, ReferenceField, Selector, SimpleField, SwitchField};
pub use interpreter::{Interpreter, InterpreterInfo, InterpreterRegistry};
pub use options::{OptionValue, Options};
pub use registry::StructureRegistry;
pub use render::{AnnotationVisitor, StatsVisitor};
pub use structure::{StructureBuilder, StructureDescriptor};
pub use value::Value;

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
