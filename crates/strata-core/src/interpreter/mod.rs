//! Primitive value interpreters.
//!
//! An [`Interpreter`] decodes one fixed-length primitive value at a position
//! and reports how many bytes it consumed. Interpreters are looked up by
//! name through an [`InterpreterRegistry`], which maps each name to an
//! [`InterpreterInfo`] able to create configured interpreters from field
//! options.
//!
//! ## Extensibility
//!
//! Custom kinds are added by implementing both traits:
//!
//! ```
//! use strata_core::interpreter::{Decoded, Interpreter, InterpreterInfo, InterpreterRegistry};
//! use strata_core::{Error, Options, Result, Value};
//!
//! struct Flag;
//!
//! impl Interpreter for Flag {
//!     fn name(&self) -> &str {
//!         "flag"
//!     }
//!
//!     fn decode(&self, data: &[u8], position: usize) -> Result<Decoded> {
//!         match data.get(position) {
//!             Some(&b) => Ok(Decoded::new(Value::from(u64::from(b != 0)), 1)),
//!             None => Err(Error::decode("flag", position, "end of data")),
//!         }
//!     }
//! }
//!
//! struct FlagInfo;
//!
//! impl InterpreterInfo for FlagInfo {
//!     fn human_name(&self) -> &str {
//!         "Boolean flag"
//!     }
//!
//!     fn create(&self, _field: &str, _options: &Options) -> Result<Box<dyn Interpreter>> {
//!         Ok(Box::new(Flag))
//!     }
//! }
//!
//! let mut registry = InterpreterRegistry::with_primitives();
//! registry.register("flag", FlagInfo);
//! assert!(registry.contains("flag"));
//! ```

mod primitive;

use crate::options::Options;
use crate::value::Value;
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use primitive::{Ascii, Endian, Integer, Null, RawBytes, NULL_INTERPRETER};

/// A value decoded by an interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded value
    pub value: Value,
    /// Number of bytes consumed
    pub length: usize,
}

impl Decoded {
    /// Creates a new decoded value
    pub fn new(value: Value, length: usize) -> Self {
        Self { value, length }
    }
}

/// Decodes a primitive value from bytes
pub trait Interpreter: Send + Sync {
    /// Name used in error reports
    fn name(&self) -> &str;

    /// Decode a value at `position`, failing with [`crate::Error::Decode`]
    /// when no valid value can be read there
    fn decode(&self, data: &[u8], position: usize) -> Result<Decoded>;
}

/// Describes an option understood by an interpreter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionInfo {
    /// Option name
    pub name: &'static str,
    /// Whether the interpreter refuses to be created without it
    pub required: bool,
    /// One-line description
    pub description: &'static str,
}

/// A named interpreter kind
pub trait InterpreterInfo: Send + Sync {
    /// Human readable name, e.g. "Unsigned 32-bit Integer (Little Endian)"
    fn human_name(&self) -> &str;

    /// Options this kind reads
    fn options(&self) -> &[OptionInfo] {
        &[]
    }

    /// Create an interpreter configured by the options of `field`
    fn create(&self, field: &str, options: &Options) -> Result<Box<dyn Interpreter>>;
}

/// Registry mapping interpreter names to their kinds
#[derive(Clone, Default)]
pub struct InterpreterRegistry {
    kinds: HashMap<String, Arc<dyn InterpreterInfo>>,
}

impl fmt::Debug for InterpreterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterRegistry")
            .field("kinds", &self.names())
            .finish()
    }
}

impl InterpreterRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in primitive kinds
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        primitive::register_all(&mut registry);
        registry
    }

    /// Registers a kind, returning the one it replaced
    pub fn register(
        &mut self,
        name: impl Into<String>,
        info: impl InterpreterInfo + 'static,
    ) -> Option<Arc<dyn InterpreterInfo>> {
        self.register_shared(name, Arc::new(info))
    }

    /// Registers an already shared kind under another name
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        info: Arc<dyn InterpreterInfo>,
    ) -> Option<Arc<dyn InterpreterInfo>> {
        self.kinds.insert(name.into(), info)
    }

    /// Looks up a kind by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn InterpreterInfo>> {
        self.kinds.get(name)
    }

    /// Returns true if a kind is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
