//! Field options given at definition time.
//!
//! Options are an ordered map from option name to a small scalar value.
//! Interpreters read what they need (`length` for text and raw bytes),
//! arrays read `size`, `element_type` and `start_index`.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// A single option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Integer option (sizes, lengths, indices)
    Int(i128),
    /// Text option (type names)
    Text(String),
    /// Flag option
    Bool(bool),
}

impl From<u64> for OptionValue {
    fn from(v: u64) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<usize> for OptionValue {
    fn from(v: usize) -> Self {
        OptionValue::Int(v as i128)
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

/// Ordered set of options attached to a field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Creates an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Returns the raw option value
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    /// Returns true if no options are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a non-negative integer option, failing if it is present with another kind
    pub fn get_u64(&self, field: &str, name: &str) -> Result<Option<u64>> {
        match self.entries.get(name) {
            None => Ok(None),
            Some(OptionValue::Int(v)) => u64::try_from(*v).map(Some).map_err(|_| {
                Error::invalid_option(
                    field,
                    name,
                    format!("expected a non-negative integer, got {}", v),
                )
            }),
            Some(other) => Err(Error::invalid_option(
                field,
                name,
                format!("expected an integer, got {:?}", other),
            )),
        }
    }

    /// Reads a text option, failing if it is present with another kind
    pub fn get_str(&self, field: &str, name: &str) -> Result<Option<&str>> {
        match self.entries.get(name) {
            None => Ok(None),
            Some(OptionValue::Text(v)) => Ok(Some(v)),
            Some(other) => Err(Error::invalid_option(
                field,
                name,
                format!("expected text, got {:?}", other),
            )),
        }
    }

    /// Reads a flag option, failing if it is present with another kind
    pub fn get_bool(&self, field: &str, name: &str) -> Result<Option<bool>> {
        match self.entries.get(name) {
            None => Ok(None),
            Some(OptionValue::Bool(v)) => Ok(Some(*v)),
            Some(other) => Err(Error::invalid_option(
                field,
                name,
                format!("expected a flag, got {:?}", other),
            )),
        }
    }

    /// Reads a required integer option
    pub fn require_u64(&self, field: &str, name: &str) -> Result<u64> {
        self.get_u64(field, name)?
            .ok_or_else(|| Error::missing_option(field, name))
    }

    /// Reads a required text option
    pub fn require_str(&self, field: &str, name: &str) -> Result<&str> {
        self.get_str(field, name)?
            .ok_or_else(|| Error::missing_option(field, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = Options::new()
            .with("size", 3usize)
            .with("element_type", "entry")
            .with("strict", true);

        assert_eq!(options.require_u64("a", "size").unwrap(), 3);
        assert_eq!(options.require_str("a", "element_type").unwrap(), "entry");
        assert_eq!(options.get_bool("a", "strict").unwrap(), Some(true));
        assert_eq!(options.get_u64("a", "start_index").unwrap(), None);
    }

    #[test]
    fn test_missing_and_invalid() {
        let options = Options::new().with("size", "three");

        assert!(matches!(
            options.require_u64("entries", "size"),
            Err(Error::InvalidOption { .. })
        ));
        assert!(matches!(
            options.require_str("entries", "element_type"),
            Err(Error::MissingOption { .. })
        ));
    }

    #[test]
    fn test_negative_integer_rejected() {
        let options = Options::new().with("start_index", -1);

        assert_eq!(options.get("start_index"), Some(&OptionValue::Int(-1)));
        assert!(matches!(
            options.get_u64("entries", "start_index"),
            Err(Error::InvalidOption { ref option, .. }) if option == "start_index"
        ));
    }
}
