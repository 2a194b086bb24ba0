//! Decoded primitive values.

use bytes::Bytes;
use std::fmt;

/// A primitive value produced by an interpreter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// No value (the null interpreter)
    Null,
    /// Unsigned integer of any width up to 64 bits
    Unsigned(u64),
    /// Signed integer of any width up to 64 bits
    Signed(i64),
    /// Decoded text
    Text(String),
    /// Raw bytes
    Bytes(Bytes),
}

impl Value {
    /// Returns the value as an unsigned integer, if it is a non-negative integer
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Signed(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as a signed integer, if it fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(v) => Some(*v),
            Value::Unsigned(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Signed(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => {
                for byte in b.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Unsigned(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Signed(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
