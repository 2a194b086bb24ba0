//! Error types for the strata-core library.
//!
//! Every failure of a drop propagates to the caller as a typed [`Error`]
//! carrying the offending position or name. Nothing is retried: structural
//! decoding is deterministic, so a failure means either a malformed
//! definition or malformed input data.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for strata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all strata operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required array, switch or interpreter option was not given
    #[error("field '{field}' is missing required option '{option}'")]
    MissingOption {
        /// Name of the field being defined
        field: String,
        /// The missing option
        option: String,
    },

    /// An option was given but holds the wrong kind of value
    #[error("field '{field}' has invalid option '{option}': {details}")]
    InvalidOption {
        /// Name of the field being defined
        field: String,
        /// The offending option
        option: String,
        /// What was expected
        details: String,
    },

    /// No interpreter is registered under the requested name
    #[error("unknown interpreter '{name}' at offset {offset}")]
    UnknownInterpreter {
        /// The interpreter name that was requested
        name: String,
        /// Position of the field using it
        offset: usize,
    },

    /// An interpreter could not decode a value at the given position
    #[error("interpreter '{interpreter}' failed at offset {offset}: {details}")]
    Decode {
        /// Name of the failing interpreter
        interpreter: String,
        /// Byte offset where decoding was attempted
        offset: usize,
        /// Detailed description of the issue
        details: String,
    },

    /// A switch discriminant is not visible from the switch's scope
    #[error("unresolved reference to field '{name}' at offset {offset}")]
    UnresolvedReference {
        /// The discriminant field name
        name: String,
        /// Position of the switch
        offset: usize,
    },

    /// A structure name was not found in the registry at drop time
    #[error("unresolved structure '{name}' at offset {offset}")]
    UnresolvedStructure {
        /// The attempted structure name
        name: String,
        /// Position where the structure would have been dropped
        offset: usize,
    },

    /// Structures nested deeper than the configured limit
    #[error("structure nesting exceeded depth {limit} at offset {offset}")]
    DepthExceeded {
        /// The configured depth limit
        limit: usize,
        /// Position of the structure that went over the limit
        offset: usize,
    },

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new missing option error
    pub fn missing_option(field: impl Into<String>, option: impl Into<String>) -> Self {
        Self::MissingOption {
            field: field.into(),
            option: option.into(),
        }
    }

    /// Creates a new invalid option error
    pub fn invalid_option(
        field: impl Into<String>,
        option: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            field: field.into(),
            option: option.into(),
            details: details.into(),
        }
    }

    /// Creates a new unknown interpreter error
    pub fn unknown_interpreter(name: impl Into<String>, offset: usize) -> Self {
        Self::UnknownInterpreter {
            name: name.into(),
            offset,
        }
    }

    /// Creates a new decode error
    pub fn decode(
        interpreter: impl Into<String>,
        offset: usize,
        details: impl Into<String>,
    ) -> Self {
        Self::Decode {
            interpreter: interpreter.into(),
            offset,
            details: details.into(),
        }
    }

    /// Creates a new unresolved reference error
    pub fn unresolved_reference(name: impl Into<String>, offset: usize) -> Self {
        Self::UnresolvedReference {
            name: name.into(),
            offset,
        }
    }

    /// Creates a new unresolved structure error
    pub fn unresolved_structure(name: impl Into<String>, offset: usize) -> Self {
        Self::UnresolvedStructure {
            name: name.into(),
            offset,
        }
    }

    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error points at a broken definition rather than bad input data
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::MissingOption { .. }
                | Self::InvalidOption { .. }
                | Self::UnknownInterpreter { .. }
                | Self::UnresolvedReference { .. }
                | Self::UnresolvedStructure { .. }
        )
    }

    /// Returns the byte offset the error was raised at, if it has one
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnknownInterpreter { offset, .. }
            | Self::Decode { offset, .. }
            | Self::UnresolvedReference { offset, .. }
            | Self::UnresolvedStructure { offset, .. }
            | Self::DepthExceeded { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unresolved_structure("entry", 10);
        assert!(err.to_string().contains("entry"));
        assert!(err.to_string().contains("10"));

        let err = Error::missing_option("entries", "size");
        assert_eq!(
            err.to_string(),
            "field 'entries' is missing required option 'size'"
        );
    }

    #[test]
    fn test_is_definition_error() {
        assert!(Error::unresolved_reference("kind", 0).is_definition_error());
        assert!(Error::missing_option("a", "size").is_definition_error());
        assert!(!Error::decode("u32", 4, "truncated").is_definition_error());
        assert!(!Error::DepthExceeded { limit: 4, offset: 0 }.is_definition_error());
    }

    #[test]
    fn test_offset() {
        assert_eq!(Error::decode("u8", 7, "eof").offset(), Some(7));
        assert_eq!(Error::missing_option("a", "size").offset(), None);
    }
}
