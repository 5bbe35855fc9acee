//! Error types for attrconf
//!
//! Errors are structured: a kind, the config path where the problem was
//! found, an optional source location, and an actionable help message.

use std::fmt;

/// Result type alias for attrconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for attrconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Path in the config where the error occurred (e.g., "db.port")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Error parsing YAML/JSON or a path expression
    Parse,
    /// A required declared field is absent
    MissingField { field: String },
    /// A declared field is present but cannot be coerced to its type
    TypeMismatch { expected: String, got: String },
    /// Sequence index past the end of a sequence
    IndexOutOfRange { index: usize, len: usize },
    /// Error accessing a path that doesn't exist
    PathNotFound,
    /// Any other validation failure reported while building a record
    Validation,
    /// I/O error (file not found, etc.)
    Io,
    /// Internal error (bug in attrconf)
    Internal,
}

impl Error {
    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parse,
            path: None,
            source_location: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create a missing field error
    ///
    /// The path starts as the field name; enclosing records and sequences
    /// prefix their own segments as the error propagates outwards.
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            kind: ErrorKind::MissingField {
                field: field.clone(),
            },
            path: Some(field.clone()),
            source_location: None,
            help: Some(format!(
                "Add '{}' to the configuration or give the field a default",
                field
            )),
            cause: None,
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        let expected = expected.into();
        Self {
            kind: ErrorKind::TypeMismatch {
                expected: expected.clone(),
                got: got.into(),
            },
            path: None,
            source_location: None,
            help: Some(format!("Ensure the value can be converted to {}", expected)),
            cause: None,
        }
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::IndexOutOfRange { index, len },
            path: None,
            source_location: None,
            help: Some(if len == 0 {
                "The sequence is empty".to_string()
            } else {
                format!("Use an index between 0 and {}", len - 1)
            }),
            cause: None,
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        let path_str = path.into();
        Self {
            kind: ErrorKind::PathNotFound,
            path: Some(path_str.clone()),
            source_location: None,
            help: Some(format!(
                "Check that '{}' exists in the configuration",
                path_str
            )),
            cause: None,
        }
    }

    /// Create a validation error
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        let p = path.into();
        Self {
            kind: ErrorKind::Validation,
            path: if p.is_empty() || p == "<root>" {
                None
            } else {
                Some(p)
            },
            source_location: None,
            help: Some("Fix the value to match the declared record".into()),
            cause: Some(message.into()),
        }
    }

    /// Create an I/O error
    pub fn io(file: impl Into<String>, message: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            kind: ErrorKind::Io,
            path: None,
            source_location: Some(SourceLocation {
                file,
                line: None,
                column: None,
            }),
            help: Some("Check that the file exists and is readable".into()),
            cause: Some(message.into()),
        }
    }

    /// Create an internal error (bug in attrconf)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            path: None,
            source_location: None,
            help: Some("This is likely a bug in attrconf. Please report it.".into()),
            cause: Some(message.into()),
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Prefix the path with a mapping key (`port` under `db` becomes `db.port`)
    pub(crate) fn under_key(mut self, key: &str) -> Self {
        self.path = Some(match self.path.take() {
            None => key.to_string(),
            Some(p) if p.starts_with('[') => format!("{}{}", key, p),
            Some(p) => format!("{}.{}", key, p),
        });
        self
    }

    /// Prefix the path with a sequence index (`majority` under 2 becomes `[2].majority`)
    pub(crate) fn under_index(mut self, index: usize) -> Self {
        self.path = Some(match self.path.take() {
            None => format!("[{}]", index),
            Some(p) if p.starts_with('[') => format!("[{}]{}", index, p),
            Some(p) => format!("[{}].{}", index, p),
        });
        self
    }

    /// Whether this is a missing field error
    pub fn is_missing_field(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingField { .. })
    }

    /// Whether this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    /// Whether this is an index out of range error
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self.kind, ErrorKind::IndexOutOfRange { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Main error message
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::MissingField { field } => write!(f, "Missing required field: {}", field)?,
            ErrorKind::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)?
            }
            ErrorKind::IndexOutOfRange { index, len } => {
                write!(f, "Index out of range: {} (length {})", index, len)?
            }
            ErrorKind::PathNotFound => write!(f, "Path not found")?,
            ErrorKind::Validation => write!(f, "Validation error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        // Path context
        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        // Source location
        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
                if let Some(column) = loc.column {
                    write!(f, ":{}", column)?;
                }
            }
        }

        // Cause
        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        // Help
        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl serde::de::Error for Error {
    /// Conversion failures reported by field types (`FromStr`, `TryFrom`, ...)
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::type_mismatch("a valid value", msg.to_string())
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(exp.to_string(), unexp.to_string())
    }

    fn invalid_value(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(exp.to_string(), unexp.to_string())
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(exp.to_string(), format!("sequence of length {}", len))
    }

    fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
        Error::type_mismatch(format!("one of {:?}", expected), format!("\"{}\"", variant))
    }

    fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
        Error::validation(field, format!("unknown field, expected one of {:?}", expected))
    }

    fn duplicate_field(field: &'static str) -> Self {
        Error::validation(field, "duplicate field")
    }

    fn missing_field(field: &'static str) -> Self {
        Error::missing_field(field)
    }
}
