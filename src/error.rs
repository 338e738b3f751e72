//! Error types for SimaPro CSV reading and writing.
//!
//! ## Error Categories
//!
//! - **Fatal document errors**: a malformed header, an invalid dialect, broken
//!   quoting on a line, or a block reader that broke the cursor contract. These
//!   abort a whole-document read.
//! - **Field-level errors**: [`Error::ValueDecode`] describes a single value that
//!   could not be decoded. The codecs normally recover from these by substituting
//!   a default, so the variant only surfaces through the strict `try_*` APIs.
//! - **I/O errors**: file reading/writing failures.
//!
//! Unknown block keywords are not errors; they are skipped by the dispatcher.
//!
//! ## Examples
//!
//! ```rust
//! use simapro_csv::{from_str, Error};
//!
//! let result = from_str("Process\n");
//! assert!(matches!(result, Err(Error::MalformedHeader { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing SimaPro CSV.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// No `{...}` header line was found at the start of the source
    #[error("Malformed header: no header marker found in the first {scanned} lines")]
    MalformedHeader { scanned: usize },

    /// The header declares an unusable dialect
    #[error("Invalid dialect: {0}")]
    Dialect(String),

    /// Broken quoting on a physical line
    #[error("Tokenize error at line {line}, column {column}: {msg}")]
    Tokenize {
        line: usize,
        column: usize,
        msg: String,
    },

    /// A block reader returned without honoring the cursor contract
    #[error("Protocol violation: reader for `{kind}` block at line {line} {msg}")]
    ProtocolViolation {
        kind: String,
        line: usize,
        msg: String,
    },

    /// A single field could not be decoded
    #[error("Value decode error at line {line}, column {column}: {msg}")]
    ValueDecode {
        line: usize,
        column: usize,
        msg: String,
    },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a tokenize error for a broken quote on a line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::Error;
    ///
    /// let err = Error::tokenize(10, 5, "unterminated quote");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn tokenize(line: usize, column: usize, msg: &str) -> Self {
        Error::Tokenize {
            line,
            column,
            msg: msg.to_string(),
        }
    }

    /// Creates a protocol violation error for a misbehaving block reader.
    pub fn protocol_violation(kind: &str, line: usize, msg: &str) -> Self {
        Error::ProtocolViolation {
            kind: kind.to_string(),
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates a field-level decode error.
    pub fn value_decode(line: usize, column: usize, msg: &str) -> Self {
        Error::ValueDecode {
            line,
            column,
            msg: msg.to_string(),
        }
    }

    /// Creates a dialect error.
    pub fn dialect<T: fmt::Display>(msg: T) -> Self {
        Error::Dialect(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the source line number this error refers to, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use simapro_csv::Error;
    ///
    /// assert_eq!(Error::value_decode(7, 3, "bad tag").line(), Some(7));
    /// assert_eq!(Error::io("closed").line(), None);
    /// ```
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Tokenize { line, .. }
            | Error::ProtocolViolation { line, .. }
            | Error::ValueDecode { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Returns `true` if this error aborts the surrounding document.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::ValueDecode { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
