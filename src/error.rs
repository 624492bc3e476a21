//! Error handling for record sorting, searching and storage

use std::io;
use thiserror::Error;

/// Custom error type for record operations
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Permission denied: {file}")]
    PermissionDenied { file: String },

    #[error("No such file or directory: {file}")]
    FileNotFound { file: String },

    #[error("Malformed record file {file} at line {line}: {message}")]
    MalformedFile {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Cannot parse {value:?} in field '{field}' as {expected}")]
    ParseError {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("Unknown record kind: {name}")]
    UnknownKind { name: String },

    #[error("Unknown sort algorithm: {name}")]
    UnknownAlgorithm { name: String },

    #[error("Field '{field}' is not part of the {kind} schema")]
    UnknownField { kind: String, field: String },

    #[error("Patch for {actual} records applied to {expected} records")]
    KindMismatch { expected: String, actual: String },

    #[error("Conflicting query options: {message}")]
    ConflictingOptions { message: String },

    #[error("Invalid option: {message}")]
    InvalidOption { message: String },

    #[error("No keys left for {kind} records")]
    KeysExhausted { kind: String },

    #[error("Records are not sorted at position {index}")]
    NotSorted { index: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RecordError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RecordError::PermissionDenied { .. }
            | RecordError::FileNotFound { .. }
            | RecordError::MalformedFile { .. }
            | RecordError::Csv(_)
            | RecordError::Io(_) => crate::STORE_FAILURE,

            _ => crate::EXIT_FAILURE,
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(file: &str) -> Self {
        RecordError::PermissionDenied {
            file: file.to_string(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(file: &str) -> Self {
        RecordError::FileNotFound {
            file: file.to_string(),
        }
    }

    /// Create a malformed file error
    pub fn malformed_file(file: &str, line: usize, message: &str) -> Self {
        RecordError::MalformedFile {
            file: file.to_string(),
            line,
            message: message.to_string(),
        }
    }

    /// Create a parse error for a value that does not fit its field kind
    pub fn parse_error(field: &str, value: &str, expected: &'static str) -> Self {
        RecordError::ParseError {
            field: field.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub fn unknown_kind(name: &str) -> Self {
        RecordError::UnknownKind {
            name: name.to_string(),
        }
    }

    pub fn unknown_algorithm(name: &str) -> Self {
        RecordError::UnknownAlgorithm {
            name: name.to_string(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(kind: &str, field: &str) -> Self {
        RecordError::UnknownField {
            kind: kind.to_string(),
            field: field.to_string(),
        }
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch(expected: &str, actual: &str) -> Self {
        RecordError::KindMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a conflicting options error
    pub fn conflicting_options(message: &str) -> Self {
        RecordError::ConflictingOptions {
            message: message.to_string(),
        }
    }

    /// Create an invalid option error
    pub fn invalid_option(message: &str) -> Self {
        RecordError::InvalidOption {
            message: message.to_string(),
        }
    }

    pub fn keys_exhausted(kind: &str) -> Self {
        RecordError::KeysExhausted {
            kind: kind.to_string(),
        }
    }

    /// Create a not sorted error
    pub fn not_sorted(index: usize) -> Self {
        RecordError::NotSorted { index }
    }
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Context trait for adding file context to errors
pub trait RecordContext<T> {
    fn with_file_context(self, filename: &str) -> RecordResult<T>;
}

impl<T> RecordContext<T> for RecordResult<T> {
    fn with_file_context(self, filename: &str) -> RecordResult<T> {
        self.map_err(|err| match err {
            RecordError::Io(io_err) => file_error(io_err, filename),
            other => other,
        })
    }
}

impl<T> RecordContext<T> for Result<T, io::Error> {
    fn with_file_context(self, filename: &str) -> RecordResult<T> {
        self.map_err(|io_err| file_error(io_err, filename))
    }
}

fn file_error(io_err: io::Error, filename: &str) -> RecordError {
    match io_err.kind() {
        io::ErrorKind::PermissionDenied => RecordError::permission_denied(filename),
        io::ErrorKind::NotFound => RecordError::file_not_found(filename),
        _ => RecordError::Io(io::Error::new(
            io_err.kind(),
            format!("{}: {}", filename, io_err),
        )),
    }
}
