//! Error types for the idaview marshaling layer.
//!
//! The read path over native records is total and never produces these
//! errors. They only come out of the checked constructors, closed-enum
//! conversions, operand slot lookups and configuration loading.

use thiserror::Error;

/// Main error type for idaview operations.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// Byte slice shorter than the native record it should hold
    #[error("Buffer too small for {record}: need {needed} bytes, found {found}")]
    BufferTooSmall {
        record: &'static str,
        needed: usize,
        found: usize,
    },

    /// Null base address handed to a checked constructor
    #[error("Null base address for {record}")]
    NullPointer { record: &'static str },

    /// Raw value outside a closed enumeration
    #[error("Unknown {kind} discriminant: {value:#x}")]
    UnknownDiscriminant { kind: &'static str, value: u64 },

    /// Operand slot beyond the instruction's operand array
    #[error("Operand index {index} out of range (max {max})")]
    OperandIndex { index: usize, max: usize },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MarshalError {
    fn from(err: serde_json::Error) -> Self {
        MarshalError::Serialization(err.to_string())
    }
}

/// Result type alias for idaview operations
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Convert marshaling errors to PyO3 exceptions
#[cfg(feature = "python-ext")]
impl From<MarshalError> for pyo3::PyErr {
    fn from(err: MarshalError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyException, PyIOError, PyIndexError, PyValueError};

        match err {
            MarshalError::Io(e) => PyIOError::new_err(e.to_string()),
            MarshalError::OperandIndex { .. } => PyIndexError::new_err(err.to_string()),
            MarshalError::BufferTooSmall { .. }
            | MarshalError::NullPointer { .. }
            | MarshalError::UnknownDiscriminant { .. }
            | MarshalError::Config(_) => PyValueError::new_err(err.to_string()),
            _ => PyException::new_err(err.to_string()),
        }
    }
}
