//! Error types for SensorLog

use crate::schema::{Column, ColumnType};
use thiserror::Error;

/// Result type alias for SensorLog operations
pub type Result<T> = std::result::Result<T, SensorLogError>;

/// SensorLog error types
#[derive(Error, Debug)]
pub enum SensorLogError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value does not fit its column's fixed width
    #[error("Value {rendered:?} for column {column} exceeds width {width}")]
    EncodingOverflow {
        column: Column,
        rendered: String,
        width: usize,
    },

    /// A float is not representable at its column's stored precision
    #[error("Value {value} for column {column} needs more than {decimals} decimals")]
    ExcessPrecision {
        column: Column,
        value: f64,
        decimals: usize,
    },

    /// A stored line could not be parsed against the schema
    #[error("Decode error: {0}")]
    Decode(String),

    /// The search could not resolve an offset (no records stored)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record's populated columns disagree with the active schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Column name is not part of the registry
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Value type does not match the column's declared type
    #[error("Type mismatch for column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: Column,
        expected: ColumnType,
        actual: ColumnType,
    },

    /// Schema definition is not valid
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Timestamp text could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl SensorLogError {
    /// Check if error indicates corrupt or foreign data on disk
    pub fn is_corruption(&self) -> bool {
        matches!(self, SensorLogError::Decode(_))
    }

    /// Check if error was caused by the data the caller supplied
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SensorLogError::EncodingOverflow { .. }
                | SensorLogError::ExcessPrecision { .. }
                | SensorLogError::SchemaMismatch(_)
                | SensorLogError::UnknownColumn(_)
                | SensorLogError::TypeMismatch { .. }
                | SensorLogError::InvalidSchema(_)
                | SensorLogError::InvalidTimestamp(_)
        )
    }
}
