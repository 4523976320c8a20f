//! Custom error types for the preprocessing pipeline.
//!
//! Errors fall into two families callers usually want to tell apart:
//! type errors (the input is not a table the preprocessor understands) and
//! validation errors (a stage argument is out of range). Everything else is
//! either a naming conflict or an error bubbled up from polars.
//!
//! Errors are serializable as `{ code, message }` so they can be handed to a
//! frontend or another process without losing the machine-readable code.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// A column has a dtype the preprocessor cannot classify.
    #[error("Column '{column}' has unsupported type {dtype}")]
    UnsupportedColumnType { column: String, dtype: String },

    /// The input could not be assembled into a rectangular table.
    #[error("Input is not a valid table: {0}")]
    InvalidTable(String),

    /// A stage argument failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ConfigValidationError),

    /// A generated column name is already taken.
    #[error("Column '{0}' already exists in dataset")]
    DuplicateColumn(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedColumnType { .. } | Self::InvalidTable(_) => "TYPE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the input was rejected as not being a usable table.
    pub fn is_type_error(&self) -> bool {
        match self {
            Self::UnsupportedColumnType { .. } | Self::InvalidTable(_) => true,
            Self::WithContext { source, .. } => source.is_type_error(),
            _ => false,
        }
    }

    /// Check if a stage argument was rejected.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::WithContext { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
