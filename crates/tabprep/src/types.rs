use crate::config::NormalizationMethod;
use serde::Serialize;
use std::fmt;

/// How a column is treated by every stage of the preprocessor.
///
/// Assigned once when the table is ingested and carried along as columns are
/// dropped or generated, so no stage has to re-infer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    /// Integer or floating point values (including generated indicators)
    Numeric,
    /// String, categorical or enum values
    Categorical,
    /// True/false values
    Boolean,
}

impl ColumnKind {
    /// Whether the column is one-hot encoded by `encode_categorical`.
    pub fn is_encodable(&self) -> bool {
        matches!(self, Self::Categorical | Self::Boolean)
    }
}

/// Value substituted for missing cells of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Numeric(f64),
    Text(String),
    Boolean(bool),
}

impl FillValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{:.4}", v),
            Self::Text(v) => write!(f, "'{}'", v),
            Self::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// Parameters chosen while normalizing one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalingStats {
    MinMax { min: f64, max: f64 },
    Standard { mean: f64, std: f64 },
}

impl ScalingStats {
    pub fn method(&self) -> NormalizationMethod {
        match self {
            Self::MinMax { .. } => NormalizationMethod::MinMax,
            Self::Standard { .. } => NormalizationMethod::Standard,
        }
    }

    /// `(min, max)` for min-max scaling, `(mean, std)` for standard scaling.
    pub fn params(&self) -> (f64, f64) {
        match *self {
            Self::MinMax { min, max } => (min, max),
            Self::Standard { mean, std } => (mean, std),
        }
    }

    /// True when every present value would map to the same output.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Self::MinMax { min, max } => max == min,
            Self::Standard { std, .. } => std == 0.0,
        }
    }
}

// ============================================================================
// Action log
// ============================================================================

/// Type of action recorded by a preprocessing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A column was dropped for excess missing values
    ColumnRemoved,
    /// Missing cells of a column were filled
    ValueImputed,
    /// A column was replaced by indicator columns
    ColumnEncoded,
    /// A numeric column was rescaled
    ColumnNormalized,
}

/// One entry in the human-readable log of what the preprocessor did.
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingAction {
    pub action_type: ActionType,
    pub column: String,
    pub description: String,
}

impl PreprocessingAction {
    pub fn new(
        action_type: ActionType,
        column: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            column: column.into(),
            description: description.into(),
        }
    }
}
