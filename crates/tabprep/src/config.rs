//! Configuration types for the preprocessing pipeline.
//!
//! This module provides the normalization method selector and a
//! [`PreprocessorConfig`] built with the builder pattern, so a whole
//! `fit_transform` run can be described by one validated value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default fraction of missing rows tolerated before a column is dropped.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.5;

/// Method used to rescale numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NormalizationMethod {
    /// Linear rescaling into [0, 1] using the observed min and max
    #[default]
    #[serde(rename = "minmax")]
    MinMax,
    /// Standard score using the mean and sample standard deviation
    #[serde(rename = "std")]
    Standard,
}

impl NormalizationMethod {
    /// The short name used in configuration and recorded statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinMax => "minmax",
            Self::Standard => "std",
        }
    }
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minmax" => Ok(Self::MinMax),
            "std" => Ok(Self::Standard),
            other => Err(ConfigValidationError::UnknownMethod(other.to_string())),
        }
    }
}

/// Check that a missing-value threshold lies in [0, 1].
pub(crate) fn validate_threshold(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigValidationError::InvalidThreshold {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Configuration for a complete preprocessing run.
///
/// Use [`PreprocessorConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::config::{NormalizationMethod, PreprocessorConfig};
///
/// let config = PreprocessorConfig::builder()
///     .missing_threshold(0.3)
///     .normalization(NormalizationMethod::Standard)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Columns whose missing fraction strictly exceeds this value are dropped.
    /// Default: 0.5
    pub missing_threshold: f64,

    /// Rescaling applied to numeric columns after encoding.
    /// Default: MinMax
    pub normalization: NormalizationMethod,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            normalization: NormalizationMethod::default(),
        }
    }
}

impl PreprocessorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessorConfigBuilder {
        PreprocessorConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_threshold("missing_threshold", self.missing_threshold)
    }
}

/// Errors that can occur during argument and configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Unknown normalization method '{0}' (expected 'minmax' or 'std')")]
    UnknownMethod(String),
}

/// Builder for [`PreprocessorConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessorConfigBuilder {
    missing_threshold: Option<f64>,
    normalization: Option<NormalizationMethod>,
}

impl PreprocessorConfigBuilder {
    /// Set the threshold for dropping columns with missing values.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = Some(threshold);
        self
    }

    /// Set the normalization method for numeric columns.
    pub fn normalization(mut self, method: NormalizationMethod) -> Self {
        self.normalization = Some(method);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessorConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreprocessorConfig, ConfigValidationError> {
        let config = PreprocessorConfig {
            missing_threshold: self.missing_threshold.unwrap_or(DEFAULT_MISSING_THRESHOLD),
            normalization: self.normalization.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
