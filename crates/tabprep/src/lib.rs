//! Tabular Data Preprocessing Library
//!
//! A small, stateful data-cleaning pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! A [`Preprocessor`] wraps a copy of one `DataFrame` and runs it through
//! three stages, recording every decision so it can be inspected afterwards:
//!
//! - **Missing values**: drop columns that are mostly empty, fill the rest
//!   with the column mean or most frequent value
//! - **Categorical encoding**: replace string and boolean columns with
//!   one-hot indicator columns
//! - **Numeric normalization**: min-max or standard-score scaling
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabprep::{NormalizationMethod, Preprocessor};
//! use polars::prelude::*;
//!
//! let df = df![
//!     "age" => [Some(25.0), None, Some(35.0), Some(200.0)],
//!     "city" => [Some("A"), Some("B"), Some("A"), None],
//! ]?;
//!
//! let mut prep = Preprocessor::new(&df)?;
//! let cleaned = prep.fit_transform(0.5, NormalizationMethod::MinMax)?;
//!
//! println!("Filled: {:?}", prep.fill_values());
//! println!("Generated: {:?}", prep.encoded_columns());
//! println!("{}", cleaned);
//! ```
//!
//! # Step by step
//!
//! Stages return `&mut Preprocessor` and chain with `?`:
//!
//! ```rust,ignore
//! prep.remove_missing(0.3)?
//!     .encode_categorical()?
//!     .normalize_numeric("std".parse()?)?;
//! ```
//!
//! # Configuration
//!
//! Use [`PreprocessorConfig`] to describe a whole run:
//!
//! ```rust,ignore
//! use tabprep::config::*;
//!
//! let config = PreprocessorConfig::builder()
//!     .missing_threshold(0.7)      // Drop columns with >70% missing
//!     .normalization(NormalizationMethod::Standard)
//!     .build()?;
//!
//! let cleaned = prep.fit_transform_with_config(&config)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod encoders;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod scalers;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    ConfigValidationError, NormalizationMethod, PreprocessorConfig, PreprocessorConfigBuilder,
};
pub use encoders::{EncodedColumn, OneHotEncoder};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::Preprocessor;
pub use scalers::NumericScaler;
pub use types::{ActionType, ColumnKind, FillValue, PreprocessingAction, ScalingStats};
