//! Pipeline module.
//!
//! This module provides the stateful [`Preprocessor`] that chains the
//! cleaning, encoding and scaling stages over one table.

mod preprocessor;

pub use preprocessor::Preprocessor;
