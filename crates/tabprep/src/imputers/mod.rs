//! Imputation module for handling missing values.

mod statistical;

pub use statistical::StatisticalImputer;
