//! Data cleaning module.
//!
//! Finds and drops columns whose share of missing values is too high to be
//! worth imputing.

use crate::utils::missing_ratio;
use polars::prelude::*;
use tracing::debug;

/// A column selected for removal together with its missing fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseColumn {
    pub name: String,
    pub missing_ratio: f64,
}

/// Data cleaner for column-level missing value handling.
pub struct DataCleaner;

impl DataCleaner {
    /// Find columns whose missing fraction strictly exceeds `threshold`,
    /// in table order.
    pub fn find_sparse_columns(df: &DataFrame, threshold: f64) -> Vec<SparseColumn> {
        df.get_columns()
            .iter()
            .filter_map(|col| {
                let ratio = missing_ratio(col.as_materialized_series());
                debug!("'{}' missing ratio: {:.3}", col.name(), ratio);
                (ratio > threshold).then(|| SparseColumn {
                    name: col.name().to_string(),
                    missing_ratio: ratio,
                })
            })
            .collect()
    }

    /// Drop the given columns, keeping the order of the rest.
    pub fn drop_columns(df: &DataFrame, columns: &[String]) -> DataFrame {
        if columns.is_empty() {
            return df.clone();
        }

        let cols_ref: Vec<PlSmallStr> = columns.iter().map(|s| s.as_str().into()).collect();
        df.drop_many(cols_ref)
    }

    /// Names of the columns that still contain at least one missing value.
    pub fn columns_with_missing(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| col.name().to_string())
            .collect()
    }
}
