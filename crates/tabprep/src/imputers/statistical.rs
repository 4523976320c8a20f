//! Statistical imputation methods.
//!
//! Mean for numeric columns, most frequent value for everything else.

use crate::error::{PreprocessingError, Result, ResultExt};
use crate::types::{ColumnKind, FillValue};
use crate::utils::{bool_mode, fill_bool_nulls, fill_numeric_nulls, fill_string_nulls, string_mode};
use polars::prelude::*;
use tracing::{debug, warn};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Compute the fill value for a column without touching it.
    ///
    /// Returns `None` when the column has no present values to summarize.
    pub fn fit(series: &Series, kind: ColumnKind) -> Result<Option<FillValue>> {
        let value = match kind {
            ColumnKind::Numeric => series
                .cast(&DataType::Float64)?
                .mean()
                .map(FillValue::Numeric),
            ColumnKind::Categorical => string_mode(series)?.map(FillValue::Text),
            ColumnKind::Boolean => bool_mode(series)?.map(FillValue::Boolean),
        };
        Ok(value)
    }

    /// Substitute `value` into every missing cell of `series`.
    ///
    /// Fails if `value` does not fit the column's type.
    pub fn fill(series: &Series, value: &FillValue) -> Result<Series> {
        let filled = match value {
            FillValue::Numeric(v) => fill_numeric_nulls(series, *v),
            FillValue::Text(v) => fill_string_nulls(series, v),
            FillValue::Boolean(v) => fill_bool_nulls(series, *v),
        };
        filled.context(format!("Filling '{}' with {}", series.name(), value))
    }

    /// Impute a column of `df` in place and return the value used.
    ///
    /// A column without any present value is left untouched and `None` is
    /// returned.
    pub fn impute_column(
        df: &mut DataFrame,
        col_name: &str,
        kind: ColumnKind,
    ) -> Result<Option<FillValue>> {
        let series = df
            .column(col_name)
            .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series()
            .clone();

        let Some(value) = Self::fit(&series, kind)? else {
            warn!(
                "Column '{}' has no present values; leaving it unimputed",
                col_name
            );
            return Ok(None);
        };

        let filled = Self::fill(&series, &value)?;
        df.replace(col_name, filled)
            .context(format!("Replacing imputed column '{}'", col_name))?;
        debug!("Filled '{}' with {}", col_name, value);

        Ok(Some(value))
    }
}
