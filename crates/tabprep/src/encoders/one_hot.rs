//! One-hot (indicator) encoding.

use crate::error::{PreprocessingError, Result};
use crate::utils::string_values;
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Indicator columns generated from one source column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    pub source: String,
    pub indicators: Vec<String>,
}

/// Replaces categorical columns with one 0/1 column per distinct value.
pub struct OneHotEncoder;

impl OneHotEncoder {
    /// Name of the indicator column for `label` in `column`.
    pub fn indicator_name(column: &str, label: &str) -> String {
        format!("{}_{}", column, label)
    }

    /// Distinct present labels of a column in ascending order.
    pub fn distinct_labels(series: &Series) -> Result<Vec<String>> {
        let labels: BTreeSet<String> = string_values(series)?.into_iter().flatten().collect();
        Ok(labels.into_iter().collect())
    }

    /// Build the indicator columns for one source column.
    ///
    /// A missing source cell is 0 in every indicator.
    pub fn indicators(series: &Series) -> Result<Vec<Series>> {
        let values = string_values(series)?;
        let source = series.name().as_str();

        let indicators = Self::distinct_labels(series)?
            .into_iter()
            .map(|label| {
                let bits: Vec<u8> = values
                    .iter()
                    .map(|v| u8::from(v.as_deref() == Some(label.as_str())))
                    .collect();
                Series::new(Self::indicator_name(source, &label).into(), bits)
            })
            .collect();

        Ok(indicators)
    }

    /// Encode `columns` of `df`.
    ///
    /// The source columns are removed and their indicators appended after the
    /// remaining columns, grouped by source in the order given. Returns the
    /// new table and the generated columns per source. Fails without
    /// producing a table if a generated name is already taken.
    pub fn encode(df: &DataFrame, columns: &[String]) -> Result<(DataFrame, Vec<EncodedColumn>)> {
        if columns.is_empty() {
            return Ok((df.clone(), Vec::new()));
        }

        let mut groups = Vec::with_capacity(columns.len());
        let mut indicators = Vec::new();
        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| PreprocessingError::ColumnNotFound(col_name.clone()))?
                .as_materialized_series();
            let generated = Self::indicators(series)?;
            debug!(
                "'{}' expands to {} indicator columns",
                col_name,
                generated.len()
            );
            groups.push(EncodedColumn {
                source: col_name.clone(),
                indicators: generated.iter().map(|s| s.name().to_string()).collect(),
            });
            indicators.extend(generated);
        }

        let encoded_set: HashSet<&str> = columns.iter().map(String::as_str).collect();
        let mut taken: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| !encoded_set.contains(name.as_str()))
            .collect();

        for indicator in &indicators {
            let name = indicator.name().to_string();
            if !taken.insert(name.clone()) {
                return Err(PreprocessingError::DuplicateColumn(name));
            }
        }

        let cols_ref: Vec<PlSmallStr> = columns.iter().map(|s| s.as_str().into()).collect();
        let mut result = df.drop_many(cols_ref);
        for indicator in indicators {
            result.with_column(indicator)?;
        }

        Ok((result, groups))
    }
}
