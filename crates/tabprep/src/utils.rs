//! Shared utilities for the preprocessing pipeline.
//!
//! Dtype classification, NaN handling, per-column statistics and null
//! filling used by the cleaner, imputer, encoder and scaler.

use crate::types::ColumnKind;
use polars::prelude::*;
use std::collections::HashMap;
use std::hash::Hash;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds text-like category labels.
#[inline]
pub fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::String | DataType::Categorical(_, _) | DataType::Enum(_, _)
    )
}

/// Classify a DataType into the kind the preprocessor works with.
///
/// `Null` (a column with no typed values at all) is treated as numeric.
/// Returns `None` for dtypes the preprocessor does not handle.
pub fn classify_dtype(dtype: &DataType) -> Option<ColumnKind> {
    if is_numeric_dtype(dtype) || matches!(dtype, DataType::Null) {
        Some(ColumnKind::Numeric)
    } else if is_categorical_dtype(dtype) {
        Some(ColumnKind::Categorical)
    } else if matches!(dtype, DataType::Boolean) {
        Some(ColumnKind::Boolean)
    } else {
        None
    }
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Fraction of missing cells in a Series. An empty Series has ratio 0.
pub fn missing_ratio(series: &Series) -> f64 {
    if series.is_empty() {
        0.0
    } else {
        series.null_count() as f64 / series.len() as f64
    }
}

/// Values of a numeric Series as `f64`, nulls preserved.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Values of any Series as display labels, nulls preserved.
///
/// Categorical and enum columns yield their category labels; booleans yield
/// `"true"` / `"false"`.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Sample standard deviation (n - 1 denominator) of the present values.
///
/// Returns 0.0 when fewer than two values are present.
pub fn sample_std(series: &Series, mean: f64) -> PolarsResult<f64> {
    let floats = series.cast(&DataType::Float64)?;
    let n = floats.len() - floats.null_count();
    if n <= 1 {
        return Ok(0.0);
    }

    let variance: f64 = floats
        .f64()?
        .into_iter()
        .filter_map(|v| v.map(|val| (val - mean).powi(2)))
        .sum::<f64>()
        / (n as f64 - 1.0);

    Ok(variance.sqrt())
}

/// Most frequent value; ties go to the value that occurs first.
fn first_occurrence_mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (idx, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, idx)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

/// Calculate the mode (most frequent value) of a string-like Series.
///
/// Ties are broken by first occurrence in row order.
pub fn string_mode(series: &Series) -> PolarsResult<Option<String>> {
    let values = string_values(series)?;
    Ok(first_occurrence_mode(values.into_iter().flatten()))
}

/// Calculate the mode of a boolean Series, ties broken by first occurrence.
pub fn bool_mode(series: &Series) -> PolarsResult<Option<bool>> {
    Ok(first_occurrence_mode(series.bool()?.into_iter().flatten()))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Replace float NaN cells with nulls so they count as missing.
///
/// Returns `None` when the Series is not a float column or holds no NaN.
pub fn nan_to_null(series: &Series) -> PolarsResult<Option<Series>> {
    if !matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        return Ok(None);
    }

    let values = numeric_values(series)?;
    if !values.iter().flatten().any(|v| v.is_nan()) {
        return Ok(None);
    }

    let cleaned: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    let cleaned = Series::new(series.name().clone(), cleaned).cast(series.dtype())?;
    Ok(Some(cleaned))
}

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a string-like Series with a specific value.
///
/// Categorical input comes back as a plain String column.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let strings = series.cast(&DataType::String)?;
    let values: Vec<&str> = strings
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a boolean Series with a specific value.
pub fn fill_bool_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let values: Vec<bool> = series
        .bool()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::UInt8));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_classify_dtype() {
        assert_eq!(classify_dtype(&DataType::Int32), Some(ColumnKind::Numeric));
        assert_eq!(classify_dtype(&DataType::Null), Some(ColumnKind::Numeric));
        assert_eq!(classify_dtype(&DataType::String), Some(ColumnKind::Categorical));
        assert_eq!(classify_dtype(&DataType::Boolean), Some(ColumnKind::Boolean));
        assert_eq!(classify_dtype(&DataType::Date), None);
        assert_eq!(
            classify_dtype(&DataType::List(Box::new(DataType::Int64))),
            None
        );
    }

    #[test]
    fn test_missing_ratio() {
        let series = Series::new("a".into(), &[Some(1.0), None, Some(3.0), None]);
        assert_eq!(missing_ratio(&series), 0.5);

        let empty = Series::new("a".into(), Vec::<f64>::new());
        assert_eq!(missing_ratio(&empty), 0.0);
    }

    #[test]
    fn test_sample_std() {
        let series = Series::new("v".into(), &[Some(2.0), None, Some(4.0), Some(6.0)]);
        assert_eq!(sample_std(&series, 4.0).unwrap(), 2.0);

        let single = Series::new("v".into(), &[Some(7i64), None]);
        assert_eq!(sample_std(&single, 7.0).unwrap(), 0.0);
    }

    #[test]
    fn test_nan_to_null() {
        let series = Series::new("x".into(), &[Some(1.0), Some(f64::NAN), None, Some(3.0)]);
        let cleaned = nan_to_null(&series).unwrap().unwrap();

        assert_eq!(cleaned.dtype(), &DataType::Float64);
        assert_eq!(cleaned.null_count(), 2);
        let values: Vec<Option<f64>> = cleaned.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), None, None, Some(3.0)]);
    }

    #[test]
    fn test_nan_to_null_keeps_float32_and_skips_clean_columns() {
        let narrow = Series::new("x".into(), &[f32::NAN, 2.0]);
        let cleaned = nan_to_null(&narrow).unwrap().unwrap();
        assert_eq!(cleaned.dtype(), &DataType::Float32);
        assert_eq!(cleaned.null_count(), 1);

        let clean = Series::new("x".into(), &[1.0, 2.0]);
        assert!(nan_to_null(&clean).unwrap().is_none());

        let ints = Series::new("n".into(), &[1i32, 2]);
        assert!(nan_to_null(&ints).unwrap().is_none());
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series).unwrap(), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_tie_prefers_first_occurrence() {
        let series = Series::new("test".into(), &[Some("b"), Some("a"), None, Some("a"), Some("b")]);
        assert_eq!(string_mode(&series).unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_string_mode_all_null() {
        let series = Series::new("test".into(), &[Option::<&str>::None, None]);
        assert_eq!(string_mode(&series).unwrap(), None);
    }

    #[test]
    fn test_bool_mode() {
        let series = Series::new("flag".into(), &[Some(false), Some(true), None, Some(true)]);
        assert_eq!(bool_mode(&series).unwrap(), Some(true));

        let tied = Series::new("flag".into(), &[Some(false), Some(true)]);
        assert_eq!(bool_mode(&tied).unwrap(), Some(false));
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1i32), None, Some(3)]);
        let filled = fill_numeric_nulls(&series, 2.0).unwrap();

        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("city".into(), &[Some("A"), None, Some("B")]);
        let filled = fill_string_nulls(&series, "A").unwrap();

        assert_eq!(filled.null_count(), 0);
        let values: Vec<Option<&str>> = filled.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("A"), Some("A"), Some("B")]);
    }

    #[test]
    fn test_fill_bool_nulls() {
        let series = Series::new("flag".into(), &[None, Some(false)]);
        let filled = fill_bool_nulls(&series, true).unwrap();

        let values: Vec<Option<bool>> = filled.bool().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(true), Some(false)]);
    }
}
