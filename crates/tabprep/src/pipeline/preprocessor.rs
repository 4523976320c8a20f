//! The stateful preprocessing pipeline.

use crate::cleaner::DataCleaner;
use crate::config::{NormalizationMethod, PreprocessorConfig, validate_threshold};
use crate::encoders::OneHotEncoder;
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::scalers::NumericScaler;
use crate::types::{ActionType, ColumnKind, FillValue, PreprocessingAction, ScalingStats};
use crate::utils::{classify_dtype, nan_to_null};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Cleans one table and remembers every decision it made along the way.
///
/// The preprocessor owns a copy of the input table. Each stage mutates that
/// copy and records what it did: which columns were dropped, what filled the
/// gaps, which indicator columns were generated and how numeric columns were
/// scaled. Stages return `&mut Self` so they chain with `?`.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::{NormalizationMethod, Preprocessor};
///
/// let mut prep = Preprocessor::new(&df)?;
/// prep.remove_missing(0.5)?
///     .encode_categorical()?
///     .normalize_numeric(NormalizationMethod::MinMax)?;
///
/// println!("dropped: {:?}", prep.removed_columns());
/// let cleaned = prep.into_data();
/// ```
pub struct Preprocessor {
    df: DataFrame,
    column_kinds: HashMap<String, ColumnKind>,
    removed_columns: Vec<String>,
    fill_values: HashMap<String, FillValue>,
    encoded_columns: Vec<String>,
    numeric_stats: HashMap<String, ScalingStats>,
    actions: Vec<PreprocessingAction>,
}

static_assertions::assert_impl_all!(Preprocessor: Send);

impl Preprocessor {
    /// Create a preprocessor over a copy of `df`.
    ///
    /// Float NaN cells become nulls in the copy, so every stage treats them
    /// as missing.
    ///
    /// # Errors
    ///
    /// Returns a type error if a column has a dtype other than numeric,
    /// string/categorical, boolean or null.
    pub fn new(df: &DataFrame) -> Result<Self> {
        let mut df = df.clone();
        let mut column_kinds = HashMap::with_capacity(df.width());
        let mut untyped = Vec::new();
        let mut with_nan = Vec::new();

        for col in df.get_columns() {
            let name = col.name().to_string();
            let kind = classify_dtype(col.dtype()).ok_or_else(|| {
                PreprocessingError::UnsupportedColumnType {
                    column: name.clone(),
                    dtype: col.dtype().to_string(),
                }
            })?;
            if matches!(col.dtype(), DataType::Null) {
                untyped.push(name.clone());
            }
            if let Some(cleaned) = nan_to_null(col.as_materialized_series())? {
                with_nan.push(cleaned);
            }
            column_kinds.insert(name, kind);
        }

        for name in &untyped {
            let cast = df
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            df.replace(name, cast)
                .context(format!("Casting untyped column '{}'", name))?;
        }
        for cleaned in with_nan {
            debug!("'{}': NaN cells treated as missing", cleaned.name());
            let name = cleaned.name().to_string();
            df.replace(&name, cleaned)
                .context(format!("Marking NaN in '{}' as missing", name))?;
        }

        debug!(
            "Preprocessor created for {} rows x {} columns",
            df.height(),
            df.width()
        );

        Ok(Self {
            df,
            column_kinds,
            removed_columns: Vec::new(),
            fill_values: HashMap::new(),
            encoded_columns: Vec::new(),
            numeric_stats: HashMap::new(),
            actions: Vec::new(),
        })
    }

    /// Assemble a table from columns and create a preprocessor over it.
    ///
    /// # Errors
    ///
    /// Returns a type error if the columns differ in length or share a name,
    /// or for any error [`Preprocessor::new`] reports.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let df = DataFrame::new(columns)
            .map_err(|e| PreprocessingError::InvalidTable(e.to_string()))?;
        Self::new(&df)
    }

    // ------------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------------

    /// Drop columns with too many missing values and impute the rest.
    ///
    /// Columns whose missing fraction strictly exceeds `threshold` are
    /// dropped and listed in [`removed_columns`](Self::removed_columns),
    /// replacing the list of any previous call. Remaining columns with gaps
    /// are filled with their mean (numeric) or most frequent value
    /// (categorical, boolean; ties go to the value seen first).
    ///
    /// # Errors
    ///
    /// Returns a validation error, before touching the table, if `threshold`
    /// is outside [0, 1].
    pub fn remove_missing(&mut self, threshold: f64) -> Result<&mut Self> {
        validate_threshold("threshold", threshold)?;
        info!("Removing columns with > {:.1}% missing values...", threshold * 100.0);

        let sparse = DataCleaner::find_sparse_columns(&self.df, threshold);
        let removed: Vec<String> = sparse.iter().map(|c| c.name.clone()).collect();
        let mut df = DataCleaner::drop_columns(&self.df, &removed);

        let mut fills = Vec::new();
        for col_name in DataCleaner::columns_with_missing(&df) {
            let kind = self.kind_of(&col_name)?;
            if let Some(value) = StatisticalImputer::impute_column(&mut df, &col_name, kind)? {
                fills.push((col_name, value));
            }
        }

        self.df = df;
        let imputed = fills.len();
        for col in sparse {
            self.column_kinds.remove(&col.name);
            self.actions.push(PreprocessingAction::new(
                ActionType::ColumnRemoved,
                &col.name,
                format!("Dropped '{}' ({:.1}% missing)", col.name, col.missing_ratio * 100.0),
            ));
        }
        for (col_name, value) in fills {
            self.actions.push(PreprocessingAction::new(
                ActionType::ValueImputed,
                &col_name,
                format!("Filled '{}' with {}", col_name, value),
            ));
            self.fill_values.insert(col_name, value);
        }

        info!(
            "Removed {} columns, imputed {} columns",
            removed.len(),
            imputed
        );
        self.removed_columns = removed;
        Ok(self)
    }

    /// One-hot encode every categorical and boolean column.
    ///
    /// Each source column is replaced by `<column>_<value>` 0/1 columns, one
    /// per distinct value in ascending label order, appended after the
    /// remaining columns. [`encoded_columns`](Self::encoded_columns) is set to
    /// the generated names. Without categorical columns nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessingError::DuplicateColumn`] if a generated name is
    /// already in use; the table is left as it was.
    pub fn encode_categorical(&mut self) -> Result<&mut Self> {
        let categorical: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|name| {
                self.column_kinds
                    .get(name)
                    .is_some_and(|kind| kind.is_encodable())
            })
            .collect();

        if categorical.is_empty() {
            debug!("No categorical columns to encode");
            return Ok(self);
        }

        info!("Encoding {} categorical columns...", categorical.len());
        let (df, groups) = OneHotEncoder::encode(&self.df, &categorical)?;
        self.df = df;

        let mut encoded = Vec::new();
        for group in groups {
            self.column_kinds.remove(&group.source);
            for name in &group.indicators {
                self.column_kinds.insert(name.clone(), ColumnKind::Numeric);
            }
            self.actions.push(PreprocessingAction::new(
                ActionType::ColumnEncoded,
                &group.source,
                format!("Encoded '{}' into {:?}", group.source, group.indicators),
            ));
            encoded.extend(group.indicators);
        }

        self.encoded_columns = encoded;
        Ok(self)
    }

    /// Rescale every numeric column, generated indicators included.
    ///
    /// Parameters are recorded in [`numeric_stats`](Self::numeric_stats).
    /// Constant columns become all 0.0.
    pub fn normalize_numeric(&mut self, method: NormalizationMethod) -> Result<&mut Self> {
        let numeric: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|name| self.column_kinds.get(name) == Some(&ColumnKind::Numeric))
            .collect();

        info!("Normalizing {} numeric columns ({})...", numeric.len(), method);

        let mut df = self.df.clone();
        let mut fitted = Vec::with_capacity(numeric.len());
        for col_name in numeric {
            let series = df.column(&col_name)?.as_materialized_series().clone();
            let (scaled, stats) = NumericScaler::fit_transform(&series, method)
                .context(format!("Normalizing '{}'", col_name))?;
            df.replace(&col_name, scaled)
                .context(format!("Normalizing '{}'", col_name))?;
            debug!("'{}' scaled with {:?}", col_name, stats);
            fitted.push((col_name, stats));
        }

        self.df = df;
        for (col_name, stats) in fitted {
            let (a, b) = stats.params();
            self.actions.push(PreprocessingAction::new(
                ActionType::ColumnNormalized,
                &col_name,
                format!("Scaled '{}' with {} ({:.4}, {:.4})", col_name, method, a, b),
            ));
            self.numeric_stats.insert(col_name, stats);
        }

        Ok(self)
    }

    /// Run all stages in order and return the resulting table.
    ///
    /// Imputation runs before encoding so filled categories get indicators,
    /// and encoding runs before normalization so indicators are scaled too.
    pub fn fit_transform(
        &mut self,
        threshold: f64,
        method: NormalizationMethod,
    ) -> Result<DataFrame> {
        self.remove_missing(threshold)?
            .encode_categorical()?
            .normalize_numeric(method)?;
        Ok(self.df.clone())
    }

    /// Run all stages with the settings of a [`PreprocessorConfig`].
    pub fn fit_transform_with_config(&mut self, config: &PreprocessorConfig) -> Result<DataFrame> {
        config.validate()?;
        self.fit_transform(config.missing_threshold, config.normalization)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The current state of the table.
    pub fn data(&self) -> &DataFrame {
        &self.df
    }

    /// Consume the preprocessor and return the table.
    pub fn into_data(self) -> DataFrame {
        self.df
    }

    /// Columns dropped by the most recent `remove_missing` call, in table order.
    pub fn removed_columns(&self) -> &[String] {
        &self.removed_columns
    }

    /// Fill value used per imputed column, across all `remove_missing` calls.
    pub fn fill_values(&self) -> &HashMap<String, FillValue> {
        &self.fill_values
    }

    /// Indicator columns generated by the most recent `encode_categorical` call.
    pub fn encoded_columns(&self) -> &[String] {
        &self.encoded_columns
    }

    /// Scaling parameters per normalized column, across all calls.
    pub fn numeric_stats(&self) -> &HashMap<String, ScalingStats> {
        &self.numeric_stats
    }

    /// Kind of a column currently in the table.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column_kinds.get(name).copied()
    }

    /// Log of every action taken so far, oldest first.
    pub fn actions(&self) -> &[PreprocessingAction] {
        &self.actions
    }

    fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn kind_of(&self, name: &str) -> Result<ColumnKind> {
        self.column_kinds
            .get(name)
            .copied()
            .ok_or_else(|| PreprocessingError::ColumnNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_names(prep: &Preprocessor) -> Vec<String> {
        prep.column_names()
    }

    fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    // ========================================================================
    // construction
    // ========================================================================

    #[test]
    fn test_new_classifies_columns() {
        let df = df![
            "age" => [1i32, 2],
            "city" => ["A", "B"],
            "member" => [true, false],
        ]
        .unwrap();

        let prep = Preprocessor::new(&df).unwrap();
        assert_eq!(prep.column_kind("age"), Some(ColumnKind::Numeric));
        assert_eq!(prep.column_kind("city"), Some(ColumnKind::Categorical));
        assert_eq!(prep.column_kind("member"), Some(ColumnKind::Boolean));
        assert!(prep.removed_columns().is_empty());
        assert!(prep.fill_values().is_empty());
        assert!(prep.encoded_columns().is_empty());
        assert!(prep.numeric_stats().is_empty());
    }

    #[test]
    fn test_new_rejects_unsupported_dtype() {
        let dates = Series::new("when".into(), &[1i32, 2])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();

        let err = Preprocessor::new(&df).err().unwrap();
        assert!(err.is_type_error());
        assert!(matches!(
            err,
            PreprocessingError::UnsupportedColumnType { ref column, .. } if column == "when"
        ));
    }

    #[test]
    fn test_new_casts_null_columns_to_float() {
        let nulls = Series::new_null("blank".into(), 3);
        let df = DataFrame::new(vec![nulls.into()]).unwrap();

        let prep = Preprocessor::new(&df).unwrap();
        assert_eq!(prep.column_kind("blank"), Some(ColumnKind::Numeric));
        assert_eq!(prep.data().column("blank").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_new_treats_nan_as_missing() {
        let df = df![
            "x" => [1.0, f64::NAN, 3.0],
            "mostly_nan" => [f64::NAN, f64::NAN, 1.0],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        assert_eq!(prep.data().column("x").unwrap().null_count(), 1);

        prep.remove_missing(0.5).unwrap();
        assert_eq!(prep.removed_columns(), &["mostly_nan".to_string()]);
        assert_eq!(prep.fill_values()["x"], FillValue::Numeric(2.0));
        // The caller's table still holds its NaN
        assert_eq!(df.column("x").unwrap().null_count(), 0);
    }

    #[test]
    fn test_nan_scales_the_same_under_both_methods() {
        let df = df![
            "x" => [1.0, f64::NAN, 3.0],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.fit_transform(0.5, NormalizationMethod::MinMax).unwrap();
        assert_eq!(prep.numeric_stats()["x"], ScalingStats::MinMax { min: 1.0, max: 3.0 });
        assert_eq!(
            f64_values(prep.data(), "x"),
            vec![Some(0.0), Some(0.5), Some(1.0)]
        );

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.fit_transform(0.5, NormalizationMethod::Standard).unwrap();
        assert_eq!(
            prep.numeric_stats()["x"],
            ScalingStats::Standard { mean: 2.0, std: 1.0 }
        );
        assert_eq!(
            f64_values(prep.data(), "x"),
            vec![Some(-1.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn test_from_columns_rejects_ragged_input() {
        let columns: Vec<Column> = vec![
            Series::new("a".into(), &[1.0, 2.0]).into(),
            Series::new("b".into(), &[1.0]).into(),
        ];

        let err = Preprocessor::from_columns(columns).err().unwrap();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let df = df![
            "age" => [Some(1.0), None, Some(3.0)],
            "city" => [Some("A"), Some("B"), None],
        ]
        .unwrap();
        let original = df.clone();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.fit_transform(0.5, NormalizationMethod::MinMax).unwrap();

        assert!(df.equals_missing(&original));
        assert_eq!(df.width(), 2);
    }

    // ========================================================================
    // remove_missing
    // ========================================================================

    #[test]
    fn test_remove_missing_drops_and_imputes() {
        let df = df![
            "mostly_empty" => [Some(1.0), None, None, None],
            "age" => [Some(10.0), None, Some(20.0), Some(30.0)],
            "city" => [Some("A"), Some("B"), Some("A"), None],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.remove_missing(0.5).unwrap();

        assert_eq!(prep.removed_columns(), &["mostly_empty".to_string()]);
        assert_eq!(column_names(&prep), vec!["age", "city"]);
        assert_eq!(prep.fill_values()["age"], FillValue::Numeric(20.0));
        assert_eq!(prep.fill_values()["city"], FillValue::Text("A".to_string()));
        assert_eq!(prep.column_kind("mostly_empty"), None);
        assert_eq!(prep.data().column("age").unwrap().null_count(), 0);
        assert_eq!(prep.data().column("city").unwrap().null_count(), 0);
    }

    #[test]
    fn test_remove_missing_threshold_zero() {
        let df = df![
            "clean" => [1.0, 2.0],
            "gap" => [Some(1.0), None],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.remove_missing(0.0).unwrap();

        assert_eq!(prep.removed_columns(), &["gap".to_string()]);
        assert_eq!(column_names(&prep), vec!["clean"]);
        assert!(prep.fill_values().is_empty());
    }

    #[test]
    fn test_remove_missing_threshold_one_keeps_empty_column() {
        let df = df![
            "empty" => [Option::<f64>::None, None],
            "gap" => [Some(4.0), None],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.remove_missing(1.0).unwrap();

        assert!(prep.removed_columns().is_empty());
        assert!(!prep.fill_values().contains_key("empty"));
        assert_eq!(prep.fill_values()["gap"], FillValue::Numeric(4.0));
        assert_eq!(prep.data().column("empty").unwrap().null_count(), 2);
    }

    #[test]
    fn test_remove_missing_invalid_threshold_leaves_state() {
        let df = df![
            "gap" => [Some(1.0), None],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        for threshold in [1.5, -0.1, f64::NAN] {
            let err = prep.remove_missing(threshold).err().unwrap();
            assert!(err.is_validation());
        }

        assert_eq!(prep.data().column("gap").unwrap().null_count(), 1);
        assert!(prep.fill_values().is_empty());
        assert!(prep.actions().is_empty());
    }

    #[test]
    fn test_remove_missing_replaces_removed_list() {
        let df = df![
            "a" => [Some(1.0), None, None],
            "b" => [Some(1.0), Some(2.0), None],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.remove_missing(0.5).unwrap();
        assert_eq!(prep.removed_columns(), &["a".to_string()]);

        // "b" was imputed, so nothing is left to drop
        prep.remove_missing(0.0).unwrap();
        assert!(prep.removed_columns().is_empty());
        assert!(prep.fill_values().contains_key("b"));
    }

    // ========================================================================
    // encode_categorical
    // ========================================================================

    #[test]
    fn test_encode_categorical_registers_indicators() {
        let df = df![
            "color" => ["red", "blue", "red"],
            "score" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.encode_categorical().unwrap();

        assert_eq!(prep.encoded_columns(), &["color_blue", "color_red"]);
        assert_eq!(column_names(&prep), vec!["score", "color_blue", "color_red"]);
        assert_eq!(prep.column_kind("color"), None);
        assert_eq!(prep.column_kind("color_red"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn test_encode_categorical_noop_without_categories() {
        let df = df![
            "score" => [1.0, 2.0],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.encode_categorical().unwrap();

        assert!(prep.encoded_columns().is_empty());
        assert!(prep.data().equals(&df));
    }

    #[test]
    fn test_encode_categorical_collision_leaves_table() {
        let df = df![
            "color" => ["red", "blue"],
            "color_red" => [1i32, 0],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        let err = prep.encode_categorical().err().unwrap();

        assert!(matches!(err, PreprocessingError::DuplicateColumn(_)));
        assert_eq!(column_names(&prep), vec!["color", "color_red"]);
        assert_eq!(prep.column_kind("color"), Some(ColumnKind::Categorical));
    }

    // ========================================================================
    // normalize_numeric
    // ========================================================================

    #[test]
    fn test_normalize_minmax_records_stats() {
        let df = df![
            "score" => [10i64, 20, 30],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.normalize_numeric(NormalizationMethod::MinMax).unwrap();

        assert_eq!(
            f64_values(prep.data(), "score"),
            vec![Some(0.0), Some(0.5), Some(1.0)]
        );
        let stats = prep.numeric_stats()["score"];
        assert_eq!(stats.method(), NormalizationMethod::MinMax);
        assert_eq!(stats.params(), (10.0, 30.0));
    }

    #[test]
    fn test_normalize_skips_categorical_columns() {
        let df = df![
            "city" => ["A", "B"],
            "score" => [1.0, 3.0],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.normalize_numeric(NormalizationMethod::Standard).unwrap();

        assert!(!prep.numeric_stats().contains_key("city"));
        assert!(prep.numeric_stats().contains_key("score"));
        assert_eq!(prep.data().column("city").unwrap().dtype(), &DataType::String);
    }

    // ========================================================================
    // fit_transform
    // ========================================================================

    #[test]
    fn test_fit_transform_with_config() {
        let df = df![
            "age" => [Some(20.0), None, Some(40.0)],
            "member" => [Some(true), Some(false), None],
        ]
        .unwrap();
        let config = PreprocessorConfig::builder()
            .normalization(NormalizationMethod::Standard)
            .build()
            .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        let out = prep.fit_transform_with_config(&config).unwrap();

        assert_eq!(prep.fill_values()["member"], FillValue::Boolean(true));
        assert_eq!(prep.encoded_columns(), &["member_false", "member_true"]);
        assert_eq!(out.width(), 3);
        for col in out.get_columns() {
            assert_eq!(col.dtype(), &DataType::Float64);
            assert_eq!(col.null_count(), 0);
        }
    }

    #[test]
    fn test_actions_are_logged_in_order() {
        let df = df![
            "drop_me" => [Option::<f64>::None, None, Some(1.0)],
            "city" => [Some("A"), None, Some("A")],
        ]
        .unwrap();

        let mut prep = Preprocessor::new(&df).unwrap();
        prep.fit_transform(0.5, NormalizationMethod::MinMax).unwrap();

        let kinds: Vec<ActionType> = prep.actions().iter().map(|a| a.action_type).collect();
        assert_eq!(
            kinds,
            vec![
                ActionType::ColumnRemoved,
                ActionType::ValueImputed,
                ActionType::ColumnEncoded,
                ActionType::ColumnNormalized,
            ]
        );
        assert_eq!(prep.actions()[0].column, "drop_me");
    }
}
